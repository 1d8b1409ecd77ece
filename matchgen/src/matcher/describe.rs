//! Human readable matcher descriptions, used in error messages and logs.

use std::fmt;

use super::{Expected, MatchTarget, Matcher, MatcherKind, MessageExpectation};

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Value(value) => f.write_str(&value.inspect()),
            Expected::Matcher(matcher) => write!(f, "({})", matcher),
            Expected::Array(items) => write!(f, "[{}]", join(items)),
            Expected::Map(entries) => {
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|(key, expected)| format!("{} => {}", key.inspect(), expected))
                    .collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
        }
    }
}

fn join(items: &[Expected]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            MatcherKind::Eq(value) => write!(f, "eq {}", value.inspect()),
            MatcherKind::Eql(value) => write!(f, "eql {}", value.inspect()),
            MatcherKind::Equal(value) => write!(f, "equal {}", value.inspect()),
            MatcherKind::Compare { op, expected } => {
                write!(f, "be {} {}", op.symbol(), expected.inspect())
            }
            MatcherKind::BeBetween { min, max, inclusive } => write!(
                f,
                "be between {} and {} ({})",
                min.inspect(),
                max.inspect(),
                if *inclusive { "inclusive" } else { "exclusive" }
            ),
            MatcherKind::KindOf(value_type) => write!(f, "be a kind of {}", value_type),
            MatcherKind::InstanceOf(value_type) => write!(f, "be an instance of {}", value_type),
            MatcherKind::Or(left, right) => write!(f, "{} or {}", left, right),
            MatcherKind::And(left, right) => write!(f, "{} and {}", left, right),
            MatcherKind::Include(items) => write!(f, "include {}", join(items)),
            MatcherKind::All(matcher) => write!(f, "all {}", matcher),
            MatcherKind::ContainExactly(items) => write!(f, "contain exactly {}", join(items)),
            MatcherKind::StartWith(prefix) => write!(f, "start with {}", prefix.inspect()),
            MatcherKind::EndWith(suffix) => write!(f, "end with {}", suffix.inspect()),
            MatcherKind::HaveAttributes(attributes) => {
                let rendered: Vec<String> = attributes
                    .iter()
                    .map(|(name, expected)| format!(":{} => {}", name, expected))
                    .collect();
                write!(f, "have attributes {{{}}}", rendered.join(", "))
            }
            MatcherKind::Match(MatchTarget::Str(source)) => write!(f, "match {:?}", source),
            MatcherKind::Match(MatchTarget::Pattern(pattern)) => {
                write!(f, "match /{}/", pattern.as_str())
            }
            MatcherKind::Match(MatchTarget::Matcher(matcher)) => write!(f, "match ({})", matcher),
            MatcherKind::RespondTo(spec) => {
                let names: Vec<String> = spec.names.iter().map(|name| format!("#{}", name)).collect();
                write!(f, "respond to {}", names.join(", "))?;
                if let Some(arity) = spec.arity {
                    write!(f, " with {} argument{}", arity, if arity == 1 { "" } else { "s" })?;
                }
                if spec.unlimited_arguments {
                    f.write_str(" with unlimited arguments")?;
                }
                if !spec.keywords.is_empty() {
                    write!(f, " with keywords {}", spec.keywords.join(", "))?;
                }
                if spec.any_keywords {
                    f.write_str(" with any keywords")?;
                }
                Ok(())
            }
            MatcherKind::Output { stream, expected } => match expected {
                Some(expected) => write!(f, "output {} to {}", expected, stream),
                None => write!(f, "output to {}", stream),
            },
            MatcherKind::RaiseError { kind, message } => {
                f.write_str("raise ")?;
                f.write_str(kind.as_deref().unwrap_or("Exception"))?;
                match message {
                    Some(MessageExpectation::Exact(text)) => write!(f, " with {:?}", text),
                    Some(MessageExpectation::Pattern(pattern)) => {
                        write!(f, " with message matching /{}/", pattern.as_str())
                    }
                    None => Ok(()),
                }
            }
            MatcherKind::ThrowSymbol { signal, payload } => {
                f.write_str("throw ")?;
                match signal {
                    Some(signal) => write!(f, ":{}", signal)?,
                    None => f.write_str("a symbol")?,
                }
                match payload {
                    Some(payload) => write!(f, " with {}", payload),
                    None => Ok(()),
                }
            }
            MatcherKind::BeFalsey => f.write_str("be falsey"),
            MatcherKind::BeTruthy => f.write_str("be truthy"),
            MatcherKind::BeNil => f.write_str("be nil"),
            MatcherKind::BeWithin {
                delta,
                expected,
                percent,
            } => {
                if *percent {
                    write!(f, "be within {}% of {}", delta, expected.inspect())
                } else {
                    write!(f, "be within {} of {}", delta, expected.inspect())
                }
            }
            MatcherKind::Cover(values) => {
                let rendered: Vec<String> = values.iter().map(|value| value.inspect()).collect();
                write!(f, "cover {}", rendered.join(", "))
            }
            MatcherKind::Satisfy { description, .. } => write!(f, "satisfy {}", description),
            MatcherKind::Aliased { name, base } => match base.kind() {
                // Aliases replace the leading verb of the base description
                MatcherKind::KindOf(value_type) | MatcherKind::InstanceOf(value_type) => {
                    write!(f, "{} {}", name, value_type)
                }
                _ => {
                    let base = base.to_string();
                    let rest = base.split_once(' ').map_or("", |(_, rest)| rest);
                    let rest = rest
                        .strip_prefix("with ")
                        .or_else(|| rest.strip_prefix("between "))
                        .or_else(|| rest.strip_prefix("within "))
                        .or_else(|| rest.strip_prefix("exactly "))
                        .or_else(|| rest.strip_prefix("attributes "))
                        .unwrap_or(rest);
                    write!(f, "{} {}", name, rest)
                }
            },
            MatcherKind::Custom(custom) => f.write_str(&custom.description()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::matcher::*;
    use crate::value::{Value, ValueType};

    #[test]
    fn test_simple_descriptions() {
        assert_eq!(eq(1).to_string(), "eq 1");
        assert_eq!(be_lt(0).to_string(), "be < 0");
        assert_eq!(
            be_between(1, 5).exclusive().to_string(),
            "be between 1 and 5 (exclusive)"
        );
        assert_eq!(be_a_kind_of(ValueType::Integer).to_string(), "be a kind of Integer");
        assert_eq!(eq(1).or(be_nil()).to_string(), "eq 1 or be nil");
        assert_eq!(match_str("foo").to_string(), "match \"foo\"");
    }

    #[test]
    fn test_nested_descriptions() {
        let matcher = include(vec![Expected::map(vec![(
            Value::symbol("foo"),
            be_gt(0),
        )])]);
        assert_eq!(matcher.to_string(), "include {:foo => (be > 0)}");

        let matcher = respond_to(["call"]).with_args(2);
        assert_eq!(matcher.to_string(), "respond to #call with 2 arguments");

        let matcher = raise_error().of_kind("ArgumentError").with_message("bad");
        assert_eq!(matcher.to_string(), "raise ArgumentError with \"bad\"");
    }

    #[test]
    fn test_alias_descriptions() {
        assert_eq!(a_kind_of(ValueType::String).to_string(), "a kind of String");
        assert_eq!(
            a_string_starting_with("foo").to_string(),
            "a string starting with \"foo\""
        );
        assert_eq!(
            a_value_between(1, 2).to_string(),
            "a value between 1 and 2 (inclusive)"
        );
    }
}
