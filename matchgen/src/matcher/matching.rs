//! Deciding whether a matcher accepts a value.

use std::cmp::Ordering;

use regex::Regex;

use super::{CompareOp, Expected, MatchTarget, Matcher, MatcherKind, MessageExpectation, RespondToSpec};
use crate::action::{Action, Interrupt, OutputStream};
use crate::value::Value;

impl Matcher {
    /// Whether `actual` satisfies this matcher.
    ///
    /// Action-valued matchers (`output`, `raise_error`, `throw_symbol`) run the
    /// action against an in-memory sink; nothing reaches the process streams.
    pub fn matches(&self, actual: &Value) -> bool {
        match self.kind() {
            MatcherKind::Eq(expected) => expected.loose_eq(actual),
            MatcherKind::Eql(expected) => expected == actual,
            MatcherKind::Equal(expected) => expected.same(actual),
            MatcherKind::Compare { op, expected } => compares(*op, actual, expected),
            MatcherKind::BeBetween { min, max, inclusive } => {
                let lower = actual.partial_compare(min);
                let upper = actual.partial_compare(max);
                if *inclusive {
                    matches!(lower, Some(Ordering::Greater | Ordering::Equal))
                        && matches!(upper, Some(Ordering::Less | Ordering::Equal))
                } else {
                    lower == Some(Ordering::Greater) && upper == Some(Ordering::Less)
                }
            }
            MatcherKind::KindOf(value_type) => value_type.includes(actual.value_type()),
            MatcherKind::InstanceOf(value_type) => *value_type == actual.value_type(),
            MatcherKind::Or(left, right) => left.matches(actual) || right.matches(actual),
            MatcherKind::And(left, right) => left.matches(actual) && right.matches(actual),
            MatcherKind::Include(items) => includes(actual, items),
            MatcherKind::All(matcher) => match elements(actual) {
                Some(elements) => elements.iter().all(|element| matcher.matches(element)),
                None => false,
            },
            MatcherKind::ContainExactly(items) => match elements(actual) {
                Some(elements) => contains_exactly(&elements, items),
                None => false,
            },
            MatcherKind::StartWith(prefix) => starts_with(actual, prefix),
            MatcherKind::EndWith(suffix) => ends_with(actual, suffix),
            MatcherKind::HaveAttributes(attributes) => match actual.as_object() {
                Some(object) => attributes.iter().all(|(name, expected)| {
                    object
                        .attribute(name)
                        .is_some_and(|value| values_match(expected, value))
                }),
                None => false,
            },
            MatcherKind::Match(target) => matches_target(target, actual),
            MatcherKind::RespondTo(spec) => responds(spec, actual),
            MatcherKind::Output { stream, expected } => outputs(*stream, expected.as_ref(), actual),
            MatcherKind::RaiseError { kind, message } => raises(kind.as_deref(), message.as_ref(), actual),
            MatcherKind::ThrowSymbol { signal, payload } => {
                throws(signal.as_deref(), payload.as_ref(), actual)
            }
            MatcherKind::BeFalsey => actual.is_falsy(),
            MatcherKind::BeTruthy => actual.is_truthy(),
            MatcherKind::BeNil => matches!(actual, Value::Nil),
            MatcherKind::BeWithin {
                delta,
                expected,
                percent,
            } => within(actual, delta, expected, *percent),
            MatcherKind::Cover(values) => match actual {
                Value::Interval(interval) => values.iter().all(|value| interval.contains(value)),
                _ => false,
            },
            MatcherKind::Satisfy { predicate, .. } => predicate.call(actual),
            MatcherKind::Aliased { base, .. } => base.matches(actual),
            MatcherKind::Custom(custom) => custom.matches(actual),
        }
    }
}

/// Whether `actual` matches an expected literal or embedded matcher.
///
/// Literals compare loosely, patterns match strings, arrays compare element-wise
/// and maps key-wise with equal key sets.
pub fn values_match(expected: &Expected, actual: &Value) -> bool {
    match expected {
        Expected::Value(Value::Pattern(pattern)) => match actual {
            Value::Str(text) => pattern.is_match(text),
            other => Value::Pattern(pattern.clone()) == *other,
        },
        Expected::Value(value) => value.loose_eq(actual),
        Expected::Matcher(matcher) => matcher.matches(actual),
        Expected::Array(items) => match actual.as_array() {
            Some(actual_items) => {
                items.len() == actual_items.len()
                    && items
                        .iter()
                        .zip(actual_items)
                        .all(|(expected, actual)| values_match(expected, actual))
            }
            None => false,
        },
        Expected::Map(entries) => match actual.as_map() {
            Some(actual_entries) => {
                entries.len() == actual_entries.len()
                    && entries.iter().all(|(key, expected)| {
                        actual_entries
                            .get(key)
                            .is_some_and(|value| values_match(expected, value))
                    })
            }
            None => false,
        },
    }
}

fn compares(op: CompareOp, actual: &Value, expected: &Value) -> bool {
    let Some(ordering) = actual.partial_compare(expected) else {
        return false;
    };
    match op {
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
        CompareOp::EqTo => ordering == Ordering::Equal,
    }
}

fn elements(actual: &Value) -> Option<Vec<Value>> {
    match actual {
        Value::Array(items) => Some(items.as_ref().clone()),
        Value::Set(items) => Some(items.iter().cloned().collect()),
        _ => None,
    }
}

fn includes(actual: &Value, items: &[Expected]) -> bool {
    match actual {
        Value::Array(_) | Value::Set(_) => {
            let Some(elements) = elements(actual) else {
                return false;
            };
            items
                .iter()
                .all(|item| elements.iter().any(|element| values_match(item, element)))
        }
        Value::Map(entries) => items.iter().all(|item| match item {
            Expected::Map(expected_entries) => expected_entries.iter().all(|(key, expected)| {
                entries
                    .get(key)
                    .is_some_and(|value| values_match(expected, value))
            }),
            Expected::Value(Value::Map(expected_entries)) => {
                expected_entries.iter().all(|(key, expected)| {
                    entries
                        .get(key)
                        .is_some_and(|value| expected.loose_eq(value))
                })
            }
            key => entries.keys().any(|actual_key| values_match(key, actual_key)),
        }),
        Value::Str(text) => items.iter().all(|item| match item {
            Expected::Value(Value::Str(needle)) => text.contains(needle.as_str()),
            _ => false,
        }),
        _ => false,
    }
}

// Each expected item must claim a distinct element. Backtracks so that a
// greedy early claim cannot block a later item.
fn contains_exactly(elements: &[Value], items: &[Expected]) -> bool {
    if elements.len() != items.len() {
        return false;
    }
    let mut claimed = vec![false; elements.len()];
    assign(elements, items, &mut claimed)
}

fn assign(elements: &[Value], items: &[Expected], claimed: &mut [bool]) -> bool {
    let Some((item, rest)) = items.split_first() else {
        return true;
    };
    for (index, element) in elements.iter().enumerate() {
        if claimed[index] || !values_match(item, element) {
            continue;
        }
        claimed[index] = true;
        if assign(elements, rest, claimed) {
            return true;
        }
        claimed[index] = false;
    }
    false
}

fn starts_with(actual: &Value, prefix: &Value) -> bool {
    match (actual, prefix) {
        (Value::Str(text), Value::Str(prefix)) => text.starts_with(prefix.as_str()),
        (Value::Array(items), Value::Array(prefix)) => {
            items.len() >= prefix.len()
                && items.iter().zip(prefix.iter()).all(|(a, b)| b.loose_eq(a))
        }
        _ => false,
    }
}

fn ends_with(actual: &Value, suffix: &Value) -> bool {
    match (actual, suffix) {
        (Value::Str(text), Value::Str(suffix)) => text.ends_with(suffix.as_str()),
        (Value::Array(items), Value::Array(suffix)) => {
            items.len() >= suffix.len()
                && items[items.len() - suffix.len()..]
                    .iter()
                    .zip(suffix.iter())
                    .all(|(a, b)| b.loose_eq(a))
        }
        _ => false,
    }
}

fn matches_target(target: &MatchTarget, actual: &Value) -> bool {
    match (target, actual) {
        (MatchTarget::Str(source), Value::Str(text)) => {
            source == text.as_str() || Regex::new(source).is_ok_and(|pattern| pattern.is_match(text))
        }
        (MatchTarget::Str(source), Value::Pattern(pattern)) => pattern.is_match(source),
        (MatchTarget::Pattern(pattern), Value::Str(text)) => pattern.is_match(text),
        (MatchTarget::Pattern(pattern), Value::Pattern(other)) => pattern.as_str() == other.as_str(),
        (MatchTarget::Matcher(matcher), actual) => matcher.matches(actual),
        _ => false,
    }
}

// Generated objects only answer attribute readers, which take no arguments.
fn responds(spec: &RespondToSpec, actual: &Value) -> bool {
    let Some(object) = actual.as_object() else {
        return false;
    };
    let signature_fits = spec.arity.is_none_or(|arity| arity == 0)
        && spec.keywords.is_empty()
        && !spec.unlimited_arguments
        && !spec.any_keywords;
    signature_fits && spec.names.iter().all(|name| object.responds_to(name))
}

fn outputs(stream: OutputStream, expected: Option<&Expected>, actual: &Value) -> bool {
    let Some(action) = actual.as_action() else {
        return false;
    };
    let (effects, outcome) = action.capture();
    if outcome.is_err() {
        return false;
    }
    let written = effects.stream(stream);
    match expected {
        None => !written.is_empty(),
        Some(expected) => values_match(expected, &Value::str(written)),
    }
}

fn interrupt_of(actual: &Value) -> Option<Interrupt> {
    actual.as_action().and_then(|action: &Action| action.capture().1.err())
}

fn raises(kind: Option<&str>, message: Option<&MessageExpectation>, actual: &Value) -> bool {
    let Some(Interrupt::Raised {
        kind: raised_kind,
        message: raised_message,
    }) = interrupt_of(actual)
    else {
        return false;
    };
    let kind_fits = kind.is_none_or(|kind| kind == raised_kind);
    let message_fits = match message {
        None => true,
        Some(MessageExpectation::Exact(text)) => *text == raised_message,
        Some(MessageExpectation::Pattern(pattern)) => pattern.is_match(&raised_message),
    };
    kind_fits && message_fits
}

fn throws(signal: Option<&str>, payload: Option<&Expected>, actual: &Value) -> bool {
    let Some(Interrupt::Thrown {
        signal: thrown_signal,
        payload: thrown_payload,
    }) = interrupt_of(actual)
    else {
        return false;
    };
    let signal_fits = signal.is_none_or(|signal| signal == thrown_signal);
    let payload_fits = match (payload, thrown_payload) {
        (None, _) => true,
        (Some(expected), Some(value)) => values_match(expected, &value),
        (Some(expected), None) => values_match(expected, &Value::Nil),
    };
    signal_fits && payload_fits
}

fn within(actual: &Value, delta: &Value, expected: &Value, percent: bool) -> bool {
    let (Some(actual), Some(delta), Some(expected)) =
        (actual.to_f64(), delta.to_f64(), expected.to_f64())
    else {
        return false;
    };
    let tolerance = if percent {
        delta * expected.abs() / 100.0
    } else {
        delta
    };
    (actual - expected).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::*;
    use crate::value::{Object, ValueType};

    #[test]
    fn test_equality_matchers() {
        let text = Value::str("foo");
        assert!(eq(1).matches(&Value::Float(1.0)));
        assert!(!eql(1).matches(&Value::Float(1.0)));
        assert!(eql("foo").matches(&text.duplicate()));
        assert!(!equal(text.clone()).matches(&text.duplicate()));
        assert!(equal(text.clone()).matches(&text));
    }

    #[test]
    fn test_comparisons() {
        assert!(be_lt(0).matches(&Value::Int(-1)));
        assert!(!be_lt(0).matches(&Value::Int(0)));
        assert!(be_le(0).matches(&Value::Int(0)));
        assert!(be_gt(0.5).matches(&Value::Int(1)));
        assert!(be_ge("b").matches(&Value::str("c")));
        assert!(!be_gt(0).matches(&Value::str("1")));
        assert!(be_eq_to(2).matches(&Value::Float(2.0)));
    }

    #[test]
    fn test_be_between() {
        assert!(be_between(1, 3).matches(&Value::Int(1)));
        assert!(be_between(1, 3).matches(&Value::Int(3)));
        assert!(!be_between(1, 3).exclusive().matches(&Value::Int(3)));
        assert!(be_between(1, 3).exclusive().matches(&Value::Float(2.5)));
        assert!(be_between(1, 3).exclusive().inclusive().matches(&Value::Int(1)));
    }

    #[test]
    fn test_type_matchers() {
        assert!(be_a_kind_of(ValueType::Numeric).matches(&Value::Float(1.0)));
        assert!(!be_an_instance_of(ValueType::Numeric).matches(&Value::Float(1.0)));
        assert!(be_an_instance_of(ValueType::String).matches(&Value::str("x")));
    }

    #[test]
    fn test_include() {
        let array = Value::array(vec![Value::Int(1), Value::str("a")]);
        assert!(include(vec![Expected::from(1), Expected::from("a")]).matches(&array));
        assert!(include(vec![be_a_kind_of(ValueType::String)]).matches(&array));
        assert!(!include(vec![2]).matches(&array));

        let map = Value::map(vec![(Value::symbol("foo"), Value::Int(1))]);
        assert!(include(vec![Expected::map(vec![(Value::symbol("foo"), be_gt(0))])]).matches(&map));
        assert!(include(vec![Value::symbol("foo")]).matches(&map));
        assert!(!include(vec![Value::symbol("bar")]).matches(&map));

        assert!(include(vec!["oob"]).matches(&Value::str("foobar")));
    }

    #[test]
    fn test_all() {
        let values = Value::array(vec![Value::Int(1), Value::Int(2)]);
        assert!(all(be_gt(0)).matches(&values));
        assert!(!all(be_gt(1)).matches(&values));
        assert!(all(be_gt(1)).matches(&Value::array(vec![])));
        assert!(!all(be_gt(0)).matches(&Value::Int(1)));
    }

    #[test]
    fn test_contain_exactly_backtracks() {
        let values = Value::array(vec![Value::Int(2), Value::Int(1)]);
        let matcher = contain_exactly(vec![Expected::from(be_gt(0)), Expected::from(2)]);
        assert!(matcher.matches(&values));
        assert!(!contain_exactly(vec![1, 1]).matches(&values));
        assert!(!contain_exactly(vec![1]).matches(&values));
    }

    #[test]
    fn test_start_and_end_with() {
        assert!(start_with("foo").matches(&Value::str("foobar")));
        assert!(!start_with("bar").matches(&Value::str("foobar")));
        assert!(end_with("bar").matches(&Value::str("foobar")));

        let array = Value::array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert!(start_with(Value::array(vec![Value::Int(1)])).matches(&array));
        assert!(end_with(Value::array(vec![Value::Int(2), Value::Int(3)])).matches(&array));
        assert!(!end_with(Value::array(vec![Value::Int(1)])).matches(&array));
    }

    #[test]
    fn test_have_attributes_and_respond_to() {
        let object = Value::object(Object::new(vec![
            ("name", Value::str("x")),
            ("size", Value::Int(3)),
        ]));
        assert!(have_attributes(vec![("size", be_gt(2))]).matches(&object));
        assert!(!have_attributes(vec![("missing", 1)]).matches(&object));
        assert!(respond_to(["name", "size"]).matches(&object));
        assert!(respond_to(["name"]).with_args(0).matches(&object));
        assert!(!respond_to(["name"]).with_args(1).matches(&object));
        assert!(!respond_to(["name"]).matches(&Value::str("name")));
    }

    #[test]
    fn test_match() {
        let pattern = Regex::new("^f").unwrap();
        assert!(match_str("o+").matches(&Value::str("foo")));
        assert!(match_str("foo").matches(&Value::pattern(Regex::new("fo").unwrap())));
        assert!(match_pattern(pattern).matches(&Value::str("foo")));
        assert!(match_matcher(start_with("f")).matches(&Value::str("foo")));
        assert!(!match_str("(").matches(&Value::str("foo")));
    }

    #[test]
    fn test_effect_matchers() {
        let printed = Value::action(Action::Output {
            stream: OutputStream::Stderr,
            text: Value::str("oops"),
        });
        assert!(output().to_stderr().matches(&printed));
        assert!(!output().matches(&printed));
        assert!(output_of("oops").to_stderr().matches(&printed));

        let raised = Value::action(Action::Raise {
            kind: "ArgumentError".to_string(),
            message: "bad".to_string(),
        });
        assert!(raise_error().matches(&raised));
        assert!(raise_error().of_kind("ArgumentError").with_message("bad").matches(&raised));
        assert!(!raise_error().of_kind("RuntimeError").matches(&raised));
        assert!(raise_error().with_message_matching(Regex::new("^b").unwrap()).matches(&raised));

        let thrown = Value::action(Action::Throw {
            signal: "done".to_string(),
            payload: Some(Value::Int(1)),
        });
        assert!(throw_symbol().matches(&thrown));
        assert!(throw_symbol_named("done").with_payload(1).matches(&thrown));
        assert!(!throw_symbol_named("done").with_payload(2).matches(&thrown));
        assert!(!raise_error().matches(&thrown));
    }

    #[test]
    fn test_truthiness_and_tolerance() {
        assert!(be_falsey().matches(&Value::Nil));
        assert!(be_truthy().matches(&Value::Int(0)));
        assert!(be_nil().matches(&Value::Nil));
        assert!(be_within(0.5).of(3).matches(&Value::Float(3.4)));
        assert!(!be_within(0.5).of(3).matches(&Value::Float(3.6)));
        assert!(be_within(10).percent_of(50).matches(&Value::Int(55)));
    }

    #[test]
    fn test_cover_and_satisfy() {
        let interval = Value::interval(Value::Int(1), Value::Int(10));
        assert!(cover(vec![1, 5, 10]).matches(&interval));
        assert!(!cover(vec![11]).matches(&interval));

        let even = satisfy("be even", |value| value.as_int().is_some_and(|n| n % 2 == 0));
        assert!(even.matches(&Value::Int(4)));
        assert!(!even.matches(&Value::Int(3)));
    }

    #[test]
    fn test_values_match_nested() {
        let expected = Expected::map(vec![(
            Value::symbol("list"),
            Expected::array(vec![Expected::from(1), Expected::from(be_a_kind_of(ValueType::String))]),
        )]);
        let actual = Value::map(vec![(
            Value::symbol("list"),
            Value::array(vec![Value::Int(1), Value::str("x")]),
        )]);
        assert!(values_match(&expected, &actual));
        assert!(!values_match(&expected, &Value::map(vec![])));
    }
}
