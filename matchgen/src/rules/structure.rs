//! Rules for collection, string and object matchers.

use regex::Regex;

use super::wrong_shape;
use crate::error::{MatchgenError, Result};
use crate::generator::Generator;
use crate::matcher::{Expected, MatchTarget, Matcher, MatcherKind};
use crate::primitives::{self, CountSpec, ValueGenerator};
use crate::registry::TranslationRegistry;
use crate::value::{Object, Value};

pub(crate) fn include(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Include(items) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    // A single map-shaped expectation describes the map itself
    if let [item @ (Expected::Map(_) | Expected::Value(Value::Map(_)))] = items.as_slice() {
        return registry.expected_generator(item);
    }
    Ok(primitives::tuple(expected_slots(items, registry)?))
}

pub(crate) fn all(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::All(element) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    Ok(primitives::array_of(registry.resolve(element)?, CountSpec::Sized))
}

pub(crate) fn contain_exactly(
    matcher: &Matcher,
    registry: &TranslationRegistry,
) -> Result<ValueGenerator> {
    let MatcherKind::ContainExactly(items) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    Ok(primitives::tuple(expected_slots(items, registry)?)
        .flat_map(primitives::shuffle)
        .boxed())
}

fn expected_slots(items: &[Expected], registry: &TranslationRegistry) -> Result<Vec<ValueGenerator>> {
    items
        .iter()
        .map(|item| registry.expected_generator(item))
        .collect()
}

pub(crate) fn start_with(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::StartWith(prefix) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    affixed(matcher, registry, prefix, true)
}

pub(crate) fn end_with(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::EndWith(suffix) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    affixed(matcher, registry, suffix, false)
}

/// Canonical values of the literal's type with the literal glued to the front
/// or the back
fn affixed(
    matcher: &Matcher,
    registry: &TranslationRegistry,
    literal: &Value,
    in_front: bool,
) -> Result<ValueGenerator> {
    if !matches!(literal, Value::Str(_) | Value::Array(_)) {
        return Err(MatchgenError::unsupported(
            matcher.to_string(),
            format!("cannot concatenate onto a {}", literal.value_type()),
        ));
    }
    let base = registry.type_generator(literal.value_type(), matcher)?;
    let literal = literal.clone();
    let description = matcher.to_string();
    Ok(base
        .try_map(move |generated| {
            let joined = if in_front {
                literal.concat(&generated)
            } else {
                generated.concat(&literal)
            };
            joined.ok_or_else(|| {
                MatchgenError::unsupported(
                    description.clone(),
                    format!("canonical generator produced a {}", generated.value_type()),
                )
            })
        })
        .boxed())
}

pub(crate) fn have_attributes(
    matcher: &Matcher,
    registry: &TranslationRegistry,
) -> Result<ValueGenerator> {
    let MatcherKind::HaveAttributes(attributes) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    let entries = attributes
        .iter()
        .map(|(name, expected)| Ok((Value::symbol(name), registry.expected_generator(expected)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(primitives::hash(entries).map(into_object).boxed())
}

fn into_object(drawn: Value) -> Value {
    let attributes: Vec<(String, Value)> = drawn
        .as_map()
        .into_iter()
        .flatten()
        .filter_map(|(name, value)| Some((name.as_symbol()?.to_string(), value.clone())))
        .collect();
    Value::object(Object::new(attributes))
}

pub(crate) fn match_target(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Match(target) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    match target {
        MatchTarget::Str(source) => {
            let pattern = Regex::new(source).map_err(|error| {
                MatchgenError::unsupported(matcher.to_string(), format!("invalid pattern: {}", error))
            })?;
            Ok(primitives::constant(Value::pattern(pattern)))
        }
        MatchTarget::Pattern(_) => Err(MatchgenError::unsupported(
            matcher.to_string(),
            "cannot generate a string from a compiled pattern",
        )),
        MatchTarget::Matcher(inner) => registry.resolve(inner),
    }
}

pub(crate) fn respond_to(matcher: &Matcher, _registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::RespondTo(spec) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    if spec.is_constrained() {
        return Err(MatchgenError::unsupported(
            matcher.to_string(),
            "cannot generate methods with specific arities or keywords",
        ));
    }
    let names = spec.names.clone();
    Ok(primitives::array_of(
        primitives::simple_printable(),
        CountSpec::Exact(names.len()),
    )
    .map(move |returned| {
        let returned = returned.as_array().map(<[Value]>::to_vec).unwrap_or_default();
        Value::object(Object::new(names.iter().cloned().zip(returned)))
    })
    .boxed())
}

#[cfg(test)]
mod tests {
    use crate::matcher::*;
    use crate::registry::TranslationRegistry;
    use crate::rules::sample;
    use crate::value::{Value, ValueType};
    use regex::Regex;

    fn draw(matcher: &Matcher, count: usize) -> Vec<Value> {
        let generator = TranslationRegistry::builtin().generator_for(matcher).unwrap();
        sample(&generator, count, 23)
    }

    fn unsupported(matcher: &Matcher) -> bool {
        TranslationRegistry::builtin()
            .generator_for(matcher)
            .is_err_and(|error| error.is_unsupported())
    }

    #[test]
    fn test_include_builds_tuple() {
        let matcher = include(vec![Expected::from(1), Expected::from(be_a_kind_of(ValueType::String))]);
        for value in draw(&matcher, 10) {
            let items = value.as_array().unwrap();
            assert_eq!(items.len(), 2);
            assert_eq!(items[0], Value::Int(1));
            assert!(matcher.matches(&value));
        }
    }

    #[test]
    fn test_include_single_map() {
        let matcher = include(vec![Expected::map(vec![(Value::symbol("foo"), be_gt(0))])]);
        for value in draw(&matcher, 10) {
            assert!(value.as_map().is_some());
            assert!(matcher.matches(&value));
        }

        let literal = Value::map(vec![(Value::symbol("a"), Value::Int(1))]);
        for value in draw(&include(vec![literal.clone()]), 3) {
            assert_eq!(value, literal);
        }
    }

    #[test]
    fn test_all_draws_arrays() {
        for value in draw(&all(be_lt(0)), 20) {
            assert!(value.as_array().unwrap().iter().all(|n| n.as_int().unwrap() < 0));
        }
    }

    #[test]
    fn test_contain_exactly_permutes() {
        let matcher = contain_exactly(vec![1, 2, 3]);
        let values = draw(&matcher, 40);
        for value in &values {
            let mut items = value.as_array().unwrap().to_vec();
            items.sort();
            assert_eq!(items, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        }
        let distinct: std::collections::BTreeSet<_> = values.into_iter().collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_affixes() {
        for value in draw(&start_with("foo"), 20) {
            assert!(value.as_str().unwrap().starts_with("foo"));
        }
        for value in draw(&end_with("foo"), 20) {
            assert!(value.as_str().unwrap().ends_with("foo"));
        }
        let prefix = Value::array(vec![Value::Int(9)]);
        for value in draw(&start_with(prefix.clone()), 20) {
            assert_eq!(value.as_array().unwrap()[0], Value::Int(9));
        }
        assert!(unsupported(&start_with(5)));
    }

    #[test]
    fn test_have_attributes_builds_objects() {
        let matcher = have_attributes(vec![("size", Expected::from(be_between(1, 3))), ("name", Expected::from("x"))]);
        for value in draw(&matcher, 20) {
            let object = value.as_object().unwrap();
            assert_eq!(object.attribute("name"), Some(&Value::str("x")));
            assert!(matcher.matches(&value));
        }
    }

    #[test]
    fn test_match_rules() {
        let values = draw(&match_str("fo+"), 2);
        assert_eq!(values[0].as_pattern().unwrap().as_str(), "fo+");
        assert!(match_str("fo+").matches(&values[0]));

        assert!(unsupported(&match_pattern(Regex::new("x").unwrap())));
        assert!(unsupported(&match_str("(")));

        for value in draw(&match_matcher(start_with("a")), 5) {
            assert!(value.as_str().unwrap().starts_with('a'));
        }
    }

    #[test]
    fn test_respond_to() {
        let matcher = respond_to(["first", "second"]);
        for value in draw(&matcher, 10) {
            let object = value.as_object().unwrap();
            assert!(object.responds_to("first"));
            assert!(object.responds_to("second"));
        }
        assert!(unsupported(&respond_to(["call"]).with_args(1)));
        assert!(unsupported(&respond_to(["call"]).with_keywords(["key"])));
        assert!(unsupported(&respond_to(["call"]).with_unlimited_arguments()));
        assert!(unsupported(&respond_to(["call"]).with_any_keywords()));
    }
}
