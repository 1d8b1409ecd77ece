//! Built-in translation rules.
//!
//! Each rule takes a matcher of one shape and builds a generator whose values
//! that matcher is likely to accept. The driver re-checks every value, so rules
//! may over-approximate (as `and` does) but must not fabricate a generator for
//! a shape they cannot invert.

pub mod effects;
pub mod numeric;
pub mod structure;

use std::sync::Arc;

use crate::error::{MatchgenError, Result};
use crate::generator::{BoxedGenerator, Generator};
use crate::matcher::{Matcher, MatcherKind, MatcherTag};
use crate::primitives::{self, ValueGenerator};
use crate::registry::{TranslationRegistry, TranslationRule};
use crate::value::Value;

/// Draws made by `be_truthy` before giving up on finding a truthy scalar
const TRUTHY_MAX_TRIES: usize = 100;

fn rule<F>(build: F) -> TranslationRule
where
    F: Fn(&Matcher, &TranslationRegistry) -> Result<ValueGenerator> + Send + Sync + 'static,
{
    Arc::new(build)
}

/// Every built-in shape paired with its rule. `satisfy` has no entry: an
/// arbitrary predicate has no inverse unless a generator is attached.
pub(crate) fn builtin_rules() -> Vec<(MatcherTag, TranslationRule)> {
    vec![
        (MatcherTag::Eq, rule(eq)),
        (MatcherTag::Eql, rule(eql)),
        (MatcherTag::Equal, rule(equal)),
        (MatcherTag::Compare, rule(numeric::compare)),
        (MatcherTag::BeBetween, rule(numeric::between)),
        (MatcherTag::KindOf, rule(type_membership)),
        (MatcherTag::InstanceOf, rule(type_membership)),
        (MatcherTag::Or, rule(or)),
        (MatcherTag::And, rule(and)),
        (MatcherTag::Include, rule(structure::include)),
        (MatcherTag::All, rule(structure::all)),
        (MatcherTag::ContainExactly, rule(structure::contain_exactly)),
        (MatcherTag::StartWith, rule(structure::start_with)),
        (MatcherTag::EndWith, rule(structure::end_with)),
        (MatcherTag::HaveAttributes, rule(structure::have_attributes)),
        (MatcherTag::Match, rule(structure::match_target)),
        (MatcherTag::RespondTo, rule(structure::respond_to)),
        (MatcherTag::Output, rule(effects::output)),
        (MatcherTag::RaiseError, rule(effects::raise_error)),
        (MatcherTag::ThrowSymbol, rule(effects::throw_symbol)),
        (MatcherTag::BeFalsey, rule(be_falsey)),
        (MatcherTag::BeTruthy, rule(be_truthy)),
        (MatcherTag::BeNil, rule(be_nil)),
        (MatcherTag::BeWithin, rule(numeric::within)),
        (MatcherTag::Cover, rule(numeric::cover)),
        (MatcherTag::Aliased, rule(aliased)),
    ]
}

/// Error for a rule invoked on a matcher of another shape
pub(crate) fn wrong_shape(matcher: &Matcher) -> MatchgenError {
    MatchgenError::unsupported(
        matcher.to_string(),
        format!("rule invoked for a {} matcher", matcher.tag()),
    )
}

fn eq(matcher: &Matcher, _registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Eq(expected) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    // Numbers and other immediates have no identity to protect
    if expected.is_numeric() || matches!(expected, Value::Nil | Value::Bool(_) | Value::Symbol(_)) {
        return Ok(primitives::constant(expected.clone()));
    }
    copies_of(matcher, expected)
}

fn eql(matcher: &Matcher, _registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Eql(expected) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    copies_of(matcher, expected)
}

// Objects and actions are equal only to themselves, so no copy can match
fn copies_of(matcher: &Matcher, value: &Value) -> Result<ValueGenerator> {
    if matches!(value, Value::Object(_) | Value::Action(_)) {
        return Err(MatchgenError::unsupported(
            matcher.to_string(),
            format!("a copy of a {} never equals the original", value.value_type()),
        ));
    }
    let value = value.clone();
    Ok(BoxedGenerator::from_fn(move |_rng, _config| Ok(value.duplicate())))
}

fn equal(matcher: &Matcher, _registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Equal(expected) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    Ok(primitives::constant(expected.clone()))
}

fn type_membership(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    match matcher.kind() {
        MatcherKind::KindOf(value_type) | MatcherKind::InstanceOf(value_type) => {
            registry.type_generator(*value_type, matcher)
        }
        _ => Err(wrong_shape(matcher)),
    }
}

fn or(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Or(left, right) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    Ok(primitives::one_of(
        registry.resolve(left)?,
        registry.resolve(right)?,
    ))
}

// Only the left side generates; the driver filters against both sides.
fn and(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::And(left, _) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    registry.resolve(left)
}

fn be_falsey(_matcher: &Matcher, _registry: &TranslationRegistry) -> Result<ValueGenerator> {
    Ok(primitives::one_of(
        primitives::constant(Value::Bool(false)),
        primitives::constant(Value::Nil),
    ))
}

fn be_truthy(_matcher: &Matcher, _registry: &TranslationRegistry) -> Result<ValueGenerator> {
    Ok(primitives::simple_printable()
        .such_that(Value::is_truthy, TRUTHY_MAX_TRIES)
        .described_as("be truthy")
        .boxed())
}

fn be_nil(_matcher: &Matcher, _registry: &TranslationRegistry) -> Result<ValueGenerator> {
    Ok(primitives::constant(Value::Nil))
}

fn aliased(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Aliased { base, .. } = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    registry.resolve(base)
}

/// Draw `count` values from `generator` with a shared RNG
#[cfg(test)]
pub(crate) fn sample(generator: &ValueGenerator, count: usize, seed: u64) -> Vec<Value> {
    let mut rng = crate::rng::create_seeded_rng(seed);
    let config = crate::config::GeneratorConfig::default();
    (0..count)
        .map(|_| generator.generate(&mut rng, &config).unwrap())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{TranslationRegistry, ValueGenerator, sample};
    use crate::action::Action;
    use crate::matcher::*;
    use crate::value::{Object, Value, ValueType};

    fn generator(matcher: &Matcher) -> ValueGenerator {
        TranslationRegistry::builtin().generator_for(matcher).unwrap()
    }

    #[test]
    fn test_eq_copies_heap_values() {
        let expected = Value::str("foo");
        for value in sample(&generator(&eq(expected.clone())), 5, 1) {
            assert_eq!(value, expected);
            assert!(!value.same(&expected));
        }

        for value in sample(&generator(&eq(3)), 5, 1) {
            assert_eq!(value, Value::Int(3));
        }
    }

    #[test]
    fn test_eql_and_equal() {
        let expected = Value::array(vec![Value::Int(1)]);
        for value in sample(&generator(&eql(expected.clone())), 5, 1) {
            assert!(!value.same(&expected));
            assert_eq!(value, expected);
        }
        for value in sample(&generator(&equal(expected.clone())), 5, 1) {
            assert!(value.same(&expected));
        }
    }

    #[test]
    fn test_eq_identity_literals_are_unsupported() {
        let registry = TranslationRegistry::builtin();
        let object = Value::object(Object::new(vec![("id", Value::Int(1))]));
        let action = Value::action(Action::Raise {
            kind: "RuntimeError".to_string(),
            message: "boom".to_string(),
        });
        for literal in [object.clone(), action] {
            for matcher in [eq(literal.clone()), eql(literal.clone())] {
                let error = registry.generator_for(&matcher).unwrap_err();
                assert!(error.is_unsupported());
            }
            assert!(registry.generator_for(&equal(literal)).is_ok());
        }

        // Nested objects are shared by the shallow copy and still compare equal
        let nested = Value::array(vec![object]);
        for value in sample(&generator(&eq(nested.clone())), 3, 1) {
            assert!(eq(nested.clone()).matches(&value));
        }
    }

    #[test]
    fn test_type_membership() {
        for value in sample(&generator(&be_a_kind_of(ValueType::Integer)), 20, 2) {
            assert_eq!(value.value_type(), ValueType::Integer);
        }
        for value in sample(&generator(&be_an_instance_of(ValueType::Map)), 5, 2) {
            assert_eq!(value.value_type(), ValueType::Map);
        }

        let registry = TranslationRegistry::builtin();
        let error = registry
            .generator_for(&be_a_kind_of(ValueType::Object))
            .unwrap_err();
        assert!(error.is_unsupported());
        let error = registry
            .generator_for(&be_a_kind_of(ValueType::Numeric))
            .unwrap_err();
        assert!(error.to_string().contains("abstract"));
    }

    #[test]
    fn test_or_uses_both_sides() {
        let values = sample(&generator(&eq(1).or(eq(2))), 50, 3);
        assert!(values.contains(&Value::Int(1)));
        assert!(values.contains(&Value::Int(2)));
    }

    #[test]
    fn test_and_is_left_biased() {
        for value in sample(&generator(&eq(1).and(be_gt(0))), 10, 3) {
            assert_eq!(value, Value::Int(1));
        }
    }

    #[test]
    fn test_truthiness() {
        let values = sample(&generator(&be_falsey()), 50, 4);
        assert!(values.iter().all(Value::is_falsy));
        assert!(values.contains(&Value::Nil));
        assert!(values.contains(&Value::Bool(false)));

        assert!(sample(&generator(&be_truthy()), 100, 4).iter().all(Value::is_truthy));
        assert_eq!(sample(&generator(&be_nil()), 3, 4), vec![Value::Nil; 3]);
    }

    #[test]
    fn test_aliased_delegates() {
        for value in sample(&generator(&a_kind_of(ValueType::String)), 10, 5) {
            assert_eq!(value.value_type(), ValueType::String);
        }
    }

    #[test]
    fn test_satisfy_has_no_rule() {
        let error = TranslationRegistry::builtin()
            .generator_for(&satisfy("be odd", |_| true))
            .unwrap_err();
        assert!(error.is_unsupported());
    }

    #[test]
    fn test_wrong_shape_is_reported() {
        let error = super::eq(&be_nil(), &TranslationRegistry::builtin()).unwrap_err();
        assert!(error.to_string().contains("BeNil"));
    }
}
