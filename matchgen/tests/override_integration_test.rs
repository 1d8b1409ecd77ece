//! Attaching custom generators to matchers

use matchgen::matcher::*;
use matchgen::{
    BoxedGenerator, DeriveConfig, GenerationDriver, Generator, TranslationRegistry, Value,
    ValueGenerator, ValueType, attach_generator, constant,
};
use rand::Rng;

fn negative_integers() -> ValueGenerator {
    BoxedGenerator::from_fn(|rng, _config| Ok(Value::Int(rng.r#gen::<i32>().min(-1) as i64)))
}

fn driver() -> GenerationDriver {
    GenerationDriver::with_config(DeriveConfig::seeded(99)).unwrap()
}

#[test]
fn test_attached_generator_is_used() {
    let matcher = be_lt(0).with_generator(negative_integers());
    for value in driver().derive(&matcher).unwrap().take(10).unwrap() {
        assert!(value.as_int().unwrap() < 0);
    }
}

#[test]
fn test_attached_generator_nested_in_all() {
    let matcher = all(be_lt(0).with_generator(negative_integers()));
    for value in driver().derive(&matcher).unwrap().take(10).unwrap() {
        assert!(matcher.matches(&value));
        assert!(value.as_array().unwrap().iter().all(|item| item.as_int().unwrap() < 0));
    }
}

#[test]
fn test_attached_generator_in_every_position() {
    let negative = be_lt(0).with_generator(negative_integers());
    let matchers = [
        include(vec![negative.clone()]),
        contain_exactly(vec![negative.clone(), negative.clone()]),
        have_attributes(vec![("balance", negative.clone())]),
        negative.clone().or(eq(5)),
        output_of(attach_generator(&a_kind_of(ValueType::String), constant(Value::str("ok")))),
    ];
    for matcher in &matchers {
        let derived = driver()
            .derive(matcher)
            .unwrap_or_else(|error| panic!("could not derive `{}`: {}", matcher, error));
        for value in derived.take(5).unwrap() {
            assert!(matcher.matches(&value), "`{}` rejected {}", matcher, value.inspect());
        }
    }
}

#[test]
fn test_override_replaces_builtin_rule() {
    let registry = TranslationRegistry::builtin();
    let matcher = be_a_kind_of(ValueType::Integer).with_generator(constant(Value::Int(12)));
    let generator = registry.resolve(&matcher).unwrap();

    let mut rng = matchgen::create_seeded_rng(0);
    let config = DeriveConfig::default().generator_config;
    for _ in 0..5 {
        assert_eq!(generator.generate(&mut rng, &config).unwrap(), Value::Int(12));
    }
}

#[test]
fn test_reattaching_replaces_on_the_copy_only() {
    let first = eq(1).or(eq(2)).with_generator(constant(Value::Int(1)));
    let second = first.with_generator(constant(Value::Int(2)));

    assert_eq!(driver().derive(&first).unwrap().take(3).unwrap(), vec![Value::Int(1); 3]);
    assert_eq!(driver().derive(&second).unwrap().take(3).unwrap(), vec![Value::Int(2); 3]);
}

#[test]
fn test_attachment_survives_clone_and_composition() {
    let attached = be_gt(100).with_generator(constant(Value::Int(101)));
    let copy = attached.clone();
    assert!(copy.has_override());

    let composite = all(copy);
    let values = driver().derive(&composite).unwrap().take(10).unwrap();
    for value in values {
        assert!(value.as_array().unwrap().iter().all(|item| *item == Value::Int(101)));
    }
}

#[test]
fn test_generator_violating_matcher_exhausts() {
    let driver = GenerationDriver::with_config(DeriveConfig::seeded(1).with_max_attempts(10)).unwrap();
    let matcher = be_lt(0).with_generator(constant(Value::Int(3)));
    let error = driver.derive(&matcher).unwrap().take(1).unwrap_err();
    assert!(error.is_exhausted());
}
