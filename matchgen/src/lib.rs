#![allow(clippy::result_large_err)]

//! # Matchgen - Generators Derived From Matchers
//!
//! Matchgen turns the predicates you assert with into generators of values that
//! satisfy them. Write `be_between(1, 10)` once and use it both to check a
//! result and to produce example inputs for a property test.
//!
//! ## Quick Start
//!
//! ```rust
//! use matchgen::matcher::*;
//! use matchgen::{Value, ValueType, derive_generator};
//!
//! let matcher = all(be_a_kind_of(ValueType::Integer).and(be_gt(0)));
//! let derived = derive_generator(&matcher).unwrap();
//!
//! for value in derived.take(5).unwrap() {
//!     assert!(matcher.matches(&value));
//! }
//! ```
//!
//! Matchers that have no meaningful inverse, such as `satisfy` or a `match`
//! against a compiled pattern, fail with
//! [`MatchgenError::UnsupportedPredicate`] unless a generator is attached:
//!
//! ```rust
//! use matchgen::matcher::*;
//! use matchgen::{Value, attach_generator, constant, derive_generator};
//!
//! let odd = satisfy("be odd", |value| value.as_int().is_some_and(|n| n % 2 != 0));
//! assert!(derive_generator(&odd).is_err());
//!
//! let odd = attach_generator(&odd, constant(Value::Int(3)));
//! assert_eq!(derive_generator(&odd).unwrap().take(1).unwrap(), vec![Value::Int(3)]);
//! ```

pub mod action;
pub mod config;
pub mod driver;
pub mod error;
pub mod generator;
pub mod matcher;
pub mod overrides;
pub mod primitives;
pub mod registry;
pub mod rng;
pub mod rules;
pub mod types;
pub mod value;

use std::sync::OnceLock;

// Re-export the main public API
pub use action::{Action, CapturedEffects, EffectSink, Interrupt, OutputStream, ProcessStreams};
pub use config::{ConfigError, DeriveConfig, GeneratorConfig};
pub use driver::{Derived, GenerationDriver, Samples};
pub use error::{MatchgenError, Result};
pub use generator::{
    BoxedGenerator, ConstantGenerator, FrequencyGenerator, Generator, OneOfGenerator,
};
pub use matcher::{
    CompareOp, CustomMatcher, Expected, MatchTarget, Matcher, MatcherKind, MatcherTag,
    MessageExpectation, RespondToSpec,
};
pub use primitives::*;
pub use registry::{TranslationRegistry, TranslationRule};
pub use rng::{DefaultRngProvider, RngProvider, create_rng, create_seeded_rng};
pub use types::TypeRegistry;
pub use value::{Interval, Object, Value, ValueType};

fn default_driver() -> &'static GenerationDriver {
    static DRIVER: OnceLock<GenerationDriver> = OnceLock::new();
    DRIVER.get_or_init(GenerationDriver::default)
}

/// Derive a filtered generator from `matcher` using the built-in registry and
/// the default configuration
pub fn derive_generator(matcher: &Matcher) -> Result<Derived> {
    default_driver().derive(matcher)
}

/// A copy of `matcher` that generates from `generator`
pub fn attach_generator(matcher: &Matcher, generator: ValueGenerator) -> Matcher {
    matcher.with_generator(generator)
}
