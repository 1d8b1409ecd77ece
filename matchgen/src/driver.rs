//! Constrained generation.
//!
//! The driver resolves a matcher to a generator and wraps it so that every
//! value handed out has been re-checked against the matcher. Candidates the
//! matcher rejects are redrawn, up to the configured retry budget.

use std::sync::Arc;

use rand::rngs::StdRng;
use tracing::{trace, warn};

use crate::config::{DeriveConfig, GeneratorConfig};
use crate::error::{MatchgenError, Result};
use crate::generator::Generator;
use crate::matcher::Matcher;
use crate::primitives::ValueGenerator;
use crate::registry::TranslationRegistry;
use crate::rng::{DefaultRngProvider, RngProvider};
use crate::value::Value;

/// Derives filtered value streams from matchers using one registry and one
/// configuration
#[derive(Debug, Clone)]
pub struct GenerationDriver {
    registry: Arc<TranslationRegistry>,
    config: DeriveConfig,
}

impl GenerationDriver {
    /// Create a driver, validating the configuration
    pub fn new(registry: TranslationRegistry, config: DeriveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: Arc::new(registry),
            config,
        })
    }

    /// Driver over the built-in registry with the given configuration
    pub fn with_config(config: DeriveConfig) -> Result<Self> {
        Self::new(TranslationRegistry::builtin(), config)
    }

    /// The registry matchers are resolved against
    pub fn registry(&self) -> &TranslationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DeriveConfig {
        &self.config
    }

    /// Resolve `matcher` and wrap the result in a filtering generator.
    ///
    /// Fails immediately if the matcher, or any matcher nested in it, cannot be
    /// translated.
    pub fn derive(&self, matcher: &Matcher) -> Result<Derived> {
        let generator = self.registry.resolve(matcher)?;
        Ok(Derived {
            matcher: matcher.clone(),
            generator,
            config: self.config.clone(),
        })
    }
}

impl Default for GenerationDriver {
    fn default() -> Self {
        Self {
            registry: Arc::new(TranslationRegistry::builtin()),
            config: DeriveConfig::default(),
        }
    }
}

/// A generator whose every value satisfies the matcher it was derived from
#[derive(Debug, Clone)]
pub struct Derived {
    matcher: Matcher,
    generator: ValueGenerator,
    config: DeriveConfig,
}

impl Derived {
    /// The matcher values are checked against
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// The unfiltered generator the matcher resolved to
    pub fn generator(&self) -> &ValueGenerator {
        &self.generator
    }

    /// A fresh lazy stream of accepted values.
    ///
    /// With a seed every call replays the same stream; without one each call
    /// starts from a new seed, available from [`Samples::seed`]. The stream ends
    /// after yielding its first error.
    pub fn samples(&self) -> Samples {
        let seed = DefaultRngProvider.resolve_seed(self.config.seed);
        Samples {
            derived: self.clone(),
            rng: DefaultRngProvider.seeded(seed),
            seed,
            finished: false,
        }
    }

    /// The first `count` values of a fresh stream
    pub fn take(&self, count: usize) -> Result<Vec<Value>> {
        self.samples().take(count).collect()
    }

    fn draw(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        for attempt in 1..=self.config.max_attempts {
            let candidate = self.generator.generate(rng, config)?;
            if self.matcher.matches(&candidate) {
                return Ok(candidate);
            }
            trace!(
                matcher = %self.matcher,
                candidate = %candidate.inspect(),
                attempt,
                "rejected candidate"
            );
        }
        warn!(
            matcher = %self.matcher,
            attempts = self.config.max_attempts,
            "generation exhausted"
        );
        Err(MatchgenError::exhausted(
            self.matcher.to_string(),
            self.config.max_attempts,
        ))
    }
}

impl Generator<Value> for Derived {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        self.draw(rng, config)
    }
}

/// Lazy stream of values accepted by a matcher
#[derive(Debug)]
pub struct Samples {
    derived: Derived,
    rng: StdRng,
    seed: u64,
    finished: bool,
}

impl Samples {
    /// The seed this stream runs on
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Iterator for Samples {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let drawn = self
            .derived
            .draw(&mut self.rng, &self.derived.config.generator_config);
        if drawn.is_err() {
            self.finished = true;
        }
        Some(drawn)
    }
}

impl std::iter::FusedIterator for Samples {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::*;
    use crate::primitives;
    use crate::value::ValueType;

    fn seeded() -> GenerationDriver {
        GenerationDriver::with_config(DeriveConfig::seeded(42)).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let error = GenerationDriver::with_config(DeriveConfig::default().with_max_attempts(0))
            .unwrap_err();
        assert!(matches!(error, MatchgenError::Config(_)));
    }

    #[test]
    fn test_values_satisfy_matcher() {
        let matcher = be_a_kind_of(ValueType::Integer).and(be_gt(0));
        let derived = seeded().derive(&matcher).unwrap();
        for value in derived.take(50).unwrap() {
            assert!(matcher.matches(&value));
        }
    }

    #[test]
    fn test_seeded_streams_replay() {
        let derived = seeded().derive(&be_a_kind_of(ValueType::String)).unwrap();
        assert_eq!(derived.take(10).unwrap(), derived.take(10).unwrap());
    }

    #[test]
    fn test_exhaustion_ends_stream() {
        let matcher = eq(1).and(eq(2));
        let driver = GenerationDriver::with_config(DeriveConfig::seeded(1).with_max_attempts(5)).unwrap();
        let derived = driver.derive(&matcher).unwrap();

        let mut samples = derived.samples();
        let error = samples.next().unwrap().unwrap_err();
        assert!(error.is_exhausted());
        assert!(error.to_string().contains("after 5 attempts"));
        assert!(samples.next().is_none());
    }

    #[test]
    fn test_unseeded_stream_reports_its_seed() {
        let matcher = be_a_kind_of(ValueType::Integer);
        let derived = GenerationDriver::default().derive(&matcher).unwrap();
        let mut samples = derived.samples();
        let first = samples.next().unwrap().unwrap();

        let replay = GenerationDriver::with_config(DeriveConfig::seeded(samples.seed()))
            .unwrap()
            .derive(&matcher)
            .unwrap();
        assert_eq!(replay.take(1).unwrap(), vec![first]);
    }

    #[test]
    fn test_unsupported_fails_at_derive() {
        let error = seeded().derive(&all(satisfy("be odd", |_| true))).unwrap_err();
        assert!(error.is_unsupported());
    }

    #[test]
    fn test_derived_composes_as_generator() {
        let derived = seeded().derive(&be_between(1, 3)).unwrap();
        let wrapped = primitives::array_of(derived.boxed(), primitives::CountSpec::Exact(4));
        let mut rng = crate::rng::create_seeded_rng(3);
        let value = wrapped.generate(&mut rng, &GeneratorConfig::default()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert!(all(be_between(1, 3)).matches(&value));
    }
}
