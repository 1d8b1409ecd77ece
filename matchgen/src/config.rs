//! Configuration types for controlling generation and the constrained derivation loop.

use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid retry budget (must be > 0)
    #[error("Invalid max attempts: {0} (must be > 0)")]
    InvalidMaxAttempts(usize),
    /// Invalid size hint (must be > 0)
    #[error("Invalid size hint: {0} (must be > 0)")]
    InvalidSizeHint(usize),
    /// Invalid integer span (must be > 0)
    #[error("Invalid integer span: {0} (must be > 0)")]
    InvalidIntegerSpan(i64),
    /// Invalid float span (must be finite and > 0)
    #[error("Invalid float span: {0} (must be finite and > 0)")]
    InvalidFloatSpan(f64),
}

/// Configuration for generators
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Hint for the size of generated collections and the magnitude of canonical numbers
    pub size_hint: usize,
    /// How far an unbounded integer interval extends past its one known bound
    pub integer_span: i64,
    /// How far an unbounded float interval extends past its one known bound
    pub float_span: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            size_hint: 10,
            integer_span: 1_000_000,
            float_span: 1.0e6,
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator configuration with validation
    pub fn new(size_hint: usize, integer_span: i64, float_span: f64) -> Result<Self, ConfigError> {
        let config = Self {
            size_hint,
            integer_span,
            float_span,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the generator configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_hint == 0 {
            return Err(ConfigError::InvalidSizeHint(self.size_hint));
        }
        if self.integer_span <= 0 {
            return Err(ConfigError::InvalidIntegerSpan(self.integer_span));
        }
        if !self.float_span.is_finite() || self.float_span <= 0.0 {
            return Err(ConfigError::InvalidFloatSpan(self.float_span));
        }
        Ok(())
    }

    /// Canonical magnitude for sized numeric generators
    pub fn magnitude(&self) -> i64 {
        i64::try_from(self.size_hint).unwrap_or(i64::MAX)
    }
}

/// Configuration for deriving constrained value streams from matchers
#[derive(Debug, Clone, PartialEq)]
pub struct DeriveConfig {
    /// Optional seed for reproducible value streams
    pub seed: Option<u64>,
    /// Consecutive rejected candidates tolerated before giving up
    pub max_attempts: usize,
    /// Generator configuration used for every draw
    pub generator_config: GeneratorConfig,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_attempts: 100,
            generator_config: GeneratorConfig::default(),
        }
    }
}

impl DeriveConfig {
    /// Create a configuration that always produces the same stream
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the retry budget
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the size hint of the generator configuration
    pub fn with_size_hint(mut self, size_hint: usize) -> Self {
        self.generator_config.size_hint = size_hint;
        self
    }

    /// Replace the generator configuration
    pub fn with_generator_config(mut self, generator_config: GeneratorConfig) -> Self {
        self.generator_config = generator_config;
        self
    }

    /// Validate the derive configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(self.max_attempts));
        }
        self.generator_config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_config_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.size_hint, 10);
        assert_eq!(config.integer_span, 1_000_000);
        assert_eq!(config.float_span, 1.0e6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generator_config_validation() {
        assert_eq!(
            GeneratorConfig::new(0, 10, 1.0),
            Err(ConfigError::InvalidSizeHint(0))
        );
        assert_eq!(
            GeneratorConfig::new(5, -1, 1.0),
            Err(ConfigError::InvalidIntegerSpan(-1))
        );
        assert!(matches!(
            GeneratorConfig::new(5, 10, f64::INFINITY),
            Err(ConfigError::InvalidFloatSpan(_))
        ));
        assert!(GeneratorConfig::new(5, 10, 0.5).is_ok());
    }

    #[test]
    fn test_derive_config_builder() {
        let config = DeriveConfig::default()
            .with_seed(42)
            .with_max_attempts(7)
            .with_size_hint(3);

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.generator_config.size_hint, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derive_config_rejects_zero_attempts() {
        let config = DeriveConfig::seeded(1).with_max_attempts(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxAttempts(0)));
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            format!("{}", ConfigError::InvalidSizeHint(0)),
            "Invalid size hint: 0 (must be > 0)"
        );
    }
}
