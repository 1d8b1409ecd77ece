//! Error types and result handling for matcher-driven generation.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while translating matchers into generators or drawing values from them
#[derive(Debug, Clone, Error)]
pub enum MatchgenError {
    /// The matcher (or a field combination within it) has no inverse generation rule
    #[error("Unsupported predicate `{matcher}`: {reason}")]
    UnsupportedPredicate { matcher: String, reason: String },

    /// The retry budget ran out before a candidate satisfied the matcher
    #[error("Generation exhausted for `{matcher}` after {attempts} attempts")]
    GenerationExhausted { matcher: String, attempts: usize },

    /// A translation rule, type generator or override was rejected at registration time
    #[error("Invalid registration for `{target}`: {reason}")]
    InvalidRegistration { target: String, reason: String },

    /// Configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MatchgenError>;

impl MatchgenError {
    /// Create an unsupported predicate error
    pub fn unsupported(matcher: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedPredicate {
            matcher: matcher.into(),
            reason: reason.into(),
        }
    }

    /// Create a generation exhausted error
    pub fn exhausted(matcher: impl Into<String>, attempts: usize) -> Self {
        Self::GenerationExhausted {
            matcher: matcher.into(),
            attempts,
        }
    }

    /// Create an invalid registration error
    pub fn invalid_registration(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRegistration {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the matcher can never be generated from
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedPredicate { .. })
    }

    /// Whether this error came from running out of retries
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::GenerationExhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let error = MatchgenError::unsupported("match /fo+/", "cannot generate from a pattern");
        assert_eq!(
            format!("{}", error),
            "Unsupported predicate `match /fo+/`: cannot generate from a pattern"
        );
        assert!(error.is_unsupported());
        assert!(!error.is_exhausted());
    }

    #[test]
    fn test_exhausted_display() {
        let error = MatchgenError::exhausted("be within 0.1 of 1.0", 100);
        assert_eq!(
            format!("{}", error),
            "Generation exhausted for `be within 0.1 of 1.0` after 100 attempts"
        );
        assert!(error.is_exhausted());
    }

    #[test]
    fn test_config_error_is_transparent() {
        let error: MatchgenError = ConfigError::InvalidMaxAttempts(0).into();
        assert_eq!(
            format!("{}", error),
            "Invalid max attempts: 0 (must be > 0)"
        );
    }

    #[test]
    fn test_invalid_registration_display() {
        let error = MatchgenError::invalid_registration("eq", "a rule is already registered");
        assert_eq!(
            format!("{}", error),
            "Invalid registration for `eq`: a rule is already registered"
        );
    }
}
