//! Canonical generators keyed by value type.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{MatchgenError, Result};
use crate::primitives::{self, ValueGenerator};
use crate::value::ValueType;

/// Registry holding one canonical generator per [`ValueType`]
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    generators: HashMap<ValueType, ValueGenerator>,
}

impl TypeRegistry {
    /// Create a new empty type registry
    pub fn new() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Registry with generators for integers, floats, rationals, strings,
    /// symbols, arrays, sets and maps
    pub fn builtin() -> Self {
        let generators = [
            (ValueType::Integer, primitives::integer()),
            (ValueType::Float, primitives::float()),
            (ValueType::Rational, primitives::rational()),
            (ValueType::String, primitives::string()),
            (ValueType::Symbol, primitives::symbol()),
            (ValueType::Array, primitives::array()),
            (ValueType::Set, primitives::set()),
            (ValueType::Map, primitives::map()),
        ];
        Self {
            generators: generators.into_iter().collect(),
        }
    }

    /// Register the canonical generator for a type.
    ///
    /// Abstract types and types that already have a generator are rejected.
    pub fn register(&mut self, value_type: ValueType, generator: ValueGenerator) -> Result<()> {
        if value_type.is_abstract() {
            return Err(MatchgenError::invalid_registration(
                value_type.name(),
                "abstract types have no canonical generator",
            ));
        }
        if self.generators.contains_key(&value_type) {
            return Err(MatchgenError::invalid_registration(
                value_type.name(),
                "a generator is already registered for this type",
            ));
        }
        debug!(value_type = %value_type, "registered canonical generator");
        self.generators.insert(value_type, generator);
        Ok(())
    }

    /// Get the canonical generator for a type
    pub fn get(&self, value_type: ValueType) -> Option<&ValueGenerator> {
        self.generators.get(&value_type)
    }

    /// Check if a generator is registered for a type
    pub fn contains(&self, value_type: ValueType) -> bool {
        self.generators.contains_key(&value_type)
    }

    /// Get the number of registered generators
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::Generator;
    use crate::rng::create_seeded_rng;
    use crate::value::Value;

    #[test]
    fn test_type_registry_basic() {
        let mut registry = TypeRegistry::new();

        assert!(registry.is_empty());
        assert!(!registry.contains(ValueType::Boolean));

        registry
            .register(ValueType::Boolean, primitives::boolean())
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(ValueType::Boolean));
        assert!(!registry.contains(ValueType::Integer));
    }

    #[test]
    fn test_builtin_types() {
        let registry = TypeRegistry::builtin();
        assert_eq!(registry.len(), 8);
        assert!(registry.contains(ValueType::Rational));
        assert!(!registry.contains(ValueType::Numeric));
        assert!(!registry.contains(ValueType::Object));

        let mut rng = create_seeded_rng(9);
        let config = GeneratorConfig::default();
        let drawn = registry
            .get(ValueType::Symbol)
            .unwrap()
            .generate(&mut rng, &config)
            .unwrap();
        assert_eq!(drawn.value_type(), ValueType::Symbol);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = TypeRegistry::builtin();
        let error = registry
            .register(ValueType::Integer, primitives::constant(Value::Int(1)))
            .unwrap_err();

        assert!(matches!(error, MatchgenError::InvalidRegistration { .. }));

        // The existing generator is untouched
        let mut rng = create_seeded_rng(1);
        let config = GeneratorConfig::default();
        let values: Vec<Value> = (0..20)
            .map(|_| {
                registry
                    .get(ValueType::Integer)
                    .unwrap()
                    .generate(&mut rng, &config)
                    .unwrap()
            })
            .collect();
        assert!(values.iter().any(|value| *value != Value::Int(1)));
    }

    #[test]
    fn test_abstract_registration_is_rejected() {
        let mut registry = TypeRegistry::new();
        let error = registry
            .register(ValueType::Numeric, primitives::integer())
            .unwrap_err();
        assert!(error.to_string().contains("Numeric"));
    }
}
