//! Translation from matcher shapes to generator-construction rules.
//!
//! The registry is an open table keyed by [`MatcherTag`]. Built-in shapes are
//! installed by [`TranslationRegistry::builtin`]; new shapes, including
//! [`CustomMatcher`](crate::matcher::CustomMatcher)s defined outside the crate,
//! are added with [`TranslationRegistry::register`] without touching existing
//! entries.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{MatchgenError, Result};
use crate::matcher::{Expected, Matcher, MatcherTag};
use crate::primitives::{self, ValueGenerator};
use crate::rules;
use crate::types::TypeRegistry;
use crate::value::ValueType;

/// A rule building the generator for one matcher shape.
///
/// Rules receive the registry so they can resolve nested matchers.
pub type TranslationRule =
    Arc<dyn Fn(&Matcher, &TranslationRegistry) -> Result<ValueGenerator> + Send + Sync>;

/// Table of translation rules plus the canonical type generators they draw on
#[derive(Clone, Default)]
pub struct TranslationRegistry {
    rules: HashMap<MatcherTag, TranslationRule>,
    types: TypeRegistry,
}

impl TranslationRegistry {
    /// Create a registry with no rules and no type generators
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            types: TypeRegistry::new(),
        }
    }

    /// Registry with a rule for every built-in matcher shape and the built-in
    /// canonical type generators
    pub fn builtin() -> Self {
        let mut registry = Self {
            rules: HashMap::new(),
            types: TypeRegistry::builtin(),
        };
        for (tag, rule) in rules::builtin_rules() {
            registry.rules.insert(tag, rule);
        }
        registry
    }

    /// Add the rule for a matcher shape.
    ///
    /// Fails if the shape already has a rule or a custom shape has an empty name.
    pub fn register<F>(&mut self, tag: MatcherTag, rule: F) -> Result<()>
    where
        F: Fn(&Matcher, &TranslationRegistry) -> Result<ValueGenerator> + Send + Sync + 'static,
    {
        if let MatcherTag::Custom(name) = &tag {
            if name.trim().is_empty() {
                return Err(MatchgenError::invalid_registration(
                    tag.to_string(),
                    "custom matcher names must not be empty",
                ));
            }
        }
        if self.rules.contains_key(&tag) {
            return Err(MatchgenError::invalid_registration(
                tag.to_string(),
                "a translation rule is already registered for this shape",
            ));
        }
        debug!(tag = %tag, "registered translation rule");
        self.rules.insert(tag, Arc::new(rule));
        Ok(())
    }

    /// Add the canonical generator for a value type
    pub fn register_type(&mut self, value_type: ValueType, generator: ValueGenerator) -> Result<()> {
        self.types.register(value_type, generator)
    }

    /// Canonical type generators used by type-driven rules
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Canonical generator for a type, or an unsupported error naming `matcher`
    pub fn type_generator(&self, value_type: ValueType, matcher: &Matcher) -> Result<ValueGenerator> {
        if value_type.is_abstract() {
            return Err(MatchgenError::unsupported(
                matcher.to_string(),
                format!("{} is abstract and has no canonical generator", value_type),
            ));
        }
        self.types.get(value_type).cloned().ok_or_else(|| {
            MatchgenError::unsupported(
                matcher.to_string(),
                format!("no canonical generator registered for {}", value_type),
            )
        })
    }

    /// Check if a rule is registered for a shape
    pub fn contains(&self, tag: &MatcherTag) -> bool {
        self.rules.contains_key(tag)
    }

    /// Get the number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build the generator for a matcher from its shape's rule, ignoring any
    /// attached generator. See [`TranslationRegistry::resolve`] for the lookup
    /// that honours overrides.
    pub fn generator_for(&self, matcher: &Matcher) -> Result<ValueGenerator> {
        let tag = matcher.tag();
        let rule = self.rules.get(&tag).ok_or_else(|| {
            MatchgenError::unsupported(
                matcher.to_string(),
                format!("no translation rule registered for {}", tag),
            )
        })?;
        rule(matcher, self)
    }

    /// Generator for an expected literal: values are produced as-is, matchers
    /// are resolved, arrays become tuples and maps fixed-key maps
    pub fn expected_generator(&self, expected: &Expected) -> Result<ValueGenerator> {
        match expected {
            Expected::Value(value) => Ok(primitives::constant(value.clone())),
            Expected::Matcher(matcher) => self.resolve(matcher),
            Expected::Array(items) => {
                let slots = items
                    .iter()
                    .map(|item| self.expected_generator(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(primitives::tuple(slots))
            }
            Expected::Map(entries) => {
                let entries = entries
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.expected_generator(item)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(primitives::hash(entries))
            }
        }
    }
}

impl fmt::Debug for TranslationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<String> = self.rules.keys().map(ToString::to_string).collect();
        tags.sort();
        f.debug_struct("TranslationRegistry")
            .field("rules", &tags)
            .field("types", &self.types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::Generator;
    use crate::matcher::*;
    use crate::rng::create_seeded_rng;
    use crate::value::Value;

    #[derive(Debug)]
    struct Even;

    impl CustomMatcher for Even {
        fn name(&self) -> &str {
            "even"
        }

        fn matches(&self, actual: &Value) -> bool {
            actual.as_int().is_some_and(|n| n % 2 == 0)
        }
    }

    #[test]
    fn test_builtin_registry_covers_builtin_shapes() {
        let registry = TranslationRegistry::builtin();
        assert!(registry.contains(&MatcherTag::Eq));
        assert!(registry.contains(&MatcherTag::ThrowSymbol));
        assert!(!registry.contains(&MatcherTag::Satisfy));
        assert!(!registry.contains(&MatcherTag::Custom("even".to_string())));
    }

    #[test]
    fn test_duplicate_rule_is_rejected() {
        let mut registry = TranslationRegistry::builtin();
        let error = registry
            .register(MatcherTag::Eq, |_, _| Ok(primitives::constant(Value::Nil)))
            .unwrap_err();
        assert!(matches!(error, MatchgenError::InvalidRegistration { .. }));

        // The built-in rule still answers
        let mut rng = create_seeded_rng(1);
        let generator = registry.generator_for(&eq(5)).unwrap();
        assert_eq!(
            generator.generate(&mut rng, &GeneratorConfig::default()).unwrap(),
            Value::Int(5)
        );
    }

    #[test]
    fn test_empty_custom_name_is_rejected() {
        let mut registry = TranslationRegistry::new();
        let error = registry
            .register(MatcherTag::Custom(" ".to_string()), |_, _| {
                Ok(primitives::constant(Value::Nil))
            })
            .unwrap_err();
        assert!(error.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_custom_rule_dispatch() {
        let mut registry = TranslationRegistry::builtin();
        let matcher = custom(Arc::new(Even));

        let error = registry.generator_for(&matcher).unwrap_err();
        assert!(error.is_unsupported());

        registry
            .register(MatcherTag::Custom("even".to_string()), |_, registry| {
                Ok(registry
                    .type_generator(ValueType::Integer, &be_a_kind_of(ValueType::Integer))?
                    .map(|value| Value::Int(value.as_int().unwrap_or(0) * 2))
                    .boxed())
            })
            .unwrap();

        let generator = registry.generator_for(&matcher).unwrap();
        let mut rng = create_seeded_rng(4);
        for _ in 0..20 {
            let value = generator.generate(&mut rng, &GeneratorConfig::default()).unwrap();
            assert!(matcher.matches(&value));
        }
    }

    #[test]
    fn test_empty_registry_reports_missing_rule() {
        let registry = TranslationRegistry::new();
        let error = registry.generator_for(&be_nil()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Unsupported predicate `be nil`: no translation rule registered for BeNil"
        );
    }

    #[test]
    fn test_expected_generator_builds_structures() {
        let registry = TranslationRegistry::builtin();
        let expected = Expected::map(vec![(
            Value::symbol("pair"),
            Expected::array(vec![Expected::from(1), Expected::from(be_nil())]),
        )]);
        let generator = registry.expected_generator(&expected).unwrap();
        let mut rng = create_seeded_rng(2);
        let value = generator.generate(&mut rng, &GeneratorConfig::default()).unwrap();
        assert_eq!(
            value,
            Value::map(vec![(
                Value::symbol("pair"),
                Value::array(vec![Value::Int(1), Value::Nil])
            )])
        );
    }
}
