//! Per-matcher generator overrides.
//!
//! A generator attached to a matcher takes priority over the matcher's
//! translation rule. The attachment travels with the matcher value and its
//! clones and is never cleared implicitly.

use tracing::debug;

use crate::error::Result;
use crate::matcher::Matcher;
use crate::primitives::ValueGenerator;
use crate::registry::TranslationRegistry;

impl Matcher {
    /// A copy of this matcher that generates from `generator`.
    ///
    /// `self` is left untouched. Attaching again replaces the previous override
    /// on the returned copy only.
    pub fn with_generator(&self, generator: ValueGenerator) -> Matcher {
        Matcher {
            kind: self.kind.clone(),
            generator: Some(generator),
        }
    }

    /// The generator attached to this matcher, if any
    pub fn attached_generator(&self) -> Option<&ValueGenerator> {
        self.generator.as_ref()
    }

    /// Whether a generator is attached
    pub fn has_override(&self) -> bool {
        self.generator.is_some()
    }
}

impl TranslationRegistry {
    /// Generator for a matcher: its attached generator if present, otherwise
    /// the one built by its shape's rule.
    ///
    /// Overrides apply only to the matcher that carries them. Children are
    /// resolved through this same lookup, so their own overrides are honoured.
    pub fn resolve(&self, matcher: &Matcher) -> Result<ValueGenerator> {
        if let Some(generator) = matcher.attached_generator() {
            debug!(matcher = %matcher, "resolved attached generator");
            return Ok(generator.clone());
        }
        let generator = self.generator_for(matcher)?;
        debug!(matcher = %matcher, tag = %matcher.tag(), "resolved translation rule");
        Ok(generator)
    }
}

#[cfg(test)]
mod tests {
    use crate::generator::BoxedGenerator;
    use crate::matcher::*;
    use crate::primitives::{self, ValueGenerator};
    use crate::registry::TranslationRegistry;
    use crate::rules::sample;
    use crate::value::Value;
    use rand::Rng;

    fn negative_integers() -> ValueGenerator {
        BoxedGenerator::from_fn(|rng, _config| Ok(Value::Int(rng.gen_range(-100..0))))
    }

    #[test]
    fn test_attach_leaves_original_untouched() {
        let original = be_lt(0);
        let overridden = original.with_generator(negative_integers());

        assert!(!original.has_override());
        assert!(overridden.has_override());
        assert!(overridden.clone().has_override());
    }

    #[test]
    fn test_override_takes_priority() {
        let registry = TranslationRegistry::builtin();
        let matcher = eq(1).with_generator(primitives::constant(Value::Int(2)));

        let generator = registry.resolve(&matcher).unwrap();
        assert_eq!(sample(&generator, 3, 1), vec![Value::Int(2); 3]);

        // The rule ignores overrides
        let generator = registry.generator_for(&matcher).unwrap();
        assert_eq!(sample(&generator, 3, 1), vec![Value::Int(1); 3]);
    }

    #[test]
    fn test_child_overrides_are_honoured() {
        let registry = TranslationRegistry::builtin();
        let matcher = all(be_lt(0).with_generator(negative_integers()));

        let generator = registry.resolve(&matcher).unwrap();
        for value in sample(&generator, 20, 5) {
            for item in value.as_array().unwrap() {
                let n = item.as_int().unwrap();
                assert!((-100..0).contains(&n));
            }
        }
    }

    #[test]
    fn test_parent_override_does_not_reach_children() {
        let registry = TranslationRegistry::builtin();
        let child = eq(7);
        let parent = all(child.clone()).with_generator(primitives::constant(Value::array(vec![])));

        assert!(!child.has_override());
        assert!(registry.resolve(&parent).is_ok());
        assert_eq!(
            sample(&registry.resolve(&child).unwrap(), 2, 1),
            vec![Value::Int(7); 2]
        );
    }

    #[test]
    fn test_override_makes_satisfy_generable() {
        let registry = TranslationRegistry::builtin();
        let odd = satisfy("be odd", |value| value.as_int().is_some_and(|n| n % 2 != 0));
        assert!(registry.resolve(&odd).is_err());

        let odd = odd.with_generator(primitives::constant(Value::Int(3)));
        assert!(registry.resolve(&odd).is_ok());
    }

    #[test]
    fn test_builders_keep_override() {
        let matcher = be_between(1, 10)
            .with_generator(primitives::constant(Value::Int(5)))
            .exclusive();
        assert!(matcher.has_override());
    }
}
