//! Core generator trait and the combinator algebra built on top of it.

use std::marker::PhantomData;
use std::sync::Arc;

use rand::Rng;

use crate::config::GeneratorConfig;
use crate::error::{MatchgenError, Result};

/// Core generator trait for creating random values.
///
/// Generators are descriptions: composing them builds a new generator and never
/// mutates an existing one. Drawing can fail, for instance when a filtered
/// generator runs out of retries.
pub trait Generator<T> {
    /// Draw a value using the provided RNG and configuration
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<T>;

    /// Transform every drawn value
    fn map<F, U>(self, mapper: F) -> Map<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> U,
    {
        Map {
            generator: self,
            mapper,
            _phantom: PhantomData,
        }
    }

    /// Transform every drawn value with a mapper that may fail
    fn try_map<F, U>(self, mapper: F) -> TryMap<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> Result<U>,
    {
        TryMap {
            generator: self,
            mapper,
            _phantom: PhantomData,
        }
    }

    /// Use each drawn value to pick the generator for the final value
    fn flat_map<F, H>(self, binder: F) -> FlatMap<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> H,
    {
        FlatMap {
            generator: self,
            binder,
            _phantom: PhantomData,
        }
    }

    /// Redraw until `predicate` accepts, giving up after `max_tries` draws
    fn such_that<F>(self, predicate: F, max_tries: usize) -> SuchThat<Self, F>
    where
        Self: Sized,
        F: Fn(&T) -> bool,
    {
        SuchThat {
            generator: self,
            predicate,
            max_tries,
            description: "such_that".to_string(),
        }
    }

    /// Erase the concrete generator type
    fn boxed(self) -> BoxedGenerator<T>
    where
        Self: Sized + Send + Sync + 'static,
    {
        BoxedGenerator::new(self)
    }
}

/// A cheaply clonable, type-erased generator
pub struct BoxedGenerator<T> {
    inner: Arc<dyn Generator<T> + Send + Sync>,
}

impl<T> BoxedGenerator<T> {
    /// Create a new boxed generator
    pub fn new<G: Generator<T> + Send + Sync + 'static>(generator: G) -> Self {
        Self {
            inner: Arc::new(generator),
        }
    }

    /// Build a generator from a drawing function
    pub fn from_fn<F>(draw: F) -> Self
    where
        F: Fn(&mut dyn rand::RngCore, &GeneratorConfig) -> Result<T> + Send + Sync + 'static,
        T: 'static,
    {
        Self::new(FnGenerator {
            draw,
            _phantom: PhantomData,
        })
    }
}

impl<T> Clone for BoxedGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for BoxedGenerator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedGenerator").finish_non_exhaustive()
    }
}

impl<T> Generator<T> for BoxedGenerator<T> {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<T> {
        self.inner.generate(rng, config)
    }
}

struct FnGenerator<F, T> {
    draw: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<F, T> Generator<T> for FnGenerator<F, T>
where
    F: Fn(&mut dyn rand::RngCore, &GeneratorConfig) -> Result<T>,
{
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<T> {
        (self.draw)(rng, config)
    }
}

/// A generator that always produces the same value
#[derive(Debug, Clone)]
pub struct ConstantGenerator<T> {
    value: T,
}

impl<T: Clone> ConstantGenerator<T> {
    /// Create a new constant generator
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone> Generator<T> for ConstantGenerator<T> {
    fn generate(&self, _rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> Result<T> {
        Ok(self.value.clone())
    }
}

/// A generator that picks one of several generators uniformly per draw
#[derive(Debug, Clone)]
pub struct OneOfGenerator<T> {
    choices: Vec<BoxedGenerator<T>>,
}

impl<T> OneOfGenerator<T> {
    /// Create a new one-of generator
    ///
    /// # Panics
    ///
    /// Panics if `choices` is empty.
    pub fn new(choices: Vec<BoxedGenerator<T>>) -> Self {
        if choices.is_empty() {
            panic!("OneOfGenerator cannot be created with empty choices");
        }
        Self { choices }
    }
}

impl<T> Generator<T> for OneOfGenerator<T> {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<T> {
        let index = rng.gen_range(0..self.choices.len());
        self.choices[index].generate(rng, config)
    }
}

/// A generator that picks one of several generators in proportion to its weight
#[derive(Debug, Clone)]
pub struct FrequencyGenerator<T> {
    choices: Vec<(u32, BoxedGenerator<T>)>,
    total: u64,
}

impl<T> FrequencyGenerator<T> {
    /// Create a new weighted generator
    ///
    /// # Panics
    ///
    /// Panics if the weights sum to zero.
    pub fn new(choices: Vec<(u32, BoxedGenerator<T>)>) -> Self {
        let total = choices.iter().map(|(weight, _)| u64::from(*weight)).sum();
        if total == 0 {
            panic!("FrequencyGenerator needs at least one positive weight");
        }
        Self { choices, total }
    }
}

impl<T> Generator<T> for FrequencyGenerator<T> {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<T> {
        let mut pick = rng.gen_range(0..self.total);
        for (weight, generator) in &self.choices {
            let weight = u64::from(*weight);
            if pick < weight {
                return generator.generate(rng, config);
            }
            pick -= weight;
        }
        unreachable!("pick is always below the total weight")
    }
}

/// A generator that maps values from one type to another
pub struct Map<G, F, T> {
    generator: G,
    mapper: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<G, F, T, U> Generator<U> for Map<G, F, T>
where
    G: Generator<T>,
    F: Fn(T) -> U,
{
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<U> {
        let value = self.generator.generate(rng, config)?;
        Ok((self.mapper)(value))
    }
}

/// A generator that maps values with a fallible mapper
pub struct TryMap<G, F, T> {
    generator: G,
    mapper: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<G, F, T, U> Generator<U> for TryMap<G, F, T>
where
    G: Generator<T>,
    F: Fn(T) -> Result<U>,
{
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<U> {
        let value = self.generator.generate(rng, config)?;
        (self.mapper)(value)
    }
}

/// A generator whose second stage depends on the value of the first
pub struct FlatMap<G, F, T> {
    generator: G,
    binder: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<G, F, H, T, U> Generator<U> for FlatMap<G, F, T>
where
    G: Generator<T>,
    F: Fn(T) -> H,
    H: Generator<U>,
{
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<U> {
        let seed_value = self.generator.generate(rng, config)?;
        (self.binder)(seed_value).generate(rng, config)
    }
}

/// A generator that redraws until a predicate accepts the value
pub struct SuchThat<G, F> {
    generator: G,
    predicate: F,
    max_tries: usize,
    description: String,
}

impl<G, F> SuchThat<G, F> {
    /// Name reported when the retry budget runs out
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<G, F, T> Generator<T> for SuchThat<G, F>
where
    G: Generator<T>,
    F: Fn(&T) -> bool,
{
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<T> {
        for _ in 0..self.max_tries {
            let value = self.generator.generate(rng, config)?;
            if (self.predicate)(&value) {
                return Ok(value);
            }
        }
        Err(MatchgenError::exhausted(
            self.description.clone(),
            self.max_tries,
        ))
    }
}
