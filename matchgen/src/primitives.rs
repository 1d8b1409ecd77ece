//! Generators for primitive values and basic collections.
//!
//! Everything here produces [`Value`]s. Numeric interval generators take
//! [`Bound`]s so open, closed and unbounded ends are expressed directly; an
//! unbounded end extends past the known end by the configured span.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use num_rational::{Ratio, Rational64};
use num_traits::{CheckedAdd, CheckedMul, CheckedSub};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::GeneratorConfig;
use crate::error::{MatchgenError, Result};
use crate::generator::{BoxedGenerator, ConstantGenerator, FrequencyGenerator, Generator, OneOfGenerator};
use crate::value::Value;

/// A type-erased generator of dynamic values
pub type ValueGenerator = BoxedGenerator<Value>;

/// The next representable float above `x`
pub(crate) fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// The next representable float below `x`
pub(crate) fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

// ============================================================================
// Numeric intervals
// ============================================================================

/// Uniform integers within an interval
#[derive(Debug, Clone, PartialEq)]
pub struct IntRangeGenerator {
    low: Option<i64>,
    high: Option<i64>,
}

impl IntRangeGenerator {
    /// Create an integer interval generator, or `None` when the interval is empty
    pub fn new(low: Bound<i64>, high: Bound<i64>) -> Option<Self> {
        let low = match low {
            Bound::Included(n) => Some(n),
            Bound::Excluded(n) => Some(n.checked_add(1)?),
            Bound::Unbounded => None,
        };
        let high = match high {
            Bound::Included(n) => Some(n),
            Bound::Excluded(n) => Some(n.checked_sub(1)?),
            Bound::Unbounded => None,
        };
        if let (Some(low), Some(high)) = (low, high) {
            if low > high {
                return None;
            }
        }
        Some(Self { low, high })
    }

    fn resolve(&self, config: &GeneratorConfig) -> (i64, i64) {
        let span = config.integer_span;
        match (self.low, self.high) {
            (Some(low), Some(high)) => (low, high),
            (Some(low), None) => (low, low.saturating_add(span)),
            (None, Some(high)) => (high.saturating_sub(span), high),
            (None, None) => (-span, span),
        }
    }
}

impl Generator<Value> for IntRangeGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        let (low, high) = self.resolve(config);
        Ok(Value::Int(rng.gen_range(low..=high)))
    }
}

/// Uniform floats within an interval
#[derive(Debug, Clone, PartialEq)]
pub struct FloatRangeGenerator {
    low: Option<f64>,
    high: Option<f64>,
}

impl FloatRangeGenerator {
    /// Create a float interval generator, or `None` when the interval is empty or
    /// a bound is not finite
    pub fn new(low: Bound<f64>, high: Bound<f64>) -> Option<Self> {
        let low = match low {
            Bound::Included(x) => Some(x),
            Bound::Excluded(x) => Some(next_up(x)),
            Bound::Unbounded => None,
        };
        let high = match high {
            Bound::Included(x) => Some(x),
            Bound::Excluded(x) => Some(next_down(x)),
            Bound::Unbounded => None,
        };
        if low.is_some_and(|x| !x.is_finite()) || high.is_some_and(|x| !x.is_finite()) {
            return None;
        }
        if let (Some(low), Some(high)) = (low, high) {
            if low > high {
                return None;
            }
        }
        Some(Self { low, high })
    }

    fn resolve(&self, config: &GeneratorConfig) -> (f64, f64) {
        let span = config.float_span;
        match (self.low, self.high) {
            (Some(low), Some(high)) => (low, high),
            (Some(low), None) => (low, (low + span).min(f64::MAX)),
            (None, Some(high)) => ((high - span).max(f64::MIN), high),
            (None, None) => (-span, span),
        }
    }
}

impl Generator<Value> for FloatRangeGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        let (low, high) = self.resolve(config);
        if low == high {
            return Ok(Value::Float(low));
        }
        let x = if (high - low).is_finite() {
            rng.gen_range(low..=high)
        } else {
            // Width overflows; interpolate without computing it
            let t: f64 = rng.r#gen();
            (low * (1.0 - t) + high * t).clamp(low, high)
        };
        Ok(Value::Float(x))
    }
}

/// Uniformly spaced rationals within an interval
#[derive(Debug, Clone, PartialEq)]
pub struct RationalRangeGenerator {
    low: Bound<Rational64>,
    high: Bound<Rational64>,
}

// Offsets are computed at twice the width so no representable interval overflows
type WideRational = Ratio<i128>;

fn widen(r: Rational64) -> WideRational {
    Ratio::new_raw(i128::from(*r.numer()), i128::from(*r.denom()))
}

fn narrow(r: WideRational) -> Option<Rational64> {
    let r = r.reduced();
    Some(Rational64::new_raw(
        i64::try_from(*r.numer()).ok()?,
        i64::try_from(*r.denom()).ok()?,
    ))
}

impl RationalRangeGenerator {
    /// Create a rational interval generator, or `None` when the interval holds
    /// no representable rational
    pub fn new(low: Bound<Rational64>, high: Bound<Rational64>) -> Option<Self> {
        // An unbounded end stops at the largest representable magnitude
        let (a, low_closed) = match low {
            Bound::Included(r) => (r, true),
            Bound::Excluded(r) => (r, false),
            Bound::Unbounded => (Rational64::from_integer(i64::MIN), true),
        };
        let (b, high_closed) = match high {
            Bound::Included(r) => (r, true),
            Bound::Excluded(r) => (r, false),
            Bound::Unbounded => (Rational64::from_integer(i64::MAX), true),
        };
        if a > b || (a == b && !(low_closed && high_closed)) {
            return None;
        }
        Some(Self { low, high })
    }

    fn resolve(&self, config: &GeneratorConfig) -> (Rational64, Rational64) {
        let span = Rational64::from_integer(config.integer_span);
        let max = Rational64::from_integer(i64::MAX);
        let min = Rational64::from_integer(i64::MIN);
        match (bound_value(&self.low), bound_value(&self.high)) {
            (Some(low), Some(high)) => (low, high),
            (Some(low), None) => (low, low.checked_add(&span).unwrap_or(max)),
            (None, Some(high)) => (high.checked_sub(&span).unwrap_or(min), high),
            (None, None) => (-span, span),
        }
    }

    fn unrepresentable(&self) -> MatchgenError {
        let show = |bound: &Bound<Rational64>, open: &str| match bound {
            Bound::Included(r) | Bound::Excluded(r) => r.to_string(),
            Bound::Unbounded => open.to_string(),
        };
        MatchgenError::unsupported(
            format!("rational interval {} .. {}", show(&self.low, "-inf"), show(&self.high, "inf")),
            "no sampled point fits in i64",
        )
    }
}

fn bound_value(bound: &Bound<Rational64>) -> Option<Rational64> {
    match bound {
        Bound::Included(r) | Bound::Excluded(r) => Some(*r),
        Bound::Unbounded => None,
    }
}

impl Generator<Value> for RationalRangeGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        let (low, high) = self.resolve(config);
        if low == high {
            return Ok(Value::Rational(low));
        }

        // Pick one of `steps + 1` evenly spaced points, skipping excluded ends
        let steps = i64::try_from(config.size_hint.max(2)).unwrap_or(i64::MAX);
        let first = if matches!(self.low, Bound::Excluded(_)) { 1 } else { 0 };
        let last = if matches!(self.high, Bound::Excluded(_)) { steps - 1 } else { steps };

        let start = widen(low);
        let width = widen(high).checked_sub(&start);
        let point = |k: i64| -> Option<Rational64> {
            let fraction = Ratio::new(i128::from(k), i128::from(steps));
            let offset = width.as_ref()?.checked_mul(&fraction)?;
            narrow(start.checked_add(&offset)?)
        };

        // Near the i64 limits some points have no i64 form; fall back to the
        // first one that does
        let k = rng.gen_range(first..=last);
        let value = point(k)
            .or_else(|| (first..=last).find_map(&point))
            .ok_or_else(|| self.unrepresentable())?;
        Ok(Value::Rational(value))
    }
}

/// Integers uniformly drawn from an interval
pub fn choose_int(low: Bound<i64>, high: Bound<i64>) -> Option<IntRangeGenerator> {
    IntRangeGenerator::new(low, high)
}

/// Floats uniformly drawn from an interval
pub fn choose_float(low: Bound<f64>, high: Bound<f64>) -> Option<FloatRangeGenerator> {
    FloatRangeGenerator::new(low, high)
}

/// Rationals uniformly drawn from evenly spaced points of an interval
pub fn choose_rational(low: Bound<Rational64>, high: Bound<Rational64>) -> Option<RationalRangeGenerator> {
    RationalRangeGenerator::new(low, high)
}

/// Printable strings drawn from an interval
pub fn choose_string(low: Bound<String>, high: Bound<String>) -> Option<StringRangeGenerator> {
    StringRangeGenerator::new(low, high)
}

// ============================================================================
// Collections
// ============================================================================

/// How many elements a collection generator draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountSpec {
    /// Between zero and the configured size hint
    #[default]
    Sized,
    /// Exactly this many
    Exact(usize),
    /// Between the two counts, inclusive
    Between(usize, usize),
}

impl CountSpec {
    fn draw(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> usize {
        match *self {
            CountSpec::Sized => rng.gen_range(0..=config.size_hint),
            CountSpec::Exact(count) => count,
            CountSpec::Between(min, max) if min >= max => min,
            CountSpec::Between(min, max) => rng.gen_range(min..=max),
        }
    }
}

/// Generator for arrays whose elements share one generator
#[derive(Debug, Clone)]
pub struct ArrayGenerator {
    element_generator: ValueGenerator,
    count: CountSpec,
}

impl ArrayGenerator {
    /// Create a new array generator
    pub fn new(element_generator: ValueGenerator, count: CountSpec) -> Self {
        Self {
            element_generator,
            count,
        }
    }
}

impl Generator<Value> for ArrayGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        let length = self.count.draw(rng, config);
        let items = (0..length)
            .map(|_| self.element_generator.generate(rng, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::array(items))
    }
}

/// Generator for fixed-arity arrays, one generator per slot
#[derive(Debug, Clone)]
pub struct TupleGenerator {
    slots: Vec<ValueGenerator>,
}

impl TupleGenerator {
    /// Create a new tuple generator
    pub fn new(slots: Vec<ValueGenerator>) -> Self {
        Self { slots }
    }
}

impl Generator<Value> for TupleGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        let items = self
            .slots
            .iter()
            .map(|slot| slot.generate(rng, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::array(items))
    }
}

/// Generator for sets; duplicate draws collapse so sets may come out smaller
#[derive(Debug, Clone)]
pub struct SetGenerator {
    element_generator: ValueGenerator,
}

impl SetGenerator {
    /// Create a new set generator
    pub fn new(element_generator: ValueGenerator) -> Self {
        Self { element_generator }
    }
}

impl Generator<Value> for SetGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        let target_size = CountSpec::Sized.draw(rng, config);
        let mut items = BTreeSet::new();
        let mut attempts = 0;

        while items.len() < target_size && attempts < target_size * 10 {
            items.insert(self.element_generator.generate(rng, config)?);
            attempts += 1;
        }

        Ok(Value::Set(items.into()))
    }
}

/// Generator for maps with random keys and values
#[derive(Debug, Clone)]
pub struct MapGenerator {
    key_generator: ValueGenerator,
    value_generator: ValueGenerator,
}

impl MapGenerator {
    /// Create a new map generator
    pub fn new(key_generator: ValueGenerator, value_generator: ValueGenerator) -> Self {
        Self {
            key_generator,
            value_generator,
        }
    }
}

impl Generator<Value> for MapGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        let target_size = CountSpec::Sized.draw(rng, config);
        let mut entries = BTreeMap::new();
        let mut attempts = 0;

        while entries.len() < target_size && attempts < target_size * 10 {
            let key = self.key_generator.generate(rng, config)?;
            let value = self.value_generator.generate(rng, config)?;
            entries.insert(key, value);
            attempts += 1;
        }

        Ok(Value::Map(entries.into()))
    }
}

/// Generator for maps with a fixed key set, one value generator per key
#[derive(Debug, Clone)]
pub struct HashGenerator {
    entries: Vec<(Value, ValueGenerator)>,
}

impl HashGenerator {
    /// Create a new fixed-key map generator
    pub fn new(entries: Vec<(Value, ValueGenerator)>) -> Self {
        Self { entries }
    }
}

impl Generator<Value> for HashGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        let mut entries = BTreeMap::new();
        for (key, generator) in &self.entries {
            entries.insert(key.clone(), generator.generate(rng, config)?);
        }
        Ok(Value::Map(entries.into()))
    }
}

// ============================================================================
// Text
// ============================================================================

/// Generator for strings over a fixed alphabet
#[derive(Debug, Clone)]
pub struct StringGenerator {
    alphabet: &'static [u8],
    leading: &'static [u8],
    min_length: usize,
}

const PRINTABLE: &[u8] =
    b" !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";
const IDENTIFIER: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789_";
const IDENTIFIER_START: &[u8] = b"abcdefghijklmnopqrstuvwxyz_";

impl StringGenerator {
    /// Printable ASCII strings
    pub fn ascii_printable() -> Self {
        Self {
            alphabet: PRINTABLE,
            leading: PRINTABLE,
            min_length: 0,
        }
    }

    /// Lowercase identifier-like strings, never empty
    pub fn identifier() -> Self {
        Self {
            alphabet: IDENTIFIER,
            leading: IDENTIFIER_START,
            min_length: 1,
        }
    }

    fn draw(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> String {
        let max_length = config.size_hint.max(self.min_length);
        let length = rng.gen_range(self.min_length..=max_length);
        let mut text = String::with_capacity(length);
        for position in 0..length {
            let alphabet = if position == 0 {
                self.leading
            } else {
                self.alphabet
            };
            text.push(alphabet[rng.gen_range(0..alphabet.len())] as char);
        }
        text
    }
}

impl Generator<String> for StringGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<String> {
        Ok(self.draw(rng, config))
    }
}

/// Printable strings between two bounds in byte order.
///
/// A lower bound is extended with a printable suffix, which keeps the draw at or
/// above it. With only an upper bound the draw is a proper prefix of it,
/// optionally followed by a smaller character and a suffix. A draw landing past
/// the upper bound of a two-sided interval falls back to an included lower bound.
#[derive(Debug, Clone, PartialEq)]
pub struct StringRangeGenerator {
    low: Bound<String>,
    high: Bound<String>,
}

impl StringRangeGenerator {
    /// Create a string interval generator, or `None` when the interval is empty
    pub fn new(low: Bound<String>, high: Bound<String>) -> Option<Self> {
        if matches!(&high, Bound::Excluded(text) if text.is_empty()) {
            return None;
        }
        if let (Some(a), Some(b)) = (text_bound(&low), text_bound(&high)) {
            let closed = matches!(low, Bound::Included(_)) && matches!(high, Bound::Included(_));
            if a > b || (a == b && !closed) {
                return None;
            }
        }
        Some(Self { low, high })
    }

    fn below_high(&self, text: &str) -> bool {
        match &self.high {
            Bound::Included(high) => text <= high.as_str(),
            Bound::Excluded(high) => text < high.as_str(),
            Bound::Unbounded => true,
        }
    }
}

fn text_bound(bound: &Bound<String>) -> Option<&str> {
    match bound {
        Bound::Included(text) | Bound::Excluded(text) => Some(text.as_str()),
        Bound::Unbounded => None,
    }
}

// A printable string strictly below a non-empty `high`
fn printable_below(high: &str, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> String {
    let chars: Vec<char> = high.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    let cut = rng.gen_range(0..chars.len());
    let mut text: String = chars[..cut].iter().collect();
    let limit = u32::from(chars[cut]).min(0x7f);
    if limit > 0x20 && rng.r#gen::<bool>() {
        if let Some(smaller) = char::from_u32(rng.gen_range(0x20..limit)) {
            text.push(smaller);
            text.push_str(&StringGenerator::ascii_printable().draw(rng, config));
        }
    }
    text
}

impl Generator<Value> for StringRangeGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> Result<Value> {
        let suffix = StringGenerator {
            min_length: usize::from(matches!(self.low, Bound::Excluded(_))),
            ..StringGenerator::ascii_printable()
        };
        let text = match (&self.low, &self.high) {
            (Bound::Included(low) | Bound::Excluded(low), _) => {
                let candidate = format!("{}{}", low, suffix.draw(rng, config));
                match &self.low {
                    Bound::Included(low) if !self.below_high(&candidate) => low.clone(),
                    _ => candidate,
                }
            }
            (Bound::Unbounded, Bound::Included(high) | Bound::Excluded(high)) => {
                printable_below(high, rng, config)
            }
            (Bound::Unbounded, Bound::Unbounded) => suffix.draw(rng, config),
        };
        Ok(Value::str(text))
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Always the given value, shared rather than copied
pub fn constant(value: Value) -> ValueGenerator {
    ConstantGenerator::new(value).boxed()
}

/// Uniform two-way choice
pub fn one_of(first: ValueGenerator, second: ValueGenerator) -> ValueGenerator {
    OneOfGenerator::new(vec![first, second]).boxed()
}

/// Weighted choice between generators
pub fn frequency(choices: Vec<(u32, ValueGenerator)>) -> ValueGenerator {
    FrequencyGenerator::new(choices).boxed()
}

/// Fixed-arity array, one generator per slot
pub fn tuple(slots: Vec<ValueGenerator>) -> ValueGenerator {
    TupleGenerator::new(slots).boxed()
}

/// Variable-length array of draws from one generator
pub fn array_of(element_generator: ValueGenerator, count: CountSpec) -> ValueGenerator {
    ArrayGenerator::new(element_generator, count).boxed()
}

/// Fixed-key map, one generator per key
pub fn hash(entries: Vec<(Value, ValueGenerator)>) -> ValueGenerator {
    HashGenerator::new(entries).boxed()
}

/// A random permutation of an array value
pub fn shuffle(value: Value) -> ValueGenerator {
    BoxedGenerator::from_fn(move |rng, _config| match &value {
        Value::Array(items) => {
            let mut items = items.as_ref().clone();
            items.shuffle(rng);
            Ok(Value::array(items))
        }
        other => Err(MatchgenError::unsupported(
            format!("shuffle {}", other.inspect()),
            format!("cannot permute a {}", other.value_type()),
        )),
    })
}

/// Booleans
pub fn boolean() -> ValueGenerator {
    BoxedGenerator::from_fn(|rng, _config| Ok(Value::Bool(rng.r#gen())))
}

/// Integers within the configured magnitude
pub fn integer() -> ValueGenerator {
    BoxedGenerator::from_fn(|rng, config| {
        let magnitude = config.magnitude();
        Ok(Value::Int(rng.gen_range(-magnitude..=magnitude)))
    })
}

/// Floats within the configured magnitude
pub fn float() -> ValueGenerator {
    BoxedGenerator::from_fn(|rng, config| {
        let magnitude = config.magnitude() as f64;
        Ok(Value::Float(rng.gen_range(-magnitude..=magnitude)))
    })
}

/// Rationals with numerator and denominator within the configured magnitude
pub fn rational() -> ValueGenerator {
    BoxedGenerator::from_fn(|rng, config| {
        let magnitude = config.magnitude().max(1);
        let numer = rng.gen_range(-magnitude..=magnitude);
        let denom = rng.gen_range(1..=magnitude);
        Ok(Value::Rational(Rational64::new(numer, denom)))
    })
}

/// Printable ASCII strings
pub fn string() -> ValueGenerator {
    StringGenerator::ascii_printable().map(|text| Value::str(text)).boxed()
}

/// Identifier-like symbols
pub fn symbol() -> ValueGenerator {
    StringGenerator::identifier().map(|name| Value::symbol(name)).boxed()
}

/// Scalars of any simple type
pub fn simple_type() -> ValueGenerator {
    frequency(vec![
        (3, integer()),
        (2, float()),
        (1, rational()),
        (1, boolean()),
        (2, string()),
        (1, symbol()),
    ])
}

/// Scalars whose printed form is meaningful: no rationals and no nil
pub fn simple_printable() -> ValueGenerator {
    frequency(vec![
        (3, integer()),
        (2, float()),
        (1, boolean()),
        (3, string()),
        (1, symbol()),
    ])
}

/// Arrays of simple scalars
pub fn array() -> ValueGenerator {
    array_of(simple_type(), CountSpec::Sized)
}

/// Sets of simple scalars
pub fn set() -> ValueGenerator {
    SetGenerator::new(simple_type()).boxed()
}

/// Maps from simple scalars to simple scalars
pub fn map() -> ValueGenerator {
    MapGenerator::new(simple_type(), simple_type()).boxed()
}
