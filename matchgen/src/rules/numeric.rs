//! Rules for comparison, range and tolerance matchers.

use std::cmp::Ordering;
use std::ops::Bound;

use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Signed};

use super::wrong_shape;
use crate::error::{MatchgenError, Result};
use crate::generator::Generator;
use crate::matcher::{CompareOp, Matcher, MatcherKind};
use crate::primitives::{self, ValueGenerator};
use crate::registry::TranslationRegistry;
use crate::value::Value;

pub(crate) fn compare(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Compare { op, expected } = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    let expected = expected.clone();
    let (low, high) = match op {
        CompareOp::Lt => (Bound::Unbounded, Bound::Excluded(expected)),
        CompareOp::Le => (Bound::Unbounded, Bound::Included(expected)),
        CompareOp::Gt => (Bound::Excluded(expected), Bound::Unbounded),
        CompareOp::Ge => (Bound::Included(expected), Bound::Unbounded),
        CompareOp::EqTo => (Bound::Included(expected.clone()), Bound::Included(expected)),
    };
    interval(matcher, registry, low, high)
}

pub(crate) fn between(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::BeBetween { min, max, inclusive } = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    let (low, high) = if *inclusive {
        (Bound::Included(min.clone()), Bound::Included(max.clone()))
    } else {
        (Bound::Excluded(min.clone()), Bound::Excluded(max.clone()))
    };
    interval(matcher, registry, low, high)
}

/// Uniform draw in `[expected - tolerance, expected + tolerance]`. Integer
/// arguments with an absolute delta keep the draw integral; a percentage of an
/// integer becomes a rational interval.
pub(crate) fn within(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::BeWithin {
        delta,
        expected,
        percent,
    } = matcher.kind()
    else {
        return Err(wrong_shape(matcher));
    };
    let overflow = || MatchgenError::unsupported(matcher.to_string(), "tolerance overflows i64");

    let (low, high) = match (delta, expected) {
        (Value::Int(delta), Value::Int(expected)) if !*percent => (
            Value::Int(i64::checked_sub(*expected, *delta).ok_or_else(overflow)?),
            Value::Int(i64::checked_add(*expected, *delta).ok_or_else(overflow)?),
        ),
        _ => match (rational_of(delta), rational_of(expected)) {
            (Some(delta), Some(expected)) => {
                let tolerance = if *percent {
                    delta
                        .checked_mul(&expected.abs())
                        .and_then(|scaled| scaled.checked_div(&Rational64::from_integer(100)))
                        .ok_or_else(overflow)?
                } else {
                    delta
                };
                (
                    Value::Rational(expected.checked_sub(&tolerance).ok_or_else(overflow)?),
                    Value::Rational(expected.checked_add(&tolerance).ok_or_else(overflow)?),
                )
            }
            _ => {
                let (Some(delta), Some(expected)) = (delta.to_f64(), expected.to_f64()) else {
                    return Err(MatchgenError::unsupported(
                        matcher.to_string(),
                        "tolerance and expected value must be numeric",
                    ));
                };
                let tolerance = if *percent {
                    delta * expected.abs() / 100.0
                } else {
                    delta
                };
                (
                    Value::Float(expected - tolerance),
                    Value::Float(expected + tolerance),
                )
            }
        },
    };
    interval(matcher, registry, Bound::Included(low), Bound::Included(high))
}

/// A constant interval spanning the smallest to the largest expected value
pub(crate) fn cover(matcher: &Matcher, _registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Cover(values) = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    let incomparable =
        || MatchgenError::unsupported(matcher.to_string(), "values have no common ordering");

    let mut iter = values.iter();
    let Some(first) = iter.next() else {
        return Err(MatchgenError::unsupported(
            matcher.to_string(),
            "nothing to cover",
        ));
    };
    let (mut min, mut max) = (first, first);
    for value in iter {
        if value.partial_compare(min).ok_or_else(incomparable)? == Ordering::Less {
            min = value;
        }
        if value.partial_compare(max).ok_or_else(incomparable)? == Ordering::Greater {
            max = value;
        }
    }
    Ok(primitives::constant(Value::interval(min.clone(), max.clone())))
}

fn rational_of(value: &Value) -> Option<Rational64> {
    match value {
        Value::Int(n) => Some(Rational64::from_integer(*n)),
        Value::Rational(r) => Some(*r),
        _ => None,
    }
}

fn convert<T>(bound: &Bound<Value>, cast: impl Fn(&Value) -> Option<T>) -> Option<Bound<T>> {
    Some(match bound {
        Bound::Included(value) => Bound::Included(cast(value)?),
        Bound::Excluded(value) => Bound::Excluded(cast(value)?),
        Bound::Unbounded => Bound::Unbounded,
    })
}

fn owned_str(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn present(bound: &Bound<Value>) -> Option<&Value> {
    match bound {
        Bound::Included(value) | Bound::Excluded(value) => Some(value),
        Bound::Unbounded => None,
    }
}

/// Generator for the values between two bounds.
///
/// Integers stay integers, rationals mixed with integers stay exact, anything
/// involving a float becomes a float interval. String bounds are built around
/// directly. Other bounds fall back to the canonical generator of their type
/// and rely on the driver's filter, which can exhaust when few canonical values
/// land inside the interval.
fn interval(
    matcher: &Matcher,
    registry: &TranslationRegistry,
    low: Bound<Value>,
    high: Bound<Value>,
) -> Result<ValueGenerator> {
    let empty = || MatchgenError::unsupported(matcher.to_string(), "the interval contains no values");

    if let (Some(low), Some(high)) = (convert(&low, Value::as_int), convert(&high, Value::as_int)) {
        return Ok(primitives::choose_int(low, high).ok_or_else(empty)?.boxed());
    }
    if let (Some(low), Some(high)) = (convert(&low, rational_of), convert(&high, rational_of)) {
        return Ok(primitives::choose_rational(low, high).ok_or_else(empty)?.boxed());
    }
    if let (Some(low), Some(high)) = (convert(&low, Value::to_f64), convert(&high, Value::to_f64)) {
        return Ok(primitives::choose_float(low, high).ok_or_else(empty)?.boxed());
    }
    if let (Some(low), Some(high)) = (convert(&low, owned_str), convert(&high, owned_str)) {
        return Ok(primitives::choose_string(low, high).ok_or_else(empty)?.boxed());
    }

    let mut types = present(&low).into_iter().chain(present(&high)).map(Value::value_type);
    let Some(value_type) = types.next() else {
        return Err(empty());
    };
    if types.any(|other| other != value_type) {
        return Err(MatchgenError::unsupported(
            matcher.to_string(),
            "bounds have different types",
        ));
    }
    registry.type_generator(value_type, matcher)
}
