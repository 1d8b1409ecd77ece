//! Free functions building each predicate shape.

use std::sync::Arc;

use regex::Regex;

use super::{
    CompareOp, CustomMatcher, Expected, MatchTarget, Matcher, MatcherKind, Predicate,
    RespondToSpec,
};
use crate::action::OutputStream;
use crate::value::{Value, ValueType};

/// Loose equality: numbers compare across integer, float and rational
pub fn eq(expected: impl Into<Value>) -> Matcher {
    Matcher::new(MatcherKind::Eq(expected.into()))
}

/// Strict equality: same type and same structure
pub fn eql(expected: impl Into<Value>) -> Matcher {
    Matcher::new(MatcherKind::Eql(expected.into()))
}

/// Identity: the very same value
pub fn equal(expected: impl Into<Value>) -> Matcher {
    Matcher::new(MatcherKind::Equal(expected.into()))
}

/// Alias of [`equal`]
pub fn be(expected: impl Into<Value>) -> Matcher {
    equal(expected)
}

fn compare(op: CompareOp, expected: impl Into<Value>) -> Matcher {
    Matcher::new(MatcherKind::Compare {
        op,
        expected: expected.into(),
    })
}

pub fn be_lt(expected: impl Into<Value>) -> Matcher {
    compare(CompareOp::Lt, expected)
}

pub fn be_le(expected: impl Into<Value>) -> Matcher {
    compare(CompareOp::Le, expected)
}

pub fn be_gt(expected: impl Into<Value>) -> Matcher {
    compare(CompareOp::Gt, expected)
}

pub fn be_ge(expected: impl Into<Value>) -> Matcher {
    compare(CompareOp::Ge, expected)
}

/// Equal by comparison, as `be == expected`
pub fn be_eq_to(expected: impl Into<Value>) -> Matcher {
    compare(CompareOp::EqTo, expected)
}

/// Within `min` and `max`, both inclusive unless [`Matcher::exclusive`] is applied
pub fn be_between(min: impl Into<Value>, max: impl Into<Value>) -> Matcher {
    Matcher::new(MatcherKind::BeBetween {
        min: min.into(),
        max: max.into(),
        inclusive: true,
    })
}

/// Value of type `value_type` or one of its subtypes
pub fn be_a_kind_of(value_type: ValueType) -> Matcher {
    Matcher::new(MatcherKind::KindOf(value_type))
}

/// Value of exactly `value_type`
pub fn be_an_instance_of(value_type: ValueType) -> Matcher {
    Matcher::new(MatcherKind::InstanceOf(value_type))
}

/// Collection or string containing every expected item
pub fn include<I, E>(items: I) -> Matcher
where
    I: IntoIterator<Item = E>,
    E: Into<Expected>,
{
    Matcher::new(MatcherKind::Include(
        items.into_iter().map(Into::into).collect(),
    ))
}

/// Collection whose every element satisfies `matcher`
pub fn all(matcher: Matcher) -> Matcher {
    Matcher::new(MatcherKind::All(matcher))
}

/// Collection holding exactly the expected items, in any order
pub fn contain_exactly<I, E>(items: I) -> Matcher
where
    I: IntoIterator<Item = E>,
    E: Into<Expected>,
{
    Matcher::new(MatcherKind::ContainExactly(
        items.into_iter().map(Into::into).collect(),
    ))
}

/// Alias of [`contain_exactly`]
pub fn match_array<I, E>(items: I) -> Matcher
where
    I: IntoIterator<Item = E>,
    E: Into<Expected>,
{
    contain_exactly(items)
}

/// String or array beginning with `prefix`
pub fn start_with(prefix: impl Into<Value>) -> Matcher {
    Matcher::new(MatcherKind::StartWith(prefix.into()))
}

/// String or array ending with `suffix`
pub fn end_with(suffix: impl Into<Value>) -> Matcher {
    Matcher::new(MatcherKind::EndWith(suffix.into()))
}

/// Object answering each attribute with a matching value
pub fn have_attributes<I, K, E>(attributes: I) -> Matcher
where
    I: IntoIterator<Item = (K, E)>,
    K: Into<String>,
    E: Into<Expected>,
{
    Matcher::new(MatcherKind::HaveAttributes(
        attributes
            .into_iter()
            .map(|(name, expected)| (name.into(), expected.into()))
            .collect(),
    ))
}

/// String matching the pattern whose source is `source`
pub fn match_str(source: impl Into<String>) -> Matcher {
    Matcher::new(MatcherKind::Match(MatchTarget::Str(source.into())))
}

/// String matching a compiled pattern
pub fn match_pattern(pattern: Regex) -> Matcher {
    Matcher::new(MatcherKind::Match(MatchTarget::Pattern(pattern)))
}

/// Value matched by a nested matcher
pub fn match_matcher(matcher: Matcher) -> Matcher {
    Matcher::new(MatcherKind::Match(MatchTarget::Matcher(matcher)))
}

/// Object answering every named method
pub fn respond_to<I, S>(names: I) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Matcher::new(MatcherKind::RespondTo(RespondToSpec {
        names: names.into_iter().map(Into::into).collect(),
        ..RespondToSpec::default()
    }))
}

/// Action writing any non-empty output to standard output
pub fn output() -> Matcher {
    Matcher::new(MatcherKind::Output {
        stream: OutputStream::Stdout,
        expected: None,
    })
}

/// Action writing output matching `expected` to standard output
pub fn output_of(expected: impl Into<Expected>) -> Matcher {
    Matcher::new(MatcherKind::Output {
        stream: OutputStream::Stdout,
        expected: Some(expected.into()),
    })
}

/// Action raising an error
pub fn raise_error() -> Matcher {
    Matcher::new(MatcherKind::RaiseError {
        kind: None,
        message: None,
    })
}

/// Action throwing any signal
pub fn throw_symbol() -> Matcher {
    Matcher::new(MatcherKind::ThrowSymbol {
        signal: None,
        payload: None,
    })
}

/// Action throwing the named signal
pub fn throw_symbol_named(signal: impl Into<String>) -> Matcher {
    Matcher::new(MatcherKind::ThrowSymbol {
        signal: Some(signal.into()),
        payload: None,
    })
}

/// `false` or `nil`
pub fn be_falsey() -> Matcher {
    Matcher::new(MatcherKind::BeFalsey)
}

/// Anything but `false` and `nil`
pub fn be_truthy() -> Matcher {
    Matcher::new(MatcherKind::BeTruthy)
}

pub fn be_nil() -> Matcher {
    Matcher::new(MatcherKind::BeNil)
}

/// Start of a tolerance matcher; finish with [`BeWithin::of`] or [`BeWithin::percent_of`]
pub fn be_within(delta: impl Into<Value>) -> BeWithin {
    BeWithin {
        delta: delta.into(),
    }
}

/// A tolerance awaiting its expected value
#[derive(Debug, Clone)]
pub struct BeWithin {
    delta: Value,
}

impl BeWithin {
    /// Within `delta` of `expected`
    pub fn of(self, expected: impl Into<Value>) -> Matcher {
        Matcher::new(MatcherKind::BeWithin {
            delta: self.delta,
            expected: expected.into(),
            percent: false,
        })
    }

    /// Within `delta` percent of `expected`
    pub fn percent_of(self, expected: impl Into<Value>) -> Matcher {
        Matcher::new(MatcherKind::BeWithin {
            delta: self.delta,
            expected: expected.into(),
            percent: true,
        })
    }
}

/// Interval containing every given value
pub fn cover<I, V>(values: I) -> Matcher
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Matcher::new(MatcherKind::Cover(values.into_iter().map(Into::into).collect()))
}

/// Arbitrary caller-supplied predicate. It can be asserted but never generated
/// from unless a generator is attached.
pub fn satisfy<F>(description: impl Into<String>, predicate: F) -> Matcher
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Matcher::new(MatcherKind::Satisfy {
        description: description.into(),
        predicate: Predicate::new(predicate),
    })
}

/// A matcher under another name, used in composed descriptions
pub fn aliased(name: impl Into<String>, base: Matcher) -> Matcher {
    Matcher::new(MatcherKind::Aliased {
        name: name.into(),
        base,
    })
}

pub fn a_kind_of(value_type: ValueType) -> Matcher {
    aliased("a kind of", be_a_kind_of(value_type))
}

pub fn an_instance_of(value_type: ValueType) -> Matcher {
    aliased("an instance of", be_an_instance_of(value_type))
}

pub fn a_value_between(min: impl Into<Value>, max: impl Into<Value>) -> Matcher {
    aliased("a value between", be_between(min, max))
}

pub fn a_value_within(delta: impl Into<Value>, expected: impl Into<Value>) -> Matcher {
    aliased("a value within", be_within(delta).of(expected))
}

pub fn a_string_starting_with(prefix: impl Into<String>) -> Matcher {
    aliased("a string starting with", start_with(prefix.into()))
}

pub fn a_string_ending_with(suffix: impl Into<String>) -> Matcher {
    aliased("a string ending with", end_with(suffix.into()))
}

pub fn a_string_matching(source: impl Into<String>) -> Matcher {
    aliased("a string matching", match_str(source))
}

pub fn a_collection_including<I, E>(items: I) -> Matcher
where
    I: IntoIterator<Item = E>,
    E: Into<Expected>,
{
    aliased("a collection including", include(items))
}

pub fn a_collection_containing_exactly<I, E>(items: I) -> Matcher
where
    I: IntoIterator<Item = E>,
    E: Into<Expected>,
{
    aliased("a collection containing exactly", contain_exactly(items))
}

pub fn an_object_having_attributes<I, K, E>(attributes: I) -> Matcher
where
    I: IntoIterator<Item = (K, E)>,
    K: Into<String>,
    E: Into<Expected>,
{
    aliased("an object having attributes", have_attributes(attributes))
}

pub fn a_value(value: impl Into<Value>) -> Matcher {
    aliased("a value", eq(value))
}

/// A predicate shape defined outside this crate
pub fn custom(matcher: Arc<dyn CustomMatcher>) -> Matcher {
    Matcher::new(MatcherKind::Custom(matcher))
}
