//! Predicate model.
//!
//! A [`Matcher`] describes a condition on a [`Value`]. The same matcher answers
//! [`Matcher::matches`] and, through the translation registry, yields a generator
//! of values it accepts.
//!
//! # Examples
//!
//! ```rust
//! use matchgen::matcher::*;
//! use matchgen::Value;
//!
//! let positive_or_nil = be_gt(0).or(be_nil());
//! assert!(positive_or_nil.matches(&Value::Int(3)));
//! assert!(positive_or_nil.matches(&Value::Nil));
//! assert!(!positive_or_nil.matches(&Value::Int(-3)));
//! ```

pub mod constructors;
pub mod describe;
pub mod matching;

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::action::OutputStream;
use crate::primitives::ValueGenerator;
use crate::value::{Value, ValueType};

pub use constructors::*;

/// Comparison operator used by [`MatcherKind::Compare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    EqTo,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::EqTo => "==",
        }
    }
}

/// What a `match` matcher compares against
#[derive(Debug, Clone)]
pub enum MatchTarget {
    /// Pattern source given as a plain string
    Str(String),
    /// Already compiled pattern
    Pattern(Regex),
    /// Nested matcher
    Matcher(Matcher),
}

/// Expected message of a raised error
#[derive(Debug, Clone)]
pub enum MessageExpectation {
    Exact(String),
    Pattern(Regex),
}

/// Method signature constraints of a `respond_to` matcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RespondToSpec {
    pub names: Vec<String>,
    pub arity: Option<usize>,
    pub keywords: Vec<String>,
    pub unlimited_arguments: bool,
    pub any_keywords: bool,
}

impl RespondToSpec {
    /// Whether any signature constraint beyond the names was given
    pub fn is_constrained(&self) -> bool {
        self.arity.is_some() || !self.keywords.is_empty() || self.unlimited_arguments || self.any_keywords
    }
}

/// Literal data that may embed matchers at any depth
#[derive(Debug, Clone)]
pub enum Expected {
    Value(Value),
    Matcher(Matcher),
    Array(Vec<Expected>),
    Map(Vec<(Value, Expected)>),
}

impl Expected {
    /// An array whose elements may be literals or matchers
    pub fn array<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expected>,
    {
        Expected::Array(items.into_iter().map(Into::into).collect())
    }

    /// A map whose values may be literals or matchers
    pub fn map<I, K, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, E)>,
        K: Into<Value>,
        E: Into<Expected>,
    {
        Expected::Map(
            entries
                .into_iter()
                .map(|(key, expected)| (key.into(), expected.into()))
                .collect(),
        )
    }
}

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        Expected::Value(value)
    }
}

impl From<Matcher> for Expected {
    fn from(matcher: Matcher) -> Self {
        Expected::Matcher(matcher)
    }
}

macro_rules! expected_from_literal {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Expected {
                fn from(value: $ty) -> Self {
                    Expected::Value(Value::from(value))
                }
            }
        )*
    };
}

expected_from_literal!(bool, i32, i64, f64, &str, String);

/// A predicate whose body is supplied by the caller and is purely assertional
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn call(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A predicate shape defined outside this crate.
///
/// Custom matchers are dispatched by [`CustomMatcher::name`]; a translation rule
/// registered under that name turns them into generators.
pub trait CustomMatcher: fmt::Debug + Send + Sync {
    /// Name used to look up the translation rule
    fn name(&self) -> &str;

    /// Whether `actual` satisfies the predicate
    fn matches(&self, actual: &Value) -> bool;

    /// Human readable description
    fn description(&self) -> String {
        self.name().to_string()
    }
}

/// The shape and data of a predicate
#[derive(Debug, Clone)]
pub enum MatcherKind {
    Eq(Value),
    Eql(Value),
    Equal(Value),
    Compare {
        op: CompareOp,
        expected: Value,
    },
    BeBetween {
        min: Value,
        max: Value,
        inclusive: bool,
    },
    KindOf(ValueType),
    InstanceOf(ValueType),
    Or(Matcher, Matcher),
    And(Matcher, Matcher),
    Include(Vec<Expected>),
    All(Matcher),
    ContainExactly(Vec<Expected>),
    StartWith(Value),
    EndWith(Value),
    HaveAttributes(Vec<(String, Expected)>),
    Match(MatchTarget),
    RespondTo(RespondToSpec),
    Output {
        stream: OutputStream,
        expected: Option<Expected>,
    },
    RaiseError {
        kind: Option<String>,
        message: Option<MessageExpectation>,
    },
    ThrowSymbol {
        signal: Option<String>,
        payload: Option<Expected>,
    },
    BeFalsey,
    BeTruthy,
    BeNil,
    BeWithin {
        delta: Value,
        expected: Value,
        percent: bool,
    },
    Cover(Vec<Value>),
    Satisfy {
        description: String,
        predicate: Predicate,
    },
    Aliased {
        name: String,
        base: Matcher,
    },
    Custom(Arc<dyn CustomMatcher>),
}

/// Dispatch key of a predicate shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatcherTag {
    Eq,
    Eql,
    Equal,
    Compare,
    BeBetween,
    KindOf,
    InstanceOf,
    Or,
    And,
    Include,
    All,
    ContainExactly,
    StartWith,
    EndWith,
    HaveAttributes,
    Match,
    RespondTo,
    Output,
    RaiseError,
    ThrowSymbol,
    BeFalsey,
    BeTruthy,
    BeNil,
    BeWithin,
    Cover,
    Satisfy,
    Aliased,
    Custom(String),
}

impl fmt::Display for MatcherTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatcherTag::Custom(name) => write!(f, "custom matcher `{}`", name),
            other => write!(f, "{:?}", other),
        }
    }
}

impl MatcherKind {
    /// Dispatch key for this shape
    pub fn tag(&self) -> MatcherTag {
        match self {
            MatcherKind::Eq(_) => MatcherTag::Eq,
            MatcherKind::Eql(_) => MatcherTag::Eql,
            MatcherKind::Equal(_) => MatcherTag::Equal,
            MatcherKind::Compare { .. } => MatcherTag::Compare,
            MatcherKind::BeBetween { .. } => MatcherTag::BeBetween,
            MatcherKind::KindOf(_) => MatcherTag::KindOf,
            MatcherKind::InstanceOf(_) => MatcherTag::InstanceOf,
            MatcherKind::Or(..) => MatcherTag::Or,
            MatcherKind::And(..) => MatcherTag::And,
            MatcherKind::Include(_) => MatcherTag::Include,
            MatcherKind::All(_) => MatcherTag::All,
            MatcherKind::ContainExactly(_) => MatcherTag::ContainExactly,
            MatcherKind::StartWith(_) => MatcherTag::StartWith,
            MatcherKind::EndWith(_) => MatcherTag::EndWith,
            MatcherKind::HaveAttributes(_) => MatcherTag::HaveAttributes,
            MatcherKind::Match(_) => MatcherTag::Match,
            MatcherKind::RespondTo(_) => MatcherTag::RespondTo,
            MatcherKind::Output { .. } => MatcherTag::Output,
            MatcherKind::RaiseError { .. } => MatcherTag::RaiseError,
            MatcherKind::ThrowSymbol { .. } => MatcherTag::ThrowSymbol,
            MatcherKind::BeFalsey => MatcherTag::BeFalsey,
            MatcherKind::BeTruthy => MatcherTag::BeTruthy,
            MatcherKind::BeNil => MatcherTag::BeNil,
            MatcherKind::BeWithin { .. } => MatcherTag::BeWithin,
            MatcherKind::Cover(_) => MatcherTag::Cover,
            MatcherKind::Satisfy { .. } => MatcherTag::Satisfy,
            MatcherKind::Aliased { .. } => MatcherTag::Aliased,
            MatcherKind::Custom(custom) => MatcherTag::Custom(custom.name().to_string()),
        }
    }
}

/// An immutable predicate, optionally carrying an attached generator.
///
/// Cloning is cheap: the shape is shared. Builder methods such as
/// [`Matcher::exclusive`] return a new matcher and leave clones untouched.
#[derive(Debug, Clone)]
pub struct Matcher {
    pub(crate) kind: Arc<MatcherKind>,
    pub(crate) generator: Option<ValueGenerator>,
}

impl Matcher {
    /// Create a matcher of the given shape
    pub fn new(kind: MatcherKind) -> Self {
        Self {
            kind: Arc::new(kind),
            generator: None,
        }
    }

    /// The shape and data of this matcher
    pub fn kind(&self) -> &MatcherKind {
        &self.kind
    }

    /// Dispatch key for this matcher
    pub fn tag(&self) -> MatcherTag {
        self.kind.tag()
    }

    /// Either this matcher or `other`
    pub fn or(self, other: Matcher) -> Matcher {
        Matcher::new(MatcherKind::Or(self, other))
    }

    /// Both this matcher and `other`
    pub fn and(self, other: Matcher) -> Matcher {
        Matcher::new(MatcherKind::And(self, other))
    }

    fn refine(mut self, update: impl FnOnce(&mut MatcherKind)) -> Self {
        update(Arc::make_mut(&mut self.kind));
        self
    }

    /// Exclude both bounds of a `be_between` matcher. Other matchers are returned unchanged.
    pub fn exclusive(self) -> Self {
        self.refine(|kind| {
            if let MatcherKind::BeBetween { inclusive, .. } = kind {
                *inclusive = false;
            }
        })
    }

    /// Include both bounds of a `be_between` matcher. Other matchers are returned unchanged.
    pub fn inclusive(self) -> Self {
        self.refine(|kind| {
            if let MatcherKind::BeBetween { inclusive, .. } = kind {
                *inclusive = true;
            }
        })
    }

    /// Require `respond_to` methods to accept exactly `count` positional arguments
    pub fn with_args(self, count: usize) -> Self {
        self.refine_respond_to(|spec| spec.arity = Some(count))
    }

    /// Require `respond_to` methods to accept the given keywords
    pub fn with_keywords<I, S>(self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        self.refine_respond_to(move |spec| spec.keywords.extend(keywords))
    }

    /// Require `respond_to` methods to accept any number of positional arguments
    pub fn with_unlimited_arguments(self) -> Self {
        self.refine_respond_to(|spec| spec.unlimited_arguments = true)
    }

    /// Require `respond_to` methods to accept arbitrary keywords
    pub fn with_any_keywords(self) -> Self {
        self.refine_respond_to(|spec| spec.any_keywords = true)
    }

    fn refine_respond_to(self, update: impl FnOnce(&mut RespondToSpec)) -> Self {
        self.refine(|kind| {
            if let MatcherKind::RespondTo(spec) = kind {
                update(spec);
            }
        })
    }

    /// Direct an `output` matcher at standard output
    pub fn to_stdout(self) -> Self {
        self.refine_output(OutputStream::Stdout)
    }

    /// Direct an `output` matcher at standard error
    pub fn to_stderr(self) -> Self {
        self.refine_output(OutputStream::Stderr)
    }

    fn refine_output(self, target: OutputStream) -> Self {
        self.refine(|kind| {
            if let MatcherKind::Output { stream, .. } = kind {
                *stream = target;
            }
        })
    }

    /// Expect a `raise_error` matcher's error to be of the named kind
    pub fn of_kind(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.refine(|kind| {
            if let MatcherKind::RaiseError { kind, .. } = kind {
                *kind = Some(name);
            }
        })
    }

    /// Expect a `raise_error` matcher's error to carry exactly this message
    pub fn with_message(self, text: impl Into<String>) -> Self {
        self.refine_message(MessageExpectation::Exact(text.into()))
    }

    /// Expect a `raise_error` matcher's error message to match a pattern
    pub fn with_message_matching(self, pattern: Regex) -> Self {
        self.refine_message(MessageExpectation::Pattern(pattern))
    }

    fn refine_message(self, expectation: MessageExpectation) -> Self {
        self.refine(|kind| {
            if let MatcherKind::RaiseError { message, .. } = kind {
                *message = Some(expectation);
            }
        })
    }

    /// Expect a `throw_symbol` matcher's signal to carry a payload
    pub fn with_payload(self, expected: impl Into<Expected>) -> Self {
        let expected = expected.into();
        self.refine(|kind| {
            if let MatcherKind::ThrowSymbol { payload, .. } = kind {
                *payload = Some(expected);
            }
        })
    }
}

impl From<MatcherKind> for Matcher {
    fn from(kind: MatcherKind) -> Self {
        Matcher::new(kind)
    }
}
