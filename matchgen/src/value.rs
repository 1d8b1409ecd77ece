//! Dynamically typed values produced by generators and inspected by matchers.
//!
//! Heap-shaped variants are reference counted. Cloning a [`Value`] shares the
//! underlying allocation, so two clones are [`Value::same`]; [`Value::duplicate`]
//! allocates a fresh top-level container that is equal but not the same.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use num_rational::Rational64;
use num_traits::ToPrimitive;
use regex::Regex;

use crate::action::Action;

/// The runtime type of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Nil,
    Boolean,
    Integer,
    Float,
    Rational,
    /// Abstract supertype of integers, floats and rationals
    Numeric,
    String,
    Symbol,
    Array,
    Set,
    Map,
    Interval,
    Pattern,
    Object,
    Action,
}

impl ValueType {
    /// Human readable type name
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Nil => "Nil",
            ValueType::Boolean => "Boolean",
            ValueType::Integer => "Integer",
            ValueType::Float => "Float",
            ValueType::Rational => "Rational",
            ValueType::Numeric => "Numeric",
            ValueType::String => "String",
            ValueType::Symbol => "Symbol",
            ValueType::Array => "Array",
            ValueType::Set => "Set",
            ValueType::Map => "Map",
            ValueType::Interval => "Interval",
            ValueType::Pattern => "Pattern",
            ValueType::Object => "Object",
            ValueType::Action => "Action",
        }
    }

    /// Abstract types never describe a value directly
    pub fn is_abstract(&self) -> bool {
        matches!(self, ValueType::Numeric)
    }

    /// Whether a value of type `concrete` is a kind of this type
    pub fn includes(&self, concrete: ValueType) -> bool {
        *self == concrete
            || (*self == ValueType::Numeric
                && matches!(
                    concrete,
                    ValueType::Integer | ValueType::Float | ValueType::Rational
                ))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque object that answers a fixed set of attribute reads
#[derive(Debug, Clone, Default)]
pub struct Object {
    attributes: BTreeMap<String, Value>,
}

impl Object {
    /// Create an object answering each attribute name with its value
    pub fn new<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Whether the object answers `name`
    pub fn responds_to(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Read an attribute
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// All attribute names, sorted
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

/// An inclusive interval between two values
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval {
    pub start: Value,
    pub end: Value,
}

impl Interval {
    /// Whether `value` lies between `start` and `end`, both inclusive
    pub fn contains(&self, value: &Value) -> bool {
        matches!(
            self.start.partial_compare(value),
            Some(Ordering::Less | Ordering::Equal)
        ) && matches!(
            value.partial_compare(&self.end),
            Some(Ordering::Less | Ordering::Equal)
        )
    }
}

/// A dynamically typed value
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Rational(Rational64),
    Str(Arc<String>),
    Symbol(Arc<str>),
    Array(Arc<Vec<Value>>),
    Set(Arc<BTreeSet<Value>>),
    Map(Arc<BTreeMap<Value, Value>>),
    Interval(Arc<Interval>),
    Pattern(Arc<Regex>),
    Object(Arc<Object>),
    Action(Arc<Action>),
}

impl Value {
    /// Create a string value
    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(Arc::new(value.into()))
    }

    /// Create a symbol value
    pub fn symbol(name: impl AsRef<str>) -> Self {
        Value::Symbol(Arc::from(name.as_ref()))
    }

    /// Create an array value
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Arc::new(items.into_iter().collect()))
    }

    /// Create a set value
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(Arc::new(items.into_iter().collect()))
    }

    /// Create a map value
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(Arc::new(entries.into_iter().collect()))
    }

    /// Create a rational value, returning `None` for a zero denominator
    pub fn rational(numer: i64, denom: i64) -> Option<Self> {
        (denom != 0).then(|| Value::Rational(Rational64::new(numer, denom)))
    }

    /// Create an inclusive interval value
    pub fn interval(start: Value, end: Value) -> Self {
        Value::Interval(Arc::new(Interval { start, end }))
    }

    /// Create a compiled pattern value
    pub fn pattern(pattern: Regex) -> Self {
        Value::Pattern(Arc::new(pattern))
    }

    /// Create an opaque attribute object
    pub fn object(object: Object) -> Self {
        Value::Object(Arc::new(object))
    }

    /// Create a deferred action value
    pub fn action(action: Action) -> Self {
        Value::Action(Arc::new(action))
    }

    /// The runtime type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Bool(_) => ValueType::Boolean,
            Value::Int(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Rational(_) => ValueType::Rational,
            Value::Str(_) => ValueType::String,
            Value::Symbol(_) => ValueType::Symbol,
            Value::Array(_) => ValueType::Array,
            Value::Set(_) => ValueType::Set,
            Value::Map(_) => ValueType::Map,
            Value::Interval(_) => ValueType::Interval,
            Value::Pattern(_) => ValueType::Pattern,
            Value::Object(_) => ValueType::Object,
            Value::Action(_) => ValueType::Action,
        }
    }

    /// Integers, floats and rationals
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Rational(_))
    }

    /// `nil` and `false` are the only falsy values
    pub fn is_falsy(&self) -> bool {
        matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_truthy(&self) -> bool {
        !self.is_falsy()
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value widened to `f64`
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::Rational(r) => r.to_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Map(entries) => Some(entries.as_ref()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Value::Action(action) => Some(action.as_ref()),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Regex> {
        match self {
            Value::Pattern(pattern) => Some(pattern.as_ref()),
            _ => None,
        }
    }

    /// Identity comparison.
    ///
    /// Heap values are the same only when they share an allocation. Immediates
    /// (nil, booleans, numbers, symbols) are the same whenever they are equal.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Interval(a), Value::Interval(b)) => Arc::ptr_eq(a, b),
            (Value::Pattern(a), Value::Pattern(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Action(a), Value::Action(b)) => Arc::ptr_eq(a, b),
            _ => self == other,
        }
    }

    /// Shallow copy: a fresh top-level allocation whose elements are shared.
    /// Immediates are returned unchanged.
    pub fn duplicate(&self) -> Value {
        match self {
            Value::Str(s) => Value::Str(Arc::new(s.as_ref().clone())),
            Value::Array(items) => Value::Array(Arc::new(items.as_ref().clone())),
            Value::Set(items) => Value::Set(Arc::new(items.as_ref().clone())),
            Value::Map(entries) => Value::Map(Arc::new(entries.as_ref().clone())),
            Value::Interval(interval) => Value::Interval(Arc::new(interval.as_ref().clone())),
            Value::Pattern(pattern) => Value::Pattern(Arc::new(pattern.as_ref().clone())),
            Value::Object(object) => Value::Object(Arc::new(object.as_ref().clone())),
            Value::Action(action) => Value::Action(Arc::new(action.as_ref().clone())),
            immediate => immediate.clone(),
        }
    }

    /// Compare two numbers across the integer/rational/float tower
    pub fn numeric_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Rational(b)) => Some(Rational64::from_integer(*a).cmp(b)),
            (Value::Rational(a), Value::Int(b)) => Some(a.cmp(&Rational64::from_integer(*b))),
            (Value::Rational(a), Value::Rational(b)) => Some(a.cmp(b)),
            _ => self.to_f64()?.partial_cmp(&other.to_f64()?),
        }
    }

    /// Ordering for values that are meaningfully comparable: numbers with numbers,
    /// strings with strings, symbols with symbols
    pub fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Symbol(a), Value::Symbol(b)) => Some(a.cmp(b)),
            _ => self.numeric_cmp(other),
        }
    }

    /// Loose equality: numbers compare across types, arrays and map values
    /// compare element-wise with the same rule
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => {
                a.numeric_cmp(b) == Some(Ordering::Equal)
            }
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.get(key).is_some_and(|other| value.loose_eq(other)))
            }
            _ => self == other,
        }
    }

    /// Concatenate two strings or two arrays
    pub fn concat(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(Value::str(format!("{}{}", a, b))),
            (Value::Array(a), Value::Array(b)) => {
                Some(Value::array(a.iter().chain(b.iter()).cloned()))
            }
            _ => None,
        }
    }

    /// Debug-style rendering used in matcher descriptions
    pub fn inspect(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Str(s) => format!("{:?}", s.as_str()),
            Value::Symbol(s) => format!(":{}", s),
            Value::Rational(r) => format!("({})", r),
            Value::Array(items) => format!("[{}]", join_inspected(items.iter())),
            Value::Set(items) => format!("#<Set: {{{}}}>", join_inspected(items.iter())),
            Value::Map(entries) => {
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{} => {}", key.inspect(), value.inspect()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Value::Interval(interval) => {
                format!("{}..{}", interval.start.inspect(), interval.end.inspect())
            }
            Value::Pattern(pattern) => format!("/{}/", pattern.as_str()),
            Value::Object(object) => {
                let rendered: Vec<String> = object
                    .attributes
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value.inspect()))
                    .collect();
                format!("#<Object {}>", rendered.join(" "))
            }
            Value::Action(action) => format!("#<Action {}>", action.describe()),
            other => other.to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Rational(_) => 4,
            Value::Str(_) => 5,
            Value::Symbol(_) => 6,
            Value::Array(_) => 7,
            Value::Set(_) => 8,
            Value::Map(_) => 9,
            Value::Interval(_) => 10,
            Value::Pattern(_) => 11,
            Value::Object(_) => 12,
            Value::Action(_) => 13,
        }
    }
}

fn join_inspected<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values.map(Value::inspect).collect::<Vec<_>>().join(", ")
}

fn address<T: ?Sized>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc) as *const () as usize
}

// Structural, type-strict ordering. Objects and actions have no structure to
// compare and order by allocation.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Rational(a), Value::Rational(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Symbol(a), Value::Symbol(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            (Value::Interval(a), Value::Interval(b)) => a.cmp(b),
            (Value::Pattern(a), Value::Pattern(b)) => a.as_str().cmp(b.as_str()),
            (Value::Object(a), Value::Object(b)) => address(a).cmp(&address(b)),
            (Value::Action(a), Value::Action(b)) => address(a).cmp(&address(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Rational(r) => write!(f, "{}", r),
            Value::Str(s) => f.write_str(s),
            Value::Symbol(s) => f.write_str(s),
            other => f.write_str(&other.inspect()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Rational64> for Value {
    fn from(value: Rational64) -> Self {
        Value::Rational(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::str(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(Arc::new(value))
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::object(value)
    }
}

impl From<Action> for Value {
    fn from(value: Action) -> Self {
        Value::action(value)
    }
}
