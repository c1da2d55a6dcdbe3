//! Runtime values for check evaluation.
//!
//! Producers resolve to a dynamic [`Value`] so heterogeneous data can flow
//! through one check pipeline. Composite variants are `Arc`-shared, so
//! cloning a value never deep-copies a list or map.
//!
//! Two equality modes exist:
//! - *loose*: structural, with cross-comparison inside the numeric family
//!   and numeric-string coercion (`Int(1)` loosely equals `Str("1")`).
//!   `NaN` never loosely equals itself.
//! - *strict*: same kind required, no coercion. `NaN` strictly equals
//!   itself (identity semantics).

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Native function value: a plain function pointer so values stay `Clone`
/// and comparable by identity.
pub type NativeFn = fn(&[Value]) -> Value;

/// Dynamic runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Absent value (distinct from null).
    Undefined,
    /// Boolean.
    Bool(bool),
    /// Machine integer.
    Int(i64),
    /// Wide integer, kept as its own kind for the `is_bigint` predicate.
    BigInt(i128),
    /// Floating-point number.
    Float(f64),
    /// String.
    Str(Arc<str>),
    /// Interned-style symbol: compared by name, never coerced.
    Symbol(Arc<str>),
    /// Ordered list of values.
    List(Arc<Vec<Value>>),
    /// String-keyed map with deterministic iteration order.
    Map(Arc<BTreeMap<String, Value>>),
    /// Function value, compared by pointer identity.
    Func(NativeFn),
}

/// Runtime kind of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Null,
    Undefined,
    Bool,
    Int,
    BigInt,
    Float,
    Str,
    Symbol,
    List,
    Map,
    Func,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Undefined => "undefined",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::BigInt => "bigint",
            Kind::Float => "float",
            Kind::Str => "string",
            Kind::Symbol => "symbol",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Func => "function",
        };
        f.write_str(name)
    }
}

// Factory methods

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Arc::from(s.into()))
    }

    /// Create a symbol value.
    #[inline]
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(Arc::from(name.into()))
    }

    /// Create a list value.
    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    /// Create a map value.
    #[inline]
    pub fn map(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(Arc::new(entries))
    }

    /// Build a map value from key/value pairs.
    pub fn map_of<K: Into<String>, V: Into<Value>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Value::Map(Arc::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Runtime kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Undefined => Kind::Undefined,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::BigInt(_) => Kind::BigInt,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Symbol(_) => Kind::Symbol,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Func(_) => Kind::Func,
        }
    }

    /// Whether this value belongs to the numeric family (`Int`, `BigInt`,
    /// `Float`).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_) | Value::Float(_))
    }

    /// Numeric view of this value, if it has one.
    #[expect(clippy::cast_precision_loss, reason = "coercing comparison is approximate by contract")]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::BigInt(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Falsy per the check contract: `null`, `undefined`, `false`, numeric
    /// zero, `NaN`, and the empty string. Everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Undefined | Value::Bool(false) => false,
            Value::Int(n) => *n != 0,
            Value::BigInt(n) => *n != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(true)
            | Value::Symbol(_)
            | Value::List(_)
            | Value::Map(_)
            | Value::Func(_) => true,
        }
    }

    /// Empty per the check contract: `""`, `[]`, and `{}` only. Values
    /// without a notion of emptiness are not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }

    /// Element count for strings (chars), lists, and maps.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Loose equality: structural, with numeric-family cross-comparison and
    /// numeric-string coercion.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (a, b) if a.is_numeric() && b.is_numeric() => num_eq(a, b),
            (Value::Str(s), b) if b.is_numeric() => str_num_eq(s, b),
            (a, Value::Str(s)) if a.is_numeric() => str_num_eq(s, a),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.loose_eq(y)))
            }
            (Value::Map(a), Value::Map(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter()
                            .all(|(k, v)| b.get(k).is_some_and(|w| v.loose_eq(w))))
            }
            (Value::Func(a), Value::Func(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }

    /// Strict equality: same kind, no coercion. Composites compare
    /// structurally with strict elements. `NaN` strictly equals itself.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.strict_eq(y)))
            }
            (Value::Map(a), Value::Map(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter()
                            .all(|(k, v)| b.get(k).is_some_and(|w| v.strict_eq(w))))
            }
            (Value::Func(a), Value::Func(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }

    /// Ordering for the comparison checks. Numbers compare across the
    /// numeric family; strings compare lexicographically. Other kind pairs
    /// have no ordering.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::BigInt(b)) => Some(i128::from(*a).cmp(b)),
            (Value::BigInt(a), Value::Int(b)) => Some(a.cmp(&i128::from(*b))),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
            (Value::Str(a), Value::Str(b)) => Some(a.as_ref().cmp(b.as_ref())),
            _ => None,
        }
    }
}

/// Numeric-family equality without going through `f64` when both sides are
/// integral.
fn num_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::Int(x), Value::BigInt(y)) | (Value::BigInt(y), Value::Int(x)) => {
            i128::from(*x) == *y
        }
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Numeric-string coercion: the string must parse as a number equal to the
/// numeric side. `NaN` text never matches.
fn str_num_eq(s: &str, num: &Value) -> bool {
    let Ok(parsed) = s.trim().parse::<f64>() else {
        return false;
    };
    num.as_f64().is_some_and(|n| n == parsed)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::BigInt(n) => write!(f, "{n}n"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, "symbol({s})"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Func(_) => f.write_str("[function]"),
        }
    }
}

// Conversions

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Undefined
    }
}

impl From<NativeFn> for Value {
    fn from(f: NativeFn) -> Self {
        Value::Func(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::list(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(entries: BTreeMap<String, V>) -> Self {
        Value::map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => {
                Value::list(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
