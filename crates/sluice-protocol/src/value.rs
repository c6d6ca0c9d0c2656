use std::{collections::BTreeMap, fmt};

/// AMQP symbolic value: an ASCII string drawn from a controlled vocabulary
/// (capability names, property keys, error conditions).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from anything string-like.
    pub fn new(value: impl Into<String>) -> Self {
        Symbol(value.into())
    }

    /// Returns the symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol(value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values a properties map may carry.
///
/// Only the scalar subset links exchange in practice is modelled; the codec
/// collaborator maps anything richer onto `Binary`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Unsigned integer
    Ulong(u64),
    /// Signed integer
    Long(i64),
    /// Floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Symbol
    Symbol(Symbol),
    /// Opaque bytes
    Binary(Vec<u8>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self { Value::Bool(v) }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self { Value::Ulong(v) }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Long(v) }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::String(v.to_owned()) }
}

impl From<Symbol> for Value {
    fn from(v: Symbol) -> Self { Value::Symbol(v) }
}

/// Symbol-keyed map (AMQP 1.0, 2.8.13). Ordered so iteration is deterministic.
pub type Fields = BTreeMap<Symbol, Value>;
