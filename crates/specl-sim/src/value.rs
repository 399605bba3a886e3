//! Runtime values of state variables.

use std::fmt;
use std::sync::Arc;

/// Value of one state variable.
///
/// Composite values share their payload through `Arc`, so cloning a value
/// (and therefore a state) never copies the element tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    /// Undetermined. A state holding this in any variable is incomplete.
    None,
    Bool(bool),
    Int(i64),
    String(Arc<str>),
    /// Sorted, deduplicated elements.
    Set(Arc<Vec<Value>>),
    Seq(Arc<Vec<Value>>),
}

impl Value {
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    /// Build a set value; elements are sorted and deduplicated.
    pub fn set(mut elems: Vec<Value>) -> Self {
        elems.sort();
        elems.dedup();
        Value::Set(Arc::new(elems))
    }

    pub fn seq(elems: Vec<Value>) -> Self {
        Value::Seq(Arc::new(elems))
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// True unless this value, or any element nested in it, is `None`.
    pub fn is_determined(&self) -> bool {
        match self {
            Value::None => false,
            Value::Set(v) | Value::Seq(v) => v.iter().all(Value::is_determined),
            _ => true,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

fn write_elems(f: &mut fmt::Formatter<'_>, elems: &[Value]) -> fmt::Result {
    for (i, v) in elems.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", v)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "?"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Set(elems) => {
                write!(f, "{{")?;
                write_elems(f, elems)?;
                write!(f, "}}")
            }
            Value::Seq(elems) => {
                write!(f, "<<")?;
                write_elems(f, elems)?;
                write!(f, ">>")
            }
        }
    }
}
