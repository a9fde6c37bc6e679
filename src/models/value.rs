use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell of a weather record.
///
/// Raw CSV cells are typed per cell: integer first, then finite float,
/// otherwise text. Integers and floats compare by exact numeric value so that
/// `20` and `20.0` are the same reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Scalar", into = "Scalar")]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    /// A numeric cell whose source text is not the canonical rendering of its
    /// number (`007`, `1.50`, `1e3`). Compares as the number and is written
    /// back exactly as read. `number` is always `Integer` or `Float`.
    Spelled { number: Box<Value>, raw: String },
    Text(String),
}

/// Shared null for lookups past the end of a row.
pub static NULL: Value = Value::Null;

// i64::MIN as f64 is exact; 2^63 is the first float above i64::MAX.
const I64_FLOAT_MIN: f64 = -9_223_372_036_854_775_808.0;
const I64_FLOAT_END: f64 = 9_223_372_036_854_775_808.0;

impl Value {
    /// Parse a raw cell. `null_markers` lists the spellings treated as missing.
    pub fn parse(raw: &str, null_markers: &[String]) -> Self {
        let trimmed = raw.trim();
        if null_markers.iter().any(|marker| marker == trimmed) {
            return Value::Null;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::spelled(Value::Integer(i), raw);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::spelled(Value::Float(f), raw),
            _ => Value::Text(raw.to_string()),
        }
    }

    fn spelled(number: Value, raw: &str) -> Self {
        if number.to_string() == raw {
            number
        } else {
            Value::Spelled {
                number: Box::new(number),
                raw: raw.to_string(),
            }
        }
    }

    /// The value with any source spelling stripped.
    pub fn canonical(&self) -> &Value {
        match self {
            Value::Spelled { number, .. } => number.as_ref(),
            other => other,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.canonical() {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.canonical() {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            _ => "text",
        }
    }

    /// Render the value as a CSV cell. Null becomes the empty string.
    pub fn to_cell(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// The integer a float is exactly equal to, if any.
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && (I64_FLOAT_MIN..I64_FLOAT_END).contains(&f)).then(|| f as i64)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self.canonical(), other.canonical()) {
            (Value::Null, Value::Null) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(i), Value::Float(f)) | (Value::Float(f), Value::Integer(i)) => {
                integral(*f) == Some(*i)
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.canonical() {
            Value::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            Value::Integer(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            // Integral floats hash as the integer they equal; this also folds -0.0 into 0.
            Value::Float(f) => match integral(*f) {
                Some(i) => {
                    2u8.hash(state);
                    i.hash(state);
                }
                None => {
                    3u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            _ => 0u8.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Spelled { raw, .. } => write!(f, "{}", raw),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Plain serde shape of a [`Value`]; spellings are not serialized.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Integer(i) => Value::Integer(i),
            Scalar::Float(f) => Value::Float(f),
            Scalar::Text(s) => Value::Text(s),
        }
    }
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Scalar::Null,
            Value::Integer(i) => Scalar::Integer(i),
            Value::Float(f) => Scalar::Float(f),
            Value::Spelled { number, .. } => Scalar::from(*number),
            Value::Text(s) => Scalar::Text(s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
