// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory value tree handed to the encoder and produced by the decoder.

use std::collections::BTreeMap;
use std::fmt;

/// Named fields of a composite (or of a variant payload).
pub type Record = BTreeMap<String, Value>;

/// A dynamic value.
///
/// Integers of every width share [`Value::Int`]; the target width is chosen by
/// the schema, not by the value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    Int(i128),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Record(Record),
    Variant {
        discriminant: Discriminant,
        payload: Box<Value>,
    },
}

impl Value {
    /// Build a record from `(key, value)` pairs.
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list from anything convertible to values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a tagged variant value.
    pub fn variant(discriminant: impl Into<Discriminant>, payload: Value) -> Self {
        Self::Variant {
            discriminant: discriminant.into(),
            payload: Box::new(payload),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view (integers widen to `f64`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Field of a record (`None` for non-records and absent keys).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_record()?.get(key)
    }

    /// Short shape name used in mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Char(_) => "char",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Record(_) => "record",
            Self::Variant { .. } => "variant",
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i128::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, u8, i16, u16, i32, u32, i64, u64, i128);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

/// Branch selector of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Discriminant {
    Int(i128),
    Str(String),
}

impl Discriminant {
    /// Value written through the variant's index type.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(v) => Value::Int(*v),
            Self::Str(s) => Value::String(s.clone()),
        }
    }

    /// Discriminant read back through an index type.
    ///
    /// Strings and single chars become [`Discriminant::Str`], integers become
    /// [`Discriminant::Int`]; every other shape is rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(Self::Int(*v)),
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Char(c) => Some(Self::Str(c.to_string())),
            _ => None,
        }
    }

    /// Integer this discriminant denotes as a branch key.
    ///
    /// A string in canonical decimal form (`"7"`, `"-3"`, not `"07"` or
    /// `"+7"`) denotes the same branch as the integer.
    pub fn as_branch_int(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Str(s) => s
                .parse::<i128>()
                .ok()
                .filter(|n| n.to_string() == *s),
        }
    }

    /// Form used to key branch tables: canonical decimal strings become
    /// [`Discriminant::Int`].
    pub fn to_branch_key(&self) -> Self {
        match self.as_branch_int() {
            Some(v) => Self::Int(v),
            None => self.clone(),
        }
    }
}

impl fmt::Display for Discriminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Str(s) => write!(f, "{:?}", s),
        }
    }
}

macro_rules! impl_discriminant_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Discriminant {
                fn from(v: $ty) -> Self {
                    Discriminant::Int(i128::from(v))
                }
            }
        )*
    };
}

impl_discriminant_from_int!(i8, u8, i16, u16, i32, u32, i64, u64, i128);

impl From<&str> for Discriminant {
    fn from(v: &str) -> Self {
        Discriminant::Str(v.to_string())
    }
}

impl From<String> for Discriminant {
    fn from(v: String) -> Self {
        Discriminant::Str(v)
    }
}
