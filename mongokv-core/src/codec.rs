//! Typed encoding of stored values.
//!
//! Each supported scalar type implements [`KvValue`], which knows how to turn a value
//! into the BSON stored in a document's `value` field and how to read it back.
//! Decoding is strict: a value is only decoded when the stored BSON element has exactly
//! the type the codec writes, so an `i64` written by `put` will never come back as text.
//!
//! Supporting a new type means adding one `KvValue` implementation; the upsert and
//! lookup protocol in [`crate::session`] is shared by all of them.

use std::fmt;

use bson::Bson;
use chrono::{DateTime, Utc};

use crate::error::{KvError, KvResult};

/// The document field holding the key.
pub const KEY_FIELD: &str = "key";

/// The document field holding the value.
pub const VALUE_FIELD: &str = "value";

/// The value types supported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int64,
    Text,
    Double,
    Boolean,
    DateTime,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Int64 => "int64",
            ValueKind::Text => "text",
            ValueKind::Double => "double",
            ValueKind::Boolean => "boolean",
            ValueKind::DateTime => "datetime",
        })
    }
}

/// A scalar type that can be stored under a key.
pub trait KvValue: Sized + Send + Sync {
    /// The kind reported in type mismatch errors.
    const KIND: ValueKind;

    /// Encodes the value as the BSON stored in the `value` field.
    fn encode(&self) -> Bson;

    /// Decodes a stored value, returning `None` if the BSON element has another type.
    fn decode(value: &Bson) -> Option<Self>;

    /// Decodes a stored value, reporting a [`KvError::TypeMismatch`] on failure.
    fn decode_field(value: &Bson) -> KvResult<Self> {
        Self::decode(value).ok_or_else(|| KvError::TypeMismatch {
            expected: Self::KIND,
            found: format!("{:?}", value.element_type()),
        })
    }
}

impl KvValue for i64 {
    const KIND: ValueKind = ValueKind::Int64;

    fn encode(&self) -> Bson {
        Bson::Int64(*self)
    }

    fn decode(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int64(v) => Some(*v),
            _ => None,
        }
    }
}

impl KvValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn encode(&self) -> Bson {
        Bson::String(self.clone())
    }

    fn decode(value: &Bson) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl KvValue for f64 {
    const KIND: ValueKind = ValueKind::Double;

    fn encode(&self) -> Bson {
        Bson::Double(*self)
    }

    fn decode(value: &Bson) -> Option<Self> {
        value.as_f64()
    }
}

impl KvValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn encode(&self) -> Bson {
        Bson::Boolean(*self)
    }

    fn decode(value: &Bson) -> Option<Self> {
        value.as_bool()
    }
}

impl KvValue for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::DateTime;

    fn encode(&self) -> Bson {
        Bson::DateTime(bson::DateTime::from_chrono(*self))
    }

    fn decode(value: &Bson) -> Option<Self> {
        value.as_datetime().map(|dt| dt.to_chrono())
    }
}
