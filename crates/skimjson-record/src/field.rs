//! Field value kinds and the traits that connect Rust types to them
//!
//! [`FieldType`] is implemented for every type that may appear as a record
//! field. It carries the kind recorded in the schema, whether the field is
//! pointer-like (`Option`, `Box`), how to find a nested schema, and how to
//! read the field into a [`FieldValue`] at lookup time.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::registry::SchemaRegistry;
use crate::schema::{Record, Schema};

/// Kind of value stored in a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    Isize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    Usize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `char`
    Char,
    /// `String`
    String,
    /// Opaque date/time leaf (`DateTime<Utc>`, `NaiveDateTime`)
    DateTime,
    /// `Vec<T>` or `[T; N]`, read whole
    Sequence,
    /// String-keyed map, read whole
    Map,
    /// Nested record with its own schema
    Record,
}

impl ValueKind {
    /// Whether a path may continue through a field of this kind
    pub fn is_descendable(self) -> bool {
        matches!(self, ValueKind::Record)
    }

    /// Whether the kind is read whole without further layout information
    pub fn is_container(self) -> bool {
        matches!(self, ValueKind::Sequence | ValueKind::Map)
    }
}

/// Value read out of a record field
///
/// Scalars are copied, strings are borrowed from the record, containers are
/// materialized element by element and nested records are borrowed.
#[derive(Clone)]
pub enum FieldValue<'a> {
    /// Absent pointer-like value (`None`)
    Null,
    /// Boolean
    Bool(bool),
    /// 8-bit signed integer
    I8(i8),
    /// 16-bit signed integer
    I16(i16),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// Pointer-sized signed integer
    Isize(isize),
    /// 8-bit unsigned integer
    U8(u8),
    /// 16-bit unsigned integer
    U16(u16),
    /// 32-bit unsigned integer
    U32(u32),
    /// 64-bit unsigned integer
    U64(u64),
    /// Pointer-sized unsigned integer
    Usize(usize),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// Unicode scalar
    Char(char),
    /// Borrowed string
    Str(&'a str),
    /// UTC timestamp
    DateTime(DateTime<Utc>),
    /// Timestamp without zone
    NaiveDateTime(NaiveDateTime),
    /// Materialized sequence
    Sequence(Vec<FieldValue<'a>>),
    /// Materialized map, in the map's iteration order
    Map(Vec<(&'a str, FieldValue<'a>)>),
    /// Borrowed nested record
    Record(&'a dyn Record),
}

impl<'a> FieldValue<'a> {
    /// Kind of this value, `None` for [`FieldValue::Null`]
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            FieldValue::Null => return None,
            FieldValue::Bool(_) => ValueKind::Bool,
            FieldValue::I8(_) => ValueKind::I8,
            FieldValue::I16(_) => ValueKind::I16,
            FieldValue::I32(_) => ValueKind::I32,
            FieldValue::I64(_) => ValueKind::I64,
            FieldValue::Isize(_) => ValueKind::Isize,
            FieldValue::U8(_) => ValueKind::U8,
            FieldValue::U16(_) => ValueKind::U16,
            FieldValue::U32(_) => ValueKind::U32,
            FieldValue::U64(_) => ValueKind::U64,
            FieldValue::Usize(_) => ValueKind::Usize,
            FieldValue::F32(_) => ValueKind::F32,
            FieldValue::F64(_) => ValueKind::F64,
            FieldValue::Char(_) => ValueKind::Char,
            FieldValue::Str(_) => ValueKind::String,
            FieldValue::DateTime(_) | FieldValue::NaiveDateTime(_) => ValueKind::DateTime,
            FieldValue::Sequence(_) => ValueKind::Sequence,
            FieldValue::Map(_) => ValueKind::Map,
            FieldValue::Record(_) => ValueKind::Record,
        })
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Get value as string slice
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Widen any signed integer to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::I8(v) => Some(v.into()),
            FieldValue::I16(v) => Some(v.into()),
            FieldValue::I32(v) => Some(v.into()),
            FieldValue::I64(v) => Some(v),
            FieldValue::Isize(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Widen any unsigned integer to `u64`
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            FieldValue::U8(v) => Some(v.into()),
            FieldValue::U16(v) => Some(v.into()),
            FieldValue::U32(v) => Some(v.into()),
            FieldValue::U64(v) => Some(v),
            FieldValue::Usize(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Get value as `f64` if it is a float
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FieldValue::F32(v) => Some(v.into()),
            FieldValue::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Get value as bool
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            FieldValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow a nested record as its concrete type
    pub fn downcast_record<R: Record>(&self) -> Option<&'a R> {
        match *self {
            FieldValue::Record(record) => record.as_any().downcast_ref::<R>(),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("Null"),
            FieldValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            FieldValue::I8(v) => f.debug_tuple("I8").field(v).finish(),
            FieldValue::I16(v) => f.debug_tuple("I16").field(v).finish(),
            FieldValue::I32(v) => f.debug_tuple("I32").field(v).finish(),
            FieldValue::I64(v) => f.debug_tuple("I64").field(v).finish(),
            FieldValue::Isize(v) => f.debug_tuple("Isize").field(v).finish(),
            FieldValue::U8(v) => f.debug_tuple("U8").field(v).finish(),
            FieldValue::U16(v) => f.debug_tuple("U16").field(v).finish(),
            FieldValue::U32(v) => f.debug_tuple("U32").field(v).finish(),
            FieldValue::U64(v) => f.debug_tuple("U64").field(v).finish(),
            FieldValue::Usize(v) => f.debug_tuple("Usize").field(v).finish(),
            FieldValue::F32(v) => f.debug_tuple("F32").field(v).finish(),
            FieldValue::F64(v) => f.debug_tuple("F64").field(v).finish(),
            FieldValue::Char(v) => f.debug_tuple("Char").field(v).finish(),
            FieldValue::Str(v) => f.debug_tuple("Str").field(v).finish(),
            FieldValue::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
            FieldValue::NaiveDateTime(v) => f.debug_tuple("NaiveDateTime").field(v).finish(),
            FieldValue::Sequence(v) => f.debug_tuple("Sequence").field(v).finish(),
            FieldValue::Map(v) => f.debug_tuple("Map").field(v).finish(),
            FieldValue::Record(r) => f.debug_tuple("Record").field(&r.type_name()).finish(),
        }
    }
}

impl PartialEq for FieldValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::Isize(a), Self::Isize(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::Usize(a), Self::Usize(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::NaiveDateTime(a), Self::NaiveDateTime(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            // Records compare by identity
            (Self::Record(a), Self::Record(b)) => std::ptr::addr_eq(*a, *b),
            _ => false,
        }
    }
}

/// A type that may appear as a record field
pub trait FieldType: 'static {
    /// Kind recorded in the field descriptor
    const KIND: ValueKind;

    /// Whether the field is pointer-like and may be null
    const POINTER: bool = false;

    /// Schema to continue resolution with, for record-valued fields
    fn nested_schema(_registry: &SchemaRegistry) -> Option<Arc<Schema>> {
        None
    }

    /// Read the field
    fn field_value(&self) -> FieldValue<'_>;
}

macro_rules! impl_scalar_field {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldType for $ty {
                const KIND: ValueKind = ValueKind::$kind;

                #[inline]
                fn field_value(&self) -> FieldValue<'_> {
                    FieldValue::$kind(*self)
                }
            }

            impl FromField for $ty {
                fn from_field(value: FieldValue<'_>) -> Option<Self> {
                    match value {
                        FieldValue::$kind(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_scalar_field! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    char => Char,
}

impl FieldType for String {
    const KIND: ValueKind = ValueKind::String;

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Str(self.as_str())
    }
}

impl FieldType for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::DateTime;

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::DateTime(*self)
    }
}

impl FieldType for NaiveDateTime {
    const KIND: ValueKind = ValueKind::DateTime;

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::NaiveDateTime(*self)
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const KIND: ValueKind = T::KIND;
    const POINTER: bool = true;

    fn nested_schema(registry: &SchemaRegistry) -> Option<Arc<Schema>> {
        T::nested_schema(registry)
    }

    fn field_value(&self) -> FieldValue<'_> {
        match self {
            Some(inner) => inner.field_value(),
            None => FieldValue::Null,
        }
    }
}

impl<T: FieldType> FieldType for Box<T> {
    const KIND: ValueKind = T::KIND;
    const POINTER: bool = true;

    fn nested_schema(registry: &SchemaRegistry) -> Option<Arc<Schema>> {
        T::nested_schema(registry)
    }

    fn field_value(&self) -> FieldValue<'_> {
        (**self).field_value()
    }
}

impl<T: FieldType> FieldType for Arc<T> {
    const KIND: ValueKind = T::KIND;
    const POINTER: bool = true;

    fn nested_schema(registry: &SchemaRegistry) -> Option<Arc<Schema>> {
        T::nested_schema(registry)
    }

    fn field_value(&self) -> FieldValue<'_> {
        (**self).field_value()
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    const KIND: ValueKind = ValueKind::Sequence;

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Sequence(self.iter().map(FieldType::field_value).collect())
    }
}

impl<T: FieldType, const N: usize> FieldType for [T; N] {
    const KIND: ValueKind = ValueKind::Sequence;

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Sequence(self.iter().map(FieldType::field_value).collect())
    }
}

impl<V: FieldType, S: 'static> FieldType for HashMap<String, V, S> {
    const KIND: ValueKind = ValueKind::Map;

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Map(
            self.iter()
                .map(|(k, v)| (k.as_str(), v.field_value()))
                .collect(),
        )
    }
}

impl<V: FieldType> FieldType for BTreeMap<String, V> {
    const KIND: ValueKind = ValueKind::Map;

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Map(
            self.iter()
                .map(|(k, v)| (k.as_str(), v.field_value()))
                .collect(),
        )
    }
}

/// Conversion from a resolved [`FieldValue`] into an owned result type
///
/// Conversions are exact: an `i32` field does not convert to `i64`. A kind
/// mismatch yields `None`, which callers treat as "fall back".
pub trait FromField: Sized {
    /// Convert, or `None` on kind mismatch
    fn from_field(value: FieldValue<'_>) -> Option<Self>;
}

impl FromField for String {
    fn from_field(value: FieldValue<'_>) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromField for DateTime<Utc> {
    fn from_field(value: FieldValue<'_>) -> Option<Self> {
        match value {
            FieldValue::DateTime(v) => Some(v),
            _ => None,
        }
    }
}

impl FromField for NaiveDateTime {
    fn from_field(value: FieldValue<'_>) -> Option<Self> {
        match value {
            FieldValue::NaiveDateTime(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: FromField> FromField for Vec<T> {
    fn from_field(value: FieldValue<'_>) -> Option<Self> {
        match value {
            FieldValue::Sequence(items) => items.into_iter().map(T::from_field).collect(),
            _ => None,
        }
    }
}

impl<T: FromField> FromField for BTreeMap<String, T> {
    fn from_field(value: FieldValue<'_>) -> Option<Self> {
        match value {
            FieldValue::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| T::from_field(v).map(|v| (k.to_owned(), v)))
                .collect(),
            _ => None,
        }
    }
}
