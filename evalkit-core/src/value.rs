use proc_macro2::TokenStream;
use quote::{ToTokens, TokenStreamExt, quote};
use std::mem;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Dynamically typed SQL value.
///
/// Every variant carries an `Option` so that a NULL still knows the type of the
/// column it came from. [`Value::Null`] is used when the type is unknown, for
/// example a NULL cell returned by an engine without static column types.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null
            | Value::Boolean(None)
            | Value::Int8(None)
            | Value::Int16(None)
            | Value::Int32(None)
            | Value::Int64(None)
            | Value::UInt8(None)
            | Value::UInt16(None)
            | Value::UInt32(None)
            | Value::UInt64(None)
            | Value::Float32(None)
            | Value::Float64(None)
            | Value::Varchar(None)
            | Value::Blob(None)
            | Value::Date(None)
            | Value::Time(None)
            | Value::Timestamp(None)
            | Value::TimestampWithTimezone(None) => true,
            _ => false,
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// Integer and floating point variants, the ones accepted by `AVG` and `SUM`.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int8(..)
                | Value::Int16(..)
                | Value::Int32(..)
                | Value::Int64(..)
                | Value::UInt8(..)
                | Value::UInt16(..)
                | Value::UInt32(..)
                | Value::UInt64(..)
                | Value::Float32(..)
                | Value::Float64(..)
        )
    }

    /// The same variant without the payload.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int8(..) => Value::Int8(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::UInt8(..) => Value::UInt8(None),
            Value::UInt16(..) => Value::UInt16(None),
            Value::UInt32(..) => Value::UInt32(None),
            Value::UInt64(..) => Value::UInt64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(None),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            _ => self.is_null() && other.is_null(),
        }
    }
}

impl ToTokens for Value {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.append_all(match self {
            Value::Null => quote!(::evalkit::Value::Null),
            Value::Boolean(..) => quote!(::evalkit::Value::Boolean(None)),
            Value::Int8(..) => quote!(::evalkit::Value::Int8(None)),
            Value::Int16(..) => quote!(::evalkit::Value::Int16(None)),
            Value::Int32(..) => quote!(::evalkit::Value::Int32(None)),
            Value::Int64(..) => quote!(::evalkit::Value::Int64(None)),
            Value::UInt8(..) => quote!(::evalkit::Value::UInt8(None)),
            Value::UInt16(..) => quote!(::evalkit::Value::UInt16(None)),
            Value::UInt32(..) => quote!(::evalkit::Value::UInt32(None)),
            Value::UInt64(..) => quote!(::evalkit::Value::UInt64(None)),
            Value::Float32(..) => quote!(::evalkit::Value::Float32(None)),
            Value::Float64(..) => quote!(::evalkit::Value::Float64(None)),
            Value::Varchar(..) => quote!(::evalkit::Value::Varchar(None)),
            Value::Blob(..) => quote!(::evalkit::Value::Blob(None)),
            Value::Date(..) => quote!(::evalkit::Value::Date(None)),
            Value::Time(..) => quote!(::evalkit::Value::Time(None)),
            Value::Timestamp(..) => quote!(::evalkit::Value::Timestamp(None)),
            Value::TimestampWithTimezone(..) => {
                quote!(::evalkit::Value::TimestampWithTimezone(None))
            }
        });
    }
}
