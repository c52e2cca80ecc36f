use crate::{AsValue, Result, Value};

/// Field whose value is produced by the engine when it is not provided.
///
/// Auto increment identifiers and defaulted timestamps are `Passive`: a new
/// record leaves them `NotSet` and the column is omitted from the `INSERT`,
/// the stored record read back through `RETURNING` has them `Set`.
#[derive(Debug)]
pub enum Passive<T: AsValue> {
    Set(T),
    NotSet,
}

impl<T: AsValue> Default for Passive<T> {
    fn default() -> Self {
        Passive::NotSet
    }
}

impl<T: AsValue> Passive<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Passive::Set(..))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Passive::Set(v) => Some(v),
            Passive::NotSet => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Passive::Set(v) => Some(v),
            Passive::NotSet => None,
        }
    }
}

impl<T: AsValue + PartialEq> PartialEq for Passive<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Set(lhs), Self::Set(rhs)) => lhs == rhs,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl<T: AsValue> Clone for Passive<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::Set(v) => Self::Set(v.clone()),
            Self::NotSet => Self::NotSet,
        }
    }
}

impl<T: AsValue> From<T> for Passive<T> {
    fn from(value: T) -> Self {
        Self::Set(value)
    }
}

impl<T: AsValue> AsValue for Passive<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Passive::Set(v) => v.as_value(),
            Passive::NotSet => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Passive::Set(T::try_from_value(value)?))
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        Ok(Passive::Set(T::parse(input)?))
    }
}
