use crate::Condition;
use std::fmt::Debug;

/// Selector of exactly one record through a primary or unique key.
///
/// Implemented by the `<Model>Unique` enum the derive macro generates.
pub trait UniqueWhere: Debug + Send + Sync {
    fn condition(&self) -> Condition;
}
