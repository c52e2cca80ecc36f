use crate::{AsValue, Result, Value};
use std::fmt::Display;

/// A parameterized, backend-prepared query handle.
///
/// Parameters are positional. `bind` appends a value, `bind_index` sets the
/// parameter at `index` (from 0).
///
/// ```rust,ignore
/// prepared.bind(42)?.bind("hello")?;
/// ```
pub trait Prepared: Send + Sync + Display {
    /// Append a parameter value.
    fn bind_value(&mut self, value: Value) -> Result<&mut Self>;
    /// Set the parameter at `index`.
    fn bind_value_index(&mut self, value: Value, index: u64) -> Result<&mut Self>;
    /// Remove all the previously bound values.
    fn clear_bindings(&mut self) -> Result<&mut Self>;
    /// Number of placeholders in the statement.
    fn parameters(&self) -> u64;

    fn bind<V: AsValue>(&mut self, value: V) -> Result<&mut Self> {
        self.bind_value(value.as_value())
    }
    fn bind_index<V: AsValue>(&mut self, value: V, index: u64) -> Result<&mut Self> {
        self.bind_value_index(value.as_value(), index)
    }
}
