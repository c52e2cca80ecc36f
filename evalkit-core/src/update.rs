use crate::{ColumnRef, Value};

/// Assignment applied to one column by `update` and `update_many`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(Value),
    Increment(Value),
    Decrement(Value),
    Multiply(Value),
    Divide(Value),
}

/// Ordered list of column assignments.
///
/// ```rust,ignore
/// let data = UpdateData::new()
///     .set(Student::name, "Ada")
///     .increment(EvaluationResponse::rating, 1);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateData {
    pub fields: Vec<(ColumnRef, FieldUpdate)>,
}

impl UpdateData {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn set(self, column: ColumnRef, value: impl Into<Value>) -> Self {
        self.with(column, FieldUpdate::Set(value.into()))
    }
    pub fn increment(self, column: ColumnRef, value: impl Into<Value>) -> Self {
        self.with(column, FieldUpdate::Increment(value.into()))
    }
    pub fn decrement(self, column: ColumnRef, value: impl Into<Value>) -> Self {
        self.with(column, FieldUpdate::Decrement(value.into()))
    }
    pub fn multiply(self, column: ColumnRef, value: impl Into<Value>) -> Self {
        self.with(column, FieldUpdate::Multiply(value.into()))
    }
    pub fn divide(self, column: ColumnRef, value: impl Into<Value>) -> Self {
        self.with(column, FieldUpdate::Divide(value.into()))
    }
    /// Adds the assignment, replacing a previous one on the same column.
    pub fn with(mut self, column: ColumnRef, update: FieldUpdate) -> Self {
        self.fields.retain(|(c, _)| *c != column);
        self.fields.push((column, update));
        self
    }
    pub fn contains(&self, column: &ColumnRef) -> bool {
        self.fields.iter().any(|(c, _)| c == column)
    }
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
    pub fn columns(&self) -> impl Iterator<Item = &ColumnRef> {
        self.fields.iter().map(|(c, _)| c)
    }
}
