use crate::{
    AsValue, ColumnRef, Error, Expression, Filterable, OpPrecedence, Operand, Result, Sortable,
    SqlWriter, Value, writer::Context,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    CountAll,
    Count,
    Avg,
    Sum,
    Min,
    Max,
}

impl AggregateKind {
    pub fn function_name(&self) -> &'static str {
        match self {
            AggregateKind::CountAll | AggregateKind::Count => "COUNT",
            AggregateKind::Avg => "AVG",
            AggregateKind::Sum => "SUM",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
        }
    }

    /// Result group of the output label: `_count`, `_avg`...
    pub fn label_prefix(&self) -> &'static str {
        match self {
            AggregateKind::CountAll | AggregateKind::Count => "_count",
            AggregateKind::Avg => "_avg",
            AggregateKind::Sum => "_sum",
            AggregateKind::Min => "_min",
            AggregateKind::Max => "_max",
        }
    }
}

/// One aggregate call, `COUNT(*)` or `FUNCTION(column)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateFn {
    pub kind: AggregateKind,
    pub column: Option<ColumnRef>,
}

impl AggregateFn {
    /// Output label, `_count._all` or `_avg.rating`.
    pub fn label(&self) -> String {
        format!(
            "{}.{}",
            self.kind.label_prefix(),
            self.column.map(|c| c.name).unwrap_or("_all")
        )
    }
}

impl OpPrecedence for AggregateFn {
    fn precedence(&self, _writer: &dyn SqlWriter) -> i32 {
        1_000_000
    }
}

impl Expression for AggregateFn {
    fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, out: &mut String) {
        writer.write_expression_operand(context, out, &self.operand())
    }
}

impl Filterable for AggregateFn {
    fn operand(&self) -> Operand {
        Operand::Call(
            self.kind.function_name(),
            [match self.column {
                Some(column) => Operand::Column(column),
                None => Operand::Asterisk,
            }]
            .into(),
        )
    }
}

impl Sortable for AggregateFn {
    fn sort_operand(&self) -> Operand {
        self.operand()
    }
}

/// Constructors for aggregate calls usable in `having` and `order_by`.
pub struct Aggregate;

impl Aggregate {
    pub fn count_all() -> AggregateFn {
        AggregateFn {
            kind: AggregateKind::CountAll,
            column: None,
        }
    }
    pub fn count(column: ColumnRef) -> AggregateFn {
        AggregateFn {
            kind: AggregateKind::Count,
            column: Some(column),
        }
    }
    pub fn avg(column: ColumnRef) -> AggregateFn {
        AggregateFn {
            kind: AggregateKind::Avg,
            column: Some(column),
        }
    }
    pub fn sum(column: ColumnRef) -> AggregateFn {
        AggregateFn {
            kind: AggregateKind::Sum,
            column: Some(column),
        }
    }
    pub fn min(column: ColumnRef) -> AggregateFn {
        AggregateFn {
            kind: AggregateKind::Min,
            column: Some(column),
        }
    }
    pub fn max(column: ColumnRef) -> AggregateFn {
        AggregateFn {
            kind: AggregateKind::Max,
            column: Some(column),
        }
    }
}

/// Aggregates requested by `aggregate` and `group_by`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AggregateSelection {
    pub count_all: bool,
    pub count: Vec<ColumnRef>,
    pub avg: Vec<ColumnRef>,
    pub sum: Vec<ColumnRef>,
    pub min: Vec<ColumnRef>,
    pub max: Vec<ColumnRef>,
}

impl AggregateSelection {
    pub fn is_empty(&self) -> bool {
        !self.count_all
            && self.count.is_empty()
            && self.avg.is_empty()
            && self.sum.is_empty()
            && self.min.is_empty()
            && self.max.is_empty()
    }

    /// Calls in output order.
    pub fn functions(&self) -> Vec<AggregateFn> {
        let mut result = Vec::new();
        if self.count_all {
            result.push(Aggregate::count_all());
        }
        result.extend(self.count.iter().copied().map(Aggregate::count));
        result.extend(self.avg.iter().copied().map(Aggregate::avg));
        result.extend(self.sum.iter().copied().map(Aggregate::sum));
        result.extend(self.min.iter().copied().map(Aggregate::min));
        result.extend(self.max.iter().copied().map(Aggregate::max));
        result
    }
}

/// Aggregated values keyed by label.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AggregateResult {
    pub values: BTreeMap<String, Value>,
}

impl AggregateResult {
    fn value(&self, function: AggregateFn) -> Option<&Value> {
        self.values
            .get(&function.label())
            .filter(|v| !v.is_null())
    }

    fn decode<T: AsValue>(&self, function: AggregateFn) -> Result<Option<T>> {
        match self.value(function) {
            Some(v) => Ok(Some(T::try_from_value(v.clone()).map_err(|e| {
                e.context(format!("While decoding `{}`", function.label()))
            })?)),
            None => Ok(None),
        }
    }

    /// `_count._all`, `None` when it was not selected.
    pub fn count_all(&self) -> Option<u64> {
        self.decode(Aggregate::count_all()).ok().flatten()
    }

    pub fn count(&self, column: ColumnRef) -> Option<u64> {
        self.decode(Aggregate::count(column)).ok().flatten()
    }

    /// Average, `None` when not selected or computed over no rows.
    pub fn avg(&self, column: ColumnRef) -> Option<f64> {
        self.decode(Aggregate::avg(column)).ok().flatten()
    }

    pub fn sum<T: AsValue>(&self, column: ColumnRef) -> Result<Option<T>> {
        self.decode(Aggregate::sum(column))
    }

    pub fn min<T: AsValue>(&self, column: ColumnRef) -> Result<Option<T>> {
        self.decode(Aggregate::min(column))
    }

    pub fn max<T: AsValue>(&self, column: ColumnRef) -> Result<Option<T>> {
        self.decode(Aggregate::max(column))
    }
}

/// One group: the `by` fields and the aggregates computed over it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GroupByRow {
    pub fields: BTreeMap<String, Value>,
    pub aggregates: AggregateResult,
}

impl GroupByRow {
    pub fn get<T: AsValue>(&self, column: ColumnRef) -> Result<T> {
        let value = self.fields.get(column.name).cloned().ok_or_else(|| {
            Error::msg(format!(
                "Column `{}` is not part of the group by fields",
                column.name
            ))
        })?;
        T::try_from_value(value)
    }
}
