use crate::{AggregateSelection, ColumnRef, Condition, OrderBy};

/// Arguments of `find_many`, `find_first` and `count`.
///
/// A negative `take` reads backwards from the end of the ordering.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FindArgs {
    pub filter: Option<Condition>,
    pub order_by: Vec<OrderBy>,
    pub skip: Option<u64>,
    pub take: Option<i64>,
    pub distinct: Vec<ColumnRef>,
}

impl FindArgs {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(condition);
        self
    }
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }
    pub fn take(mut self, take: i64) -> Self {
        self.take = Some(take);
        self
    }
    pub fn distinct(mut self, columns: impl IntoIterator<Item = ColumnRef>) -> Self {
        self.distinct.extend(columns);
        self
    }
}

impl From<Condition> for FindArgs {
    fn from(value: Condition) -> Self {
        FindArgs::new().filter(value)
    }
}

impl From<()> for FindArgs {
    fn from(_: ()) -> Self {
        FindArgs::new()
    }
}

/// Filter, ordering and page of rows a statement operates on.
#[derive(Debug, Default, Clone, Copy)]
pub struct Window<'a> {
    pub filter: Option<&'a Condition>,
    pub order_by: &'a [OrderBy],
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl<'a> Window<'a> {
    pub fn is_paginated(&self) -> bool {
        self.skip.is_some() || self.take.is_some()
    }
}

macro_rules! selection_builders {
    () => {
        pub fn count_all(mut self) -> Self {
            self.selection.count_all = true;
            self
        }
        pub fn count(mut self, column: ColumnRef) -> Self {
            self.selection.count.push(column);
            self
        }
        pub fn avg(mut self, column: ColumnRef) -> Self {
            self.selection.avg.push(column);
            self
        }
        pub fn sum(mut self, column: ColumnRef) -> Self {
            self.selection.sum.push(column);
            self
        }
        pub fn min(mut self, column: ColumnRef) -> Self {
            self.selection.min.push(column);
            self
        }
        pub fn max(mut self, column: ColumnRef) -> Self {
            self.selection.max.push(column);
            self
        }
        pub fn filter(mut self, condition: Condition) -> Self {
            self.filter = Some(condition);
            self
        }
        pub fn order_by(mut self, order: OrderBy) -> Self {
            self.order_by.push(order);
            self
        }
        pub fn skip(mut self, skip: u64) -> Self {
            self.skip = Some(skip);
            self
        }
        pub fn take(mut self, take: u64) -> Self {
            self.take = Some(take);
            self
        }
    };
}

/// Arguments of `aggregate`: the aggregates over a filtered, ordered, paginated window.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AggregateArgs {
    pub selection: AggregateSelection,
    pub filter: Option<Condition>,
    pub order_by: Vec<OrderBy>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl AggregateArgs {
    pub fn new() -> Self {
        Default::default()
    }
    selection_builders!();
    pub fn window(&self) -> Window<'_> {
        Window {
            filter: self.filter.as_ref(),
            order_by: &self.order_by,
            skip: self.skip,
            take: self.take,
        }
    }
}

/// Arguments of `group_by`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GroupByArgs {
    pub by: Vec<ColumnRef>,
    pub selection: AggregateSelection,
    pub filter: Option<Condition>,
    pub having: Option<Condition>,
    pub order_by: Vec<OrderBy>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl GroupByArgs {
    pub fn new(by: impl IntoIterator<Item = ColumnRef>) -> Self {
        Self {
            by: by.into_iter().collect(),
            ..Default::default()
        }
    }
    selection_builders!();
    pub fn having(mut self, condition: Condition) -> Self {
        self.having = Some(condition);
        self
    }
    pub fn window(&self) -> Window<'_> {
        Window {
            filter: self.filter.as_ref(),
            order_by: &self.order_by,
            skip: self.skip,
            take: self.take,
        }
    }
}
