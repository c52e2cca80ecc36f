use crate::{
    BinaryOp, BinaryOpType, ColumnRef, Expression, OpPrecedence, Operand, Order, Ordered,
    SqlWriter, UnaryOp, UnaryOpType, Value, escape_like, writer::Context,
};

/// Owned boolean expression used in `WHERE` and `HAVING` clauses.
///
/// Built from [`Filterable`] comparisons and combined with [`Condition::and`],
/// [`Condition::or`] and [`Condition::not`].
///
/// ```rust,ignore
/// let filter = Student::name
///     .starts_with("A")
///     .and(Student::student_id.not_in(["S-01", "S-02"]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Constant(bool),
    Compare(BinaryOpType, Operand, Operand),
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Matches every row.
    pub fn all() -> Condition {
        Condition::Constant(true)
    }

    pub fn and(self, other: Condition) -> Condition {
        match (self, other) {
            (Condition::Constant(true), v) | (v, Condition::Constant(true)) => v,
            (lhs, rhs) => Condition::And(lhs.into(), rhs.into()),
        }
    }

    pub fn or(self, other: Condition) -> Condition {
        match (self, other) {
            (Condition::Constant(false), v) | (v, Condition::Constant(false)) => v,
            (lhs, rhs) => Condition::Or(lhs.into(), rhs.into()),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Condition {
        match self {
            Condition::Constant(v) => Condition::Constant(!v),
            Condition::Not(v) => *v,
            v => Condition::Not(v.into()),
        }
    }

    /// Conjunction, empty input matches every row.
    pub fn all_of(conditions: impl IntoIterator<Item = Condition>) -> Condition {
        conditions
            .into_iter()
            .fold(Condition::Constant(true), Condition::and)
    }

    /// Disjunction, empty input matches no row.
    pub fn any_of(conditions: impl IntoIterator<Item = Condition>) -> Condition {
        conditions
            .into_iter()
            .fold(Condition::Constant(false), Condition::or)
    }

    /// Every column referenced, including the arguments of aggregate calls.
    pub fn columns(&self) -> Vec<ColumnRef> {
        fn operand_columns(operand: &Operand, out: &mut Vec<ColumnRef>) {
            match operand {
                Operand::Column(c) => out.push(*c),
                Operand::Call(_, args) => args.iter().for_each(|v| operand_columns(v, out)),
                _ => {}
            }
        }
        fn collect(condition: &Condition, out: &mut Vec<ColumnRef>) {
            match condition {
                Condition::Constant(..) => {}
                Condition::Compare(_, lhs, rhs) => {
                    operand_columns(lhs, out);
                    operand_columns(rhs, out);
                }
                Condition::Not(v) => collect(v, out),
                Condition::And(lhs, rhs) | Condition::Or(lhs, rhs) => {
                    collect(lhs, out);
                    collect(rhs, out);
                }
            }
        }
        let mut result = Vec::new();
        collect(self, &mut result);
        result
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::all()
    }
}

impl OpPrecedence for Condition {
    fn precedence(&self, writer: &dyn SqlWriter) -> i32 {
        match self {
            Condition::Constant(..) => 1_000_000,
            Condition::Compare(op, ..) => writer.expression_binary_op_precedence(op),
            Condition::Not(..) => writer.expression_unary_op_precedence(&UnaryOpType::Not),
            Condition::And(..) => writer.expression_binary_op_precedence(&BinaryOpType::And),
            Condition::Or(..) => writer.expression_binary_op_precedence(&BinaryOpType::Or),
        }
    }
}

impl Expression for Condition {
    fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, out: &mut String) {
        match self {
            Condition::Constant(v) => writer.write_value_bool(context, out, *v),
            Condition::Compare(op, lhs, rhs) => BinaryOp {
                op: *op,
                lhs,
                rhs,
            }
            .write_query(writer, context, out),
            Condition::Not(v) => UnaryOp {
                op: UnaryOpType::Not,
                arg: v.as_ref(),
            }
            .write_query(writer, context, out),
            Condition::And(lhs, rhs) => BinaryOp {
                op: BinaryOpType::And,
                lhs: lhs.as_ref(),
                rhs: rhs.as_ref(),
            }
            .write_query(writer, context, out),
            Condition::Or(lhs, rhs) => BinaryOp {
                op: BinaryOpType::Or,
                lhs: lhs.as_ref(),
                rhs: rhs.as_ref(),
            }
            .write_query(writer, context, out),
        }
    }
}

/// Comparisons available on columns and aggregate calls.
pub trait Filterable {
    fn operand(&self) -> Operand;

    /// `= value`, a NULL value turns into `IS NULL`.
    fn equals(&self, value: impl Into<Value>) -> Condition {
        let value = value.into();
        if value.is_null() {
            return self.is_null();
        }
        Condition::Compare(BinaryOpType::Equal, self.operand(), Operand::Variable(value))
    }

    /// `!= value`, a NULL value turns into `IS NOT NULL`.
    fn not_equals(&self, value: impl Into<Value>) -> Condition {
        let value = value.into();
        if value.is_null() {
            return self.is_not_null();
        }
        Condition::Compare(
            BinaryOpType::NotEqual,
            self.operand(),
            Operand::Variable(value),
        )
    }

    fn lt(&self, value: impl Into<Value>) -> Condition {
        Condition::Compare(BinaryOpType::Less, self.operand(), Operand::Variable(value.into()))
    }

    fn lte(&self, value: impl Into<Value>) -> Condition {
        Condition::Compare(
            BinaryOpType::LessEqual,
            self.operand(),
            Operand::Variable(value.into()),
        )
    }

    fn gt(&self, value: impl Into<Value>) -> Condition {
        Condition::Compare(
            BinaryOpType::Greater,
            self.operand(),
            Operand::Variable(value.into()),
        )
    }

    fn gte(&self, value: impl Into<Value>) -> Condition {
        Condition::Compare(
            BinaryOpType::GreaterEqual,
            self.operand(),
            Operand::Variable(value.into()),
        )
    }

    /// `IN (...)`, an empty list matches nothing.
    fn in_list<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> Condition {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Condition::Constant(false);
        }
        Condition::Compare(BinaryOpType::In, self.operand(), Operand::List(values))
    }

    /// `NOT IN (...)`, an empty list matches everything.
    fn not_in<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> Condition {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Condition::Constant(true);
        }
        Condition::Compare(BinaryOpType::NotIn, self.operand(), Operand::List(values))
    }

    fn contains(&self, value: &str) -> Condition {
        like(self.operand(), format!("%{}%", escape_like(value)))
    }

    fn starts_with(&self, value: &str) -> Condition {
        like(self.operand(), format!("{}%", escape_like(value)))
    }

    fn ends_with(&self, value: &str) -> Condition {
        like(self.operand(), format!("%{}", escape_like(value)))
    }

    fn is_null(&self) -> Condition {
        Condition::Compare(BinaryOpType::Is, self.operand(), Operand::Null)
    }

    fn is_not_null(&self) -> Condition {
        Condition::Compare(BinaryOpType::IsNot, self.operand(), Operand::Null)
    }
}

fn like(operand: Operand, pattern: String) -> Condition {
    Condition::Compare(
        BinaryOpType::Like,
        operand,
        Operand::Variable(Value::Varchar(Some(pattern))),
    )
}

impl Filterable for ColumnRef {
    fn operand(&self) -> Operand {
        Operand::Column(*self)
    }
}

pub type OrderBy = Ordered<Operand>;

/// `ORDER BY` terms from columns and aggregate calls.
pub trait Sortable {
    fn sort_operand(&self) -> Operand;

    fn asc(&self) -> OrderBy {
        Ordered {
            order: Order::ASC,
            expression: self.sort_operand(),
        }
    }

    fn desc(&self) -> OrderBy {
        Ordered {
            order: Order::DESC,
            expression: self.sort_operand(),
        }
    }
}

impl Sortable for ColumnRef {
    fn sort_operand(&self) -> Operand {
        Operand::Column(*self)
    }
}

impl OrderBy {
    /// Columns referenced by the ordering term.
    pub fn columns(&self) -> Vec<ColumnRef> {
        match &self.expression {
            Operand::Column(c) => vec![*c],
            Operand::Call(_, args) => args
                .iter()
                .filter_map(|v| match v {
                    Operand::Column(c) => Some(*c),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}
