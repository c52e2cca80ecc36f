use crate::{ColumnRef, Expression, OpPrecedence, SqlWriter, Value, writer::Context};

/// Leaf of the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    LitBool(bool),
    LitInt(i64),
    LitStr(&'static str),
    Null,
    Asterisk,
    Column(ColumnRef),
    Variable(Value),
    /// Parenthesized value list, the right hand side of `IN`.
    List(Vec<Value>),
    /// Function call: name and arguments.
    Call(&'static str, Box<[Operand]>),
}

impl OpPrecedence for Operand {
    fn precedence(&self, _writer: &dyn SqlWriter) -> i32 {
        1_000_000
    }
}

impl Expression for Operand {
    fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, out: &mut String) {
        writer.write_expression_operand(context, out, self)
    }
}

impl From<ColumnRef> for Operand {
    fn from(value: ColumnRef) -> Self {
        Operand::Column(value)
    }
}
