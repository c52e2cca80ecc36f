use crate::{
    Action, AggregateFn, BinaryOp, BinaryOpType, ColumnDef, ColumnRef, Entity, Expression,
    FieldUpdate, Fragment, IsolationLevel, Operand, Order, Ordered, PrimaryKeyType, RowFields,
    TableRef, UnaryOp, UnaryOpType, UpdateData, Value, Window, possibly_parenthesized,
    separated_by, writer::Context,
};
use std::fmt::Write;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident, $out:ident, $value:expr) => {{
        if !$value.is_finite() {
            $this.write_value_non_finite($context, $out, $value as f64);
        } else {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        }
    }};
}

/// Dialect printer converting semantic constructs into concrete SQL strings.
///
/// Every method has a default producing generic SQL (close to PostgreSQL), a
/// dialect overrides only the hooks where its syntax differs. Values are
/// rendered as literals.
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// Render a table reference with optional alias.
    fn write_table_ref(&self, context: &mut Context, out: &mut String, value: &TableRef) {
        if context.fragment == Fragment::SqlSelectFrom || value.alias.is_empty() {
            if !value.schema.is_empty() {
                self.write_identifier_quoted(context, out, value.schema);
                out.push('.');
            }
            self.write_identifier_quoted(context, out, value.name);
        }
        if !value.alias.is_empty() {
            out.push(' ');
            self.write_identifier_quoted(context, out, value.alias);
        }
    }

    /// Render a column reference optionally qualifying with schema/table.
    fn write_column_ref(&self, context: &mut Context, out: &mut String, value: &ColumnRef) {
        if context.qualify_columns && !value.table.is_empty() {
            if !value.schema.is_empty() {
                self.write_identifier_quoted(context, out, value.schema);
                out.push('.');
            }
            self.write_identifier_quoted(context, out, value.table);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, value.name);
    }

    /// Render the SQL type for a `Value` prototype.
    fn write_column_type(&self, _context: &mut Context, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..) => out.push_str("BOOLEAN"),
            Value::Int8(..) => out.push_str("SMALLINT"),
            Value::Int16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) => out.push_str("INTEGER"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::UInt8(..) => out.push_str("SMALLINT"),
            Value::UInt16(..) => out.push_str("INTEGER"),
            Value::UInt32(..) => out.push_str("BIGINT"),
            Value::UInt64(..) => out.push_str("NUMERIC(20)"),
            Value::Float32(..) => out.push_str("REAL"),
            Value::Float64(..) => out.push_str("DOUBLE PRECISION"),
            Value::Varchar(..) => out.push_str("TEXT"),
            Value::Blob(..) => out.push_str("BYTEA"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Time(..) => out.push_str("TIME"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::TimestampWithTimezone(..) => out.push_str("TIMESTAMPTZ"),
            Value::Null => log::error!("Cannot derive a column type from an untyped NULL"),
        };
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, context, out, *v),
            Value::Float64(Some(v)) => write_float!(self, context, out, *v),
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v.as_ref()),
            Value::Date(Some(v)) => self.write_value_date(context, out, v, false),
            Value::Time(Some(v)) => self.write_value_time(context, out, v, false),
            Value::Timestamp(Some(v)) => self.write_value_timestamp(context, out, v),
            Value::TimestampWithTimezone(Some(v)) => {
                self.write_value_timestamptz(context, out, v)
            }
            _ => log::error!("Cannot write {:?}", value),
        };
    }

    /// Render NULL literal.
    fn write_value_none(&self, _context: &mut Context, out: &mut String) {
        out.push_str("NULL");
    }

    /// Render boolean literal.
    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    /// Render an infinite or NaN float, NULL unless the dialect has a literal for it.
    fn write_value_non_finite(&self, context: &mut Context, out: &mut String, _value: f64) {
        self.write_value_none(context, out);
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(context, out, value, '\'', "''");
        out.push('\'');
    }

    /// Render a blob literal using hex escapes.
    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    /// Render a DATE literal (optionally as part of TIMESTAMP composition).
    fn write_value_date(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &Date,
        timestamp: bool,
    ) {
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:04}-{:02}-{:02}{b}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    /// Render a TIME literal (optionally as part of TIMESTAMP composition).
    fn write_value_time(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &Time,
        timestamp: bool,
    ) {
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second(),
        );
        let mut subsecond = value.nanosecond();
        if subsecond != 0 {
            let mut width = 9;
            while subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond);
        }
        out.push_str(b);
    }

    /// Separator between the date and the time of a timestamp.
    fn value_timestamp_separator(&self) -> char {
        'T'
    }

    /// Render a TIMESTAMP literal.
    fn write_value_timestamp(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &PrimitiveDateTime,
    ) {
        out.push('\'');
        self.write_value_date(context, out, &value.date(), true);
        out.push(self.value_timestamp_separator());
        self.write_value_time(context, out, &value.time(), true);
        out.push('\'');
    }

    /// Render a TIMESTAMPTZ literal, normalized to UTC.
    fn write_value_timestamptz(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &OffsetDateTime,
    ) {
        let date_time = value.to_offset(time::UtcOffset::UTC);
        self.write_value_timestamp(
            context,
            out,
            &PrimitiveDateTime::new(date_time.date(), date_time.time()),
        );
    }

    /// Precedence table for unary operators.
    fn expression_unary_op_precedence(&self, value: &UnaryOpType) -> i32 {
        match value {
            UnaryOpType::Negative => 1250,
            UnaryOpType::Not => 250,
        }
    }

    /// Precedence table for binary operators.
    fn expression_binary_op_precedence(&self, value: &BinaryOpType) -> i32 {
        match value {
            BinaryOpType::Or => 100,
            BinaryOpType::And => 200,
            BinaryOpType::Equal => 300,
            BinaryOpType::NotEqual => 300,
            BinaryOpType::Less => 300,
            BinaryOpType::Greater => 300,
            BinaryOpType::LessEqual => 300,
            BinaryOpType::GreaterEqual => 300,
            BinaryOpType::Is => 400,
            BinaryOpType::IsNot => 400,
            BinaryOpType::Like => 400,
            BinaryOpType::NotLike => 400,
            BinaryOpType::In => 400,
            BinaryOpType::NotIn => 400,
            BinaryOpType::Subtraction => 800,
            BinaryOpType::Addition => 800,
            BinaryOpType::Multiplication => 900,
            BinaryOpType::Division => 900,
        }
    }

    /// Render an operand (literal / variable / call).
    fn write_expression_operand(&self, context: &mut Context, out: &mut String, value: &Operand) {
        match value {
            Operand::LitBool(v) => self.write_value_bool(context, out, *v),
            Operand::LitInt(v) => write_integer!(out, *v),
            Operand::LitStr(v) => self.write_value_string(context, out, v),
            Operand::Null => out.push_str("NULL"),
            Operand::Asterisk => out.push('*'),
            Operand::Column(v) => self.write_column_ref(context, out, v),
            Operand::Variable(v) => self.write_value(context, out, v),
            Operand::List(values) => {
                out.push('(');
                separated_by(
                    out,
                    values,
                    |out, v| self.write_value(context, out, v),
                    ", ",
                );
                out.push(')');
            }
            Operand::Call(function, args) => {
                out.push_str(function);
                out.push('(');
                separated_by(
                    out,
                    args.iter(),
                    |out, v| self.write_expression_operand(context, out, v),
                    ", ",
                );
                out.push(')');
            }
        };
    }

    /// Render unary operator expression.
    fn write_expression_unary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &UnaryOp<&dyn Expression>,
    ) {
        match value.op {
            UnaryOpType::Negative => out.push('-'),
            UnaryOpType::Not => out.push_str("NOT "),
        };
        possibly_parenthesized!(
            out,
            value.arg.precedence(self.as_dyn()) <= self.expression_unary_op_precedence(&value.op),
            value.arg.write_query(self.as_dyn(), context, out)
        );
    }

    /// Render binary operator expression handling precedence / parenthesis.
    fn write_expression_binary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &BinaryOp<&dyn Expression, &dyn Expression>,
    ) {
        let (infix, suffix) = match value.op {
            BinaryOpType::Multiplication => (" * ", ""),
            BinaryOpType::Division => (" / ", ""),
            BinaryOpType::Addition => (" + ", ""),
            BinaryOpType::Subtraction => (" - ", ""),
            BinaryOpType::Is => (" IS ", ""),
            BinaryOpType::IsNot => (" IS NOT ", ""),
            BinaryOpType::Like => (" LIKE ", " ESCAPE '\\'"),
            BinaryOpType::NotLike => (" NOT LIKE ", " ESCAPE '\\'"),
            BinaryOpType::In => (" IN ", ""),
            BinaryOpType::NotIn => (" NOT IN ", ""),
            BinaryOpType::Equal => (" = ", ""),
            BinaryOpType::NotEqual => (" != ", ""),
            BinaryOpType::Less => (" < ", ""),
            BinaryOpType::LessEqual => (" <= ", ""),
            BinaryOpType::Greater => (" > ", ""),
            BinaryOpType::GreaterEqual => (" >= ", ""),
            BinaryOpType::And => (" AND ", ""),
            BinaryOpType::Or => (" OR ", ""),
        };
        let precedence = self.expression_binary_op_precedence(&value.op);
        possibly_parenthesized!(
            out,
            value.lhs.precedence(self.as_dyn()) < precedence,
            value.lhs.write_query(self.as_dyn(), context, out)
        );
        out.push_str(infix);
        possibly_parenthesized!(
            out,
            value.rhs.precedence(self.as_dyn()) <= precedence,
            value.rhs.write_query(self.as_dyn(), context, out)
        );
        out.push_str(suffix);
    }

    /// Render ordered expression inside ORDER BY.
    fn write_expression_ordered(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Ordered<&dyn Expression>,
    ) {
        value.expression.write_query(self.as_dyn(), context, out);
        out.push_str(match value.order {
            Order::ASC => " ASC",
            Order::DESC => " DESC",
        });
    }

    /// Emit `WHERE` when a filter is present.
    fn write_where(&self, context: &mut Context, out: &mut String, window: &Window) {
        if let Some(filter) = window.filter {
            out.push_str("\nWHERE ");
            filter.write_query(
                self.as_dyn(),
                &mut context.switch_fragment(Fragment::SqlSelectWhere),
                out,
            );
        }
    }

    /// Emit `ORDER BY` when at least one term is present.
    fn write_order_by(&self, context: &mut Context, out: &mut String, window: &Window) {
        if window.order_by.is_empty() {
            return;
        }
        out.push_str("\nORDER BY ");
        let mut context = context.switch_fragment(Fragment::SqlSelectOrderBy);
        separated_by(
            out,
            window.order_by,
            |out, v| v.write_query(self.as_dyn(), &mut context, out),
            ", ",
        );
    }

    /// Emit `LIMIT` / `OFFSET`.
    fn write_limit_offset(&self, _context: &mut Context, out: &mut String, window: &Window) {
        if let Some(take) = window.take {
            let _ = write!(out, "\nLIMIT {}", take);
        }
        if let Some(skip) = window.skip {
            let _ = write!(out, "\nOFFSET {}", skip);
        }
    }

    /// Emit the column list of an entity, in declaration order.
    fn write_entity_columns<E>(&self, context: &mut Context, out: &mut String)
    where
        Self: Sized,
        E: Entity,
    {
        separated_by(
            out,
            E::columns(),
            |out, v| self.write_column_ref(context, out, &v.column_ref),
            ", ",
        );
    }

    /// Emit `RETURNING` followed by every column of the entity.
    fn write_returning<E>(&self, context: &mut Context, out: &mut String)
    where
        Self: Sized,
        E: Entity,
    {
        out.push_str("\nRETURNING ");
        self.write_entity_columns::<E>(&mut context.switch_fragment(Fragment::SqlReturning), out);
    }

    /// Emit BEGIN statement.
    fn write_transaction_begin(&self, out: &mut String, isolation_level: Option<IsolationLevel>) {
        out.push_str("BEGIN");
        if let Some(isolation_level) = isolation_level {
            out.push_str(" ISOLATION LEVEL ");
            out.push_str(isolation_level.as_sql());
        }
        out.push(';');
    }

    /// Emit COMMIT statement.
    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT;");
    }

    /// Emit ROLLBACK statement.
    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK;");
    }

    /// Emit CREATE TABLE with columns and constraints.
    fn write_create_table<E>(&self, out: &mut String, if_not_exists: bool)
    where
        Self: Sized,
        E: Entity,
    {
        let mut context = Context::new(Fragment::SqlCreateTable, false);
        out.reserve(128 + E::columns().len() * 64 + E::primary_key_def().len() * 24);
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("CREATE TABLE ");
        if if_not_exists {
            out.push_str("IF NOT EXISTS ");
        }
        self.write_table_ref(&mut context, out, E::table_ref());
        out.push_str(" (\n");
        separated_by(
            out,
            E::columns(),
            |out, v| {
                self.write_create_table_column_fragment(&mut context, out, v);
            },
            ",\n",
        );
        let primary_key = E::primary_key_def();
        if primary_key.len() > 1 {
            out.push_str(",\nPRIMARY KEY (");
            let mut context = context.switch_fragment(Fragment::SqlCreateTablePrimaryKey);
            separated_by(
                out,
                primary_key,
                |out, v| self.write_identifier_quoted(&mut context, out, v.name()),
                ", ",
            );
            out.push(')');
        }
        for unique in E::unique_defs() {
            if unique.len() > 1 {
                out.push_str(",\nUNIQUE (");
                let mut context = context.switch_fragment(Fragment::SqlCreateTableUnique);
                separated_by(
                    out,
                    unique.iter(),
                    |out, v| self.write_identifier_quoted(&mut context, out, v.name()),
                    ", ",
                );
                out.push(')');
            }
        }
        out.push_str("\n);");
    }

    /// Emit single column definition fragment.
    fn write_create_table_column_fragment(
        &self,
        context: &mut Context,
        out: &mut String,
        column: &ColumnDef,
    ) where
        Self: Sized,
    {
        self.write_identifier_quoted(context, out, column.name());
        out.push(' ');
        if !column.column_type.is_empty() {
            out.push_str(column.column_type);
        } else {
            self.write_column_type(context, out, &column.value);
        }
        if column.auto_increment {
            self.write_column_auto_increment(context, out, column);
        }
        if !column.nullable && column.primary_key == PrimaryKeyType::None {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = column.default {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        if column.primary_key == PrimaryKeyType::PrimaryKey {
            // Composite primary keys are written after the columns
            self.write_column_primary_key(context, out, column);
        }
        if column.unique && column.primary_key != PrimaryKeyType::PrimaryKey {
            out.push_str(" UNIQUE");
        }
        if let Some(references) = column.references {
            out.push_str(" REFERENCES ");
            self.write_table_ref(context, out, &references.table());
            out.push('(');
            self.write_identifier_quoted(context, out, references.name);
            out.push(')');
            if let Some(on_delete) = &column.on_delete {
                out.push_str(" ON DELETE ");
                self.write_create_table_references_action(context, out, on_delete);
            }
            if let Some(on_update) = &column.on_update {
                out.push_str(" ON UPDATE ");
                self.write_create_table_references_action(context, out, on_update);
            }
        }
    }

    /// Emit the auto increment clause, right after the column type.
    fn write_column_auto_increment(
        &self,
        _context: &mut Context,
        out: &mut String,
        _column: &ColumnDef,
    ) {
        out.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }

    /// Emit the single column primary key clause.
    fn write_column_primary_key(
        &self,
        _context: &mut Context,
        out: &mut String,
        _column: &ColumnDef,
    ) {
        out.push_str(" PRIMARY KEY");
    }

    /// Emit referential action keyword.
    fn write_create_table_references_action(
        &self,
        _context: &mut Context,
        out: &mut String,
        action: &Action,
    ) {
        out.push_str(match action {
            Action::NoAction => "NO ACTION",
            Action::Restrict => "RESTRICT",
            Action::Cascade => "CASCADE",
            Action::SetNull => "SET NULL",
            Action::SetDefault => "SET DEFAULT",
        });
    }

    /// Emit DROP TABLE statement.
    fn write_drop_table<E>(&self, out: &mut String, if_exists: bool)
    where
        Self: Sized,
        E: Entity,
    {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("DROP TABLE ");
        let mut context = Context::new(Fragment::SqlDropTable, false);
        if if_exists {
            out.push_str("IF EXISTS ");
        }
        self.write_table_ref(&mut context, out, E::table_ref());
        out.push(';');
    }

    /// Emit `FROM` with the table, or a paginated subquery when the window has a page.
    fn write_from_window<E>(&self, context: &mut Context, out: &mut String, window: &Window)
    where
        Self: Sized,
        E: Entity,
    {
        out.push_str("\nFROM ");
        if window.is_paginated() {
            out.push_str("(SELECT * FROM ");
            self.write_table_ref(
                &mut context.switch_fragment(Fragment::SqlSelectFrom),
                out,
                E::table_ref(),
            );
            self.write_where(context, out, window);
            self.write_order_by(context, out, window);
            self.write_limit_offset(context, out, window);
            out.push_str(") AS ");
            self.write_identifier_quoted(context, out, E::table_ref().name);
        } else {
            self.write_table_ref(
                &mut context.switch_fragment(Fragment::SqlSelectFrom),
                out,
                E::table_ref(),
            );
            self.write_where(context, out, window);
        }
    }

    /// Emit SELECT of every column with WHERE, ORDER BY, LIMIT and OFFSET.
    fn write_select<E>(&self, out: &mut String, window: &Window)
    where
        Self: Sized,
        E: Entity,
    {
        out.reserve(128 + E::columns().len() * 32);
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlSelect, false);
        out.push_str("SELECT ");
        self.write_entity_columns::<E>(&mut context, out);
        out.push_str("\nFROM ");
        self.write_table_ref(
            &mut context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            E::table_ref(),
        );
        self.write_where(&mut context, out, window);
        self.write_order_by(&mut context, out, window);
        self.write_limit_offset(&mut context, out, window);
        out.push(';');
    }

    /// Emit `SELECT COUNT(*)` over the window.
    fn write_count<E>(&self, out: &mut String, window: &Window)
    where
        Self: Sized,
        E: Entity,
    {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlSelect, false);
        out.push_str("SELECT COUNT(*) AS ");
        self.write_identifier_quoted(&mut context, out, "_count");
        self.write_from_window::<E>(&mut context, out, window);
        out.push(';');
    }

    /// Emit one labeled aggregate per function over the window.
    fn write_aggregate<E>(&self, out: &mut String, functions: &[AggregateFn], window: &Window)
    where
        Self: Sized,
        E: Entity,
    {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlSelect, false);
        out.push_str("SELECT ");
        self.write_aggregate_functions(&mut context, out, functions);
        self.write_from_window::<E>(&mut context, out, window);
        out.push(';');
    }

    /// Emit `function AS "label"` for each aggregate.
    fn write_aggregate_functions(
        &self,
        context: &mut Context,
        out: &mut String,
        functions: &[AggregateFn],
    ) {
        separated_by(
            out,
            functions,
            |out, v| {
                v.write_query(self.as_dyn(), context, out);
                out.push_str(" AS ");
                self.write_identifier_quoted(context, out, &v.label());
            },
            ", ",
        );
    }

    /// Emit SELECT grouped by `by`, with HAVING, ORDER BY and pagination.
    fn write_group_by<E>(
        &self,
        out: &mut String,
        by: &[ColumnRef],
        functions: &[AggregateFn],
        having: Option<&crate::Condition>,
        window: &Window,
    ) where
        Self: Sized,
        E: Entity,
    {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut context = Context::new(Fragment::SqlSelect, false);
        out.push_str("SELECT ");
        separated_by(
            out,
            by,
            |out, v| self.write_column_ref(&mut context, out, v),
            ", ",
        );
        if !functions.is_empty() {
            out.push_str(", ");
            self.write_aggregate_functions(&mut context, out, functions);
        }
        out.push_str("\nFROM ");
        self.write_table_ref(
            &mut context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            E::table_ref(),
        );
        self.write_where(&mut context, out, window);
        out.push_str("\nGROUP BY ");
        let mut group_context = context.switch_fragment(Fragment::SqlSelectGroupBy);
        separated_by(
            out,
            by,
            |out, v| self.write_column_ref(&mut group_context, out, v),
            ", ",
        );
        if let Some(having) = having {
            out.push_str("\nHAVING ");
            having.write_query(
                self.as_dyn(),
                &mut context.switch_fragment(Fragment::SqlSelectHaving),
                out,
            );
        }
        self.write_order_by(&mut context, out, window);
        self.write_limit_offset(&mut context, out, window);
        out.push(';');
    }

    /// Emit INSERT for rows sharing the same column set.
    ///
    /// Rows without any column are inserted with `DEFAULT VALUES`, one row per statement.
    fn write_insert<E>(
        &self,
        out: &mut String,
        rows: &[RowFields],
        skip_duplicates: bool,
        returning: bool,
    ) where
        Self: Sized,
        E: Entity,
    {
        let Some(first) = rows.first() else {
            return;
        };
        out.reserve(128 + first.len() * 48 * rows.len());
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("INSERT INTO ");
        let mut context = Context::new(Fragment::SqlInsertInto, false);
        self.write_table_ref(&mut context, out, E::table_ref());
        if first.is_empty() {
            out.push_str(" DEFAULT VALUES");
        } else {
            out.push_str(" (");
            separated_by(
                out,
                first.iter(),
                |out, (name, _)| self.write_identifier_quoted(&mut context, out, name),
                ", ",
            );
            out.push_str(") VALUES\n");
            let mut context = context.switch_fragment(Fragment::SqlInsertIntoValues);
            separated_by(
                out,
                rows,
                |out, row| {
                    out.push('(');
                    separated_by(
                        out,
                        row.iter(),
                        |out, (_, value)| self.write_value(&mut context, out, value),
                        ", ",
                    );
                    out.push(')');
                },
                ",\n",
            );
        }
        if skip_duplicates {
            self.write_insert_on_conflict_do_nothing(
                &mut context.switch_fragment(Fragment::SqlInsertIntoOnConflict),
                out,
            );
        }
        if returning {
            self.write_returning::<E>(&mut context, out);
        }
        out.push(';');
    }

    /// Emit the clause ignoring rows that violate a unique constraint.
    fn write_insert_on_conflict_do_nothing(&self, _context: &mut Context, out: &mut String) {
        out.push_str("\nON CONFLICT DO NOTHING");
    }

    /// Emit UPDATE with the assignments of `data` on the rows matching `filter`.
    fn write_update<E>(
        &self,
        out: &mut String,
        data: &UpdateData,
        filter: &crate::Condition,
        returning: bool,
    ) where
        Self: Sized,
        E: Entity,
    {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("UPDATE ");
        let mut context = Context::new(Fragment::SqlUpdate, false);
        self.write_table_ref(&mut context, out, E::table_ref());
        out.push_str(" SET\n");
        let mut set_context = context.switch_fragment(Fragment::SqlUpdateSet);
        separated_by(
            out,
            data.fields.iter(),
            |out, (column, update)| {
                self.write_identifier_quoted(&mut set_context, out, column.name);
                out.push_str(" = ");
                let (op, value) = match update {
                    FieldUpdate::Set(value) => {
                        self.write_value(&mut set_context, out, value);
                        return;
                    }
                    FieldUpdate::Increment(v) => (BinaryOpType::Addition, v),
                    FieldUpdate::Decrement(v) => (BinaryOpType::Subtraction, v),
                    FieldUpdate::Multiply(v) => (BinaryOpType::Multiplication, v),
                    FieldUpdate::Divide(v) => (BinaryOpType::Division, v),
                };
                BinaryOp {
                    op,
                    lhs: Operand::Column(*column),
                    rhs: Operand::Variable(value.clone()),
                }
                .write_query(self.as_dyn(), &mut set_context, out);
            },
            ",\n",
        );
        out.push_str("\nWHERE ");
        filter.write_query(self.as_dyn(), &mut context, out);
        if returning {
            self.write_returning::<E>(&mut context, out);
        }
        out.push(';');
    }

    /// Emit DELETE with WHERE clause.
    fn write_delete<E>(&self, out: &mut String, filter: &crate::Condition, returning: bool)
    where
        Self: Sized,
        E: Entity,
    {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("DELETE FROM ");
        let mut context = Context::new(Fragment::SqlDeleteFrom, false);
        self.write_table_ref(&mut context, out, E::table_ref());
        out.push_str("\nWHERE ");
        filter.write_query(self.as_dyn(), &mut context, out);
        if returning {
            self.write_returning::<E>(&mut context, out);
        }
        out.push(';');
    }
}

/// Fallback generic SQL writer (closest to PostgreSQL conventions).
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
