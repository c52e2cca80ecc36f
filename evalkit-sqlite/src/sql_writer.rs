use evalkit_core::{ColumnDef, Context, IsolationLevel, SqlWriter, Value, Window};
use std::fmt::Write;

/// SQLite dialect: dynamic column types, `AUTOINCREMENT` primary keys,
/// timestamps stored as text with a space separator.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter;

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_column_type(&self, _context: &mut Context, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..)
            | Value::Int8(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::Int64(..)
            | Value::UInt8(..)
            | Value::UInt16(..)
            | Value::UInt32(..)
            | Value::UInt64(..) => out.push_str("INTEGER"),
            Value::Float32(..) | Value::Float64(..) => out.push_str("REAL"),
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Null
            | Value::Varchar(..)
            | Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..) => out.push_str("TEXT"),
        }
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push(if value { '1' } else { '0' });
    }

    fn write_value_non_finite(&self, context: &mut Context, out: &mut String, value: f64) {
        if value.is_nan() {
            return self.write_value_none(context, out);
        }
        if value.is_sign_negative() {
            out.push('-');
        }
        out.push_str("9e999");
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    fn value_timestamp_separator(&self) -> char {
        ' '
    }

    /// The key clause carries `AUTOINCREMENT`, there is no identity clause.
    fn write_column_auto_increment(
        &self,
        _context: &mut Context,
        _out: &mut String,
        _column: &ColumnDef,
    ) {
    }

    fn write_column_primary_key(&self, _context: &mut Context, out: &mut String, column: &ColumnDef) {
        out.push_str(" PRIMARY KEY");
        if column.auto_increment {
            out.push_str(" AUTOINCREMENT");
        }
    }

    /// `OFFSET` is only valid after a `LIMIT`, `-1` means no limit.
    fn write_limit_offset(&self, _context: &mut Context, out: &mut String, window: &Window) {
        match (window.take, window.skip) {
            (Some(take), skip) => {
                let _ = write!(out, "\nLIMIT {}", take);
                if let Some(skip) = skip {
                    let _ = write!(out, "\nOFFSET {}", skip);
                }
            }
            (None, Some(skip)) => {
                let _ = write!(out, "\nLIMIT -1\nOFFSET {}", skip);
            }
            (None, None) => {}
        }
    }

    /// Transactions are always serializable. The write lock is taken when the
    /// transaction begins, so waiting for it happens inside `max_wait`.
    fn write_transaction_begin(&self, out: &mut String, _isolation_level: Option<IsolationLevel>) {
        out.push_str("BEGIN IMMEDIATE;");
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteSqlWriter;
    use evalkit_core::{Context, IsolationLevel, SqlWriter, Value, Window};
    use time::macros::datetime;

    #[test]
    fn literals() {
        let writer = SqliteSqlWriter;
        let mut context = Context::default();
        let mut out = String::new();
        writer.write_value(
            &mut context,
            &mut out,
            &Value::Timestamp(Some(datetime!(2025-03-01 08:30:00))),
        );
        assert_eq!(out, "'2025-03-01 08:30:00'");
        out.clear();
        writer.write_value(&mut context, &mut out, &Value::Blob(Some([1u8, 171].into())));
        assert_eq!(out, "X'01AB'");
        out.clear();
        writer.write_value(&mut context, &mut out, &Value::Boolean(Some(true)));
        assert_eq!(out, "1");
        out.clear();
        writer.write_value(&mut context, &mut out, &Value::Float64(Some(f64::NEG_INFINITY)));
        assert_eq!(out, "-9e999");
        out.clear();
        writer.write_value(&mut context, &mut out, &Value::Float32(Some(f32::NAN)));
        assert_eq!(out, "NULL");
    }

    #[test]
    fn offset_without_limit() {
        let writer = SqliteSqlWriter;
        let mut out = String::new();
        let window = Window {
            filter: None,
            order_by: &[],
            skip: Some(3),
            take: None,
        };
        writer.write_limit_offset(&mut Context::default(), &mut out, &window);
        assert_eq!(out, "\nLIMIT -1\nOFFSET 3");
    }

    #[test]
    fn begin_ignores_isolation() {
        let mut out = String::new();
        SqliteSqlWriter.write_transaction_begin(&mut out, Some(IsolationLevel::Serializable));
        assert_eq!(out, "BEGIN IMMEDIATE;");
    }
}
