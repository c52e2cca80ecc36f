use crate::{CBox, SqliteSqlWriter, error_message_from_ptr};
use evalkit_core::{
    ClientError, Context, Error, Prepared, Result, SqlWriter, Value, truncate_long,
};
use libsqlite3_sys::{
    SQLITE_OK, SQLITE_TRANSIENT, sqlite3_bind_blob, sqlite3_bind_double, sqlite3_bind_int64,
    sqlite3_bind_null, sqlite3_bind_parameter_count, sqlite3_bind_text, sqlite3_clear_bindings,
    sqlite3_db_handle, sqlite3_errmsg, sqlite3_int64, sqlite3_sql, sqlite3_stmt,
};
use std::{
    ffi::{CStr, c_char, c_int, c_void},
    fmt::{self, Display},
};

/// Single statement with positional `?` parameters.
pub struct SqlitePrepared {
    pub(crate) statement: CBox<*mut sqlite3_stmt>,
    /// Next parameter, from 0.
    pub(crate) index: u64,
}

impl SqlitePrepared {
    pub(crate) fn new(statement: CBox<*mut sqlite3_stmt>) -> Self {
        Self {
            statement,
            index: 0,
        }
    }

    fn bind_text(&self, index: c_int, text: &str) -> c_int {
        unsafe {
            sqlite3_bind_text(
                *self.statement,
                index,
                text.as_ptr() as *const c_char,
                text.len() as c_int,
                SQLITE_TRANSIENT(),
            )
        }
    }

    fn sql(&self) -> String {
        statement_sql(*self.statement)
    }
}

pub(crate) fn statement_sql(statement: *mut sqlite3_stmt) -> String {
    unsafe {
        let sql = sqlite3_sql(statement);
        if sql.is_null() {
            String::new()
        } else {
            CStr::from_ptr(sql).to_string_lossy().into_owned()
        }
    }
}

/// Temporal values are stored as the same text the dialect writes in literals.
fn temporal_text(value: &Value) -> String {
    let mut out = String::new();
    SqliteSqlWriter.write_value(&mut Context::default(), &mut out, value);
    out.trim_matches('\'').to_string()
}

impl Prepared for SqlitePrepared {
    fn bind_value(&mut self, value: Value) -> Result<&mut Self> {
        let index = self.index;
        self.bind_value_index(value, index)
    }

    fn bind_value_index(&mut self, value: Value, index: u64) -> Result<&mut Self> {
        let count = self.parameters();
        if index >= count {
            let error = ClientError::Validation(format!(
                "Cannot bind parameter {}, the query has {} parameters:\n{}",
                index,
                count,
                truncate_long!(self.sql())
            ));
            log::error!("{}", error);
            return Err(error.into());
        }
        let position = index as c_int + 1;
        let integer = |v: i64| unsafe { sqlite3_bind_int64(*self.statement, position, v) };
        let rc = match &value {
            v if v.is_null() => unsafe { sqlite3_bind_null(*self.statement, position) },
            Value::Boolean(Some(v)) => integer(*v as i64),
            Value::Int8(Some(v)) => integer(*v as i64),
            Value::Int16(Some(v)) => integer(*v as i64),
            Value::Int32(Some(v)) => integer(*v as i64),
            Value::Int64(Some(v)) => integer(*v),
            Value::UInt8(Some(v)) => integer(*v as i64),
            Value::UInt16(Some(v)) => integer(*v as i64),
            Value::UInt32(Some(v)) => integer(*v as i64),
            Value::UInt64(Some(v)) => {
                let Ok(v) = sqlite3_int64::try_from(*v) else {
                    let error = Error::msg(format!(
                        "Cannot bind the value {} into a sqlite integer, it is out of bounds",
                        v
                    ));
                    log::error!("{}", error);
                    return Err(error);
                };
                integer(v)
            }
            Value::Float32(Some(v)) => unsafe {
                sqlite3_bind_double(*self.statement, position, *v as f64)
            },
            Value::Float64(Some(v)) => unsafe {
                sqlite3_bind_double(*self.statement, position, *v)
            },
            Value::Varchar(Some(v)) => self.bind_text(position, v),
            Value::Blob(Some(v)) => unsafe {
                sqlite3_bind_blob(
                    *self.statement,
                    position,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                )
            },
            Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..) => {
                let text = temporal_text(&value);
                self.bind_text(position, &text)
            }
            _ => {
                let error = Error::msg(format!("Cannot use {:?} as a query parameter", value));
                log::error!("{}", error);
                return Err(error);
            }
        };
        if rc != SQLITE_OK {
            let message = unsafe {
                error_message_from_ptr(sqlite3_errmsg(sqlite3_db_handle(*self.statement)))
                    .to_string()
            };
            let error = Error::msg(message).context(format!(
                "Cannot bind parameter {} to query:\n{}",
                index,
                truncate_long!(self.sql())
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        self.index = index + 1;
        Ok(self)
    }

    fn clear_bindings(&mut self) -> Result<&mut Self> {
        unsafe {
            sqlite3_clear_bindings(*self.statement);
        }
        self.index = 0;
        Ok(self)
    }

    fn parameters(&self) -> u64 {
        unsafe { sqlite3_bind_parameter_count(*self.statement) as u64 }
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&truncate_long!(self.sql()))
    }
}
