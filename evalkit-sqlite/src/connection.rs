use crate::{
    CBox, SqliteDriver, SqlitePrepared, SqliteTransaction, engine_error, engine_error_within,
    error_message_from_ptr,
    extract::{extract_name, extract_value},
    prepared::statement_sql,
};
use async_stream::try_stream;
use evalkit_core::{
    ClientError, Connection, Driver, Error, ErrorContext, Executor, IsolationLevel, Query,
    QueryResult, Result, Row, RowLabeled, RowNames, RowsAffected, TRANSACTION_API_ERROR,
    TransactionOptions, future::Either, stream::Stream, truncate_long,
};
use libsqlite3_sys::{
    SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_MEMORY, SQLITE_OPEN_READONLY,
    SQLITE_OPEN_READWRITE, SQLITE_ROW, sqlite3, sqlite3_bind_parameter_count,
    sqlite3_busy_timeout, sqlite3_changes64, sqlite3_close, sqlite3_column_count, sqlite3_errmsg,
    sqlite3_extended_result_codes, sqlite3_finalize, sqlite3_last_insert_rowid, sqlite3_open_v2,
    sqlite3_prepare_v2, sqlite3_step, sqlite3_stmt, sqlite3_stmt_readonly,
    sqlite3_total_changes64,
};
use std::{
    ffi::{CString, c_char, c_int},
    future::Future,
    ptr,
    time::Instant,
};
use tokio::task::spawn_blocking;
use url::form_urlencoded;

const BUSY_TIMEOUT_MS: c_int = 5_000;

#[derive(Debug)]
pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
    /// Set while a transaction is beginning or open, bounds the time spent waiting for locks.
    pub(crate) deadline: Option<Instant>,
}

fn initialization(message: String) -> Error {
    let error = ClientError::Initialization(message);
    log::error!("{}", error);
    error.into()
}

/// Compiles the first statement in `sql`, returns it together with the number of bytes consumed.
/// The statement is null when `sql` holds only whitespace or comments.
fn prepare_next(
    connection: *mut sqlite3,
    sql: &[u8],
) -> Result<(CBox<*mut sqlite3_stmt>, usize)> {
    unsafe {
        let mut statement = CBox::new(ptr::null_mut(), |p| {
            sqlite3_finalize(p);
        });
        let head = sql.as_ptr() as *const c_char;
        let mut tail: *const c_char = ptr::null();
        let rc = sqlite3_prepare_v2(
            connection,
            head,
            sql.len() as c_int,
            &mut *statement,
            &mut tail,
        );
        if rc != SQLITE_OK {
            return Err(engine_error(connection));
        }
        let consumed = if tail.is_null() {
            sql.len()
        } else {
            tail.offset_from(head) as usize
        };
        Ok((statement, consumed))
    }
}

/// Limits the busy handler to what is left before `deadline`, or to the
/// default wait outside transactions.
fn arm_busy_timeout(connection: *mut sqlite3, deadline: Option<Instant>) -> Result<()> {
    let millis = match deadline {
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                let error = ClientError::known(
                    TRANSACTION_API_ERROR,
                    "Transaction already closed: the deadline expired",
                );
                log::error!("{}", error);
                return Err(error.into());
            }
            remaining.as_millis().clamp(1, c_int::MAX as u128) as c_int
        }
        None => BUSY_TIMEOUT_MS,
    };
    unsafe {
        sqlite3_busy_timeout(connection, millis);
    }
    Ok(())
}

/// Steps the statement to completion. Writes end with the rows they changed.
fn run_statement<'s>(
    connection: &'s CBox<*mut sqlite3>,
    statement: CBox<*mut sqlite3_stmt>,
    deadline: Option<Instant>,
) -> impl Stream<Item = Result<QueryResult>> + Send + 's {
    try_stream! {
        let count = unsafe { sqlite3_column_count(*statement) };
        let labels: RowNames = (0..count).map(|i| extract_name(*statement, i)).collect();
        let readonly = unsafe { sqlite3_stmt_readonly(*statement) } != 0;
        let before = unsafe { sqlite3_total_changes64(**connection) };
        loop {
            arm_busy_timeout(**connection, deadline)?;
            let rc = unsafe { sqlite3_step(*statement) };
            if rc == SQLITE_ROW {
                let values = (0..count)
                    .map(|i| extract_value(*statement, i))
                    .collect::<Result<Row>>()?;
                yield QueryResult::Row(RowLabeled::new(labels.clone(), values));
            } else if rc == SQLITE_DONE {
                break;
            } else {
                let error = engine_error_within(**connection, deadline.is_some()).context(
                    format!("While executing:\n{}", truncate_long!(statement_sql(*statement))),
                );
                Err::<(), Error>(error)?;
            }
        }
        if !readonly {
            let changed = unsafe { sqlite3_total_changes64(**connection) } != before;
            let (rows_affected, last_id) = if changed {
                unsafe {
                    (
                        sqlite3_changes64(**connection) as u64,
                        sqlite3_last_insert_rowid(**connection),
                    )
                }
            } else {
                (0, 0)
            };
            yield QueryResult::Affected(RowsAffected {
                rows_affected,
                last_affected_id: (last_id != 0).then_some(last_id),
            });
        }
    }
}

/// Runs every statement of `sql` in order.
fn run_script<'s>(
    connection: &'s CBox<*mut sqlite3>,
    sql: String,
    deadline: Option<Instant>,
) -> impl Stream<Item = Result<QueryResult>> + Send + 's {
    try_stream! {
        let mut offset = 0;
        while offset < sql.len() {
            let (statement, consumed) = prepare_next(**connection, &sql.as_bytes()[offset..])
                .with_context(|| format!("While preparing:\n{}", truncate_long!(sql)))?;
            if consumed == 0 {
                break;
            }
            offset += consumed;
            if statement.is_null() {
                continue;
            }
            if unsafe { sqlite3_bind_parameter_count(*statement) } > 0 {
                let error = ClientError::Validation(format!(
                    "The statement has parameters but no values were given:\n{}",
                    truncate_long!(statement_sql(*statement))
                ));
                log::error!("{}", error);
                Err::<(), Error>(error.into())?;
            }
            for await result in run_statement(connection, statement, deadline) {
                yield result?;
            }
        }
    }
}

impl Executor for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &SqliteDriver {
        &SqliteDriver
    }

    async fn prepare(&mut self, query: String) -> Result<Query<SqliteDriver>> {
        let context = || format!("While preparing the query:\n{}", truncate_long!(query));
        let (statement, consumed) =
            prepare_next(*self.connection, query.as_bytes()).with_context(context)?;
        if statement.is_null() {
            let error = Error::msg("Cannot prepare an empty statement").context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        if !query.as_bytes()[consumed..]
            .iter()
            .all(u8::is_ascii_whitespace)
        {
            let error =
                Error::msg("Cannot prepare more than one statement at a time").context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(Query::Prepared(SqlitePrepared::new(statement)))
    }

    fn run(
        &mut self,
        query: Query<SqliteDriver>,
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        let deadline = self.deadline;
        match query {
            Query::Raw(sql) => Either::Left(run_script(&self.connection, sql, deadline)),
            Query::Prepared(prepared) => {
                Either::Right(run_statement(&self.connection, prepared.statement, deadline))
            }
        }
    }
}

impl Connection for SqliteConnection {
    /// `sqlite://<path>[?mode=ro|rw|rwc|memory]`, the path may be `:memory:`.
    async fn connect(url: &str) -> Result<SqliteConnection> {
        let prefix = format!("{}://", SqliteDriver::NAME);
        let Some(location) = url.strip_prefix(&prefix) else {
            return Err(initialization(format!(
                "Expected the sqlite connection URL to start with `{}`, found `{}`",
                prefix, url
            )));
        };
        let (path, parameters) = location.split_once('?').unwrap_or((location, ""));
        let path = urlencoding::decode(path)
            .map_err(|e| initialization(format!("Cannot decode the path of `{}`: {}", url, e)))?
            .into_owned();
        if path.is_empty() {
            return Err(initialization(format!(
                "The sqlite connection URL `{}` has no path",
                url
            )));
        }
        let mut flags = SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE;
        for (key, value) in form_urlencoded::parse(parameters.as_bytes()) {
            match key.as_ref() {
                "mode" => {
                    flags = match value.as_ref() {
                        "ro" => SQLITE_OPEN_READONLY,
                        "rw" => SQLITE_OPEN_READWRITE,
                        "rwc" => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                        "memory" => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_MEMORY,
                        other => {
                            return Err(initialization(format!(
                                "Unknown sqlite mode `{}`, expected one of ro, rw, rwc, memory",
                                other
                            )));
                        }
                    }
                }
                other => log::warn!("Ignoring the unknown sqlite parameter `{}`", other),
            }
        }
        let filename = CString::new(path.as_str())
            .map_err(|e| initialization(format!("Invalid sqlite path `{}`: {}", path, e)))?;
        let connection = spawn_blocking(move || unsafe {
            let mut connection = CBox::new(ptr::null_mut(), |p| {
                sqlite3_close(p);
            });
            let rc = sqlite3_open_v2(filename.as_ptr(), &mut *connection, flags, ptr::null());
            if rc != SQLITE_OK {
                let message = if connection.is_null() {
                    "out of memory".to_string()
                } else {
                    error_message_from_ptr(sqlite3_errmsg(*connection)).to_string()
                };
                return Err(initialization(format!(
                    "Cannot open the database `{}`: {}",
                    path, message
                )));
            }
            sqlite3_extended_result_codes(*connection, 1);
            sqlite3_busy_timeout(*connection, BUSY_TIMEOUT_MS);
            Ok(connection)
        })
        .await
        .context("The task opening the database did not complete")??;
        let mut result = Self {
            connection,
            deadline: None,
        };
        result
            .execute("PRAGMA foreign_keys = ON;".into())
            .await
            .context("While enabling foreign keys")?;
        Ok(result)
    }

    /// Only serializable transactions exist in SQLite. Waiting for the write
    /// lock is bounded by `max_wait`, the statements that follow by `timeout`.
    fn begin<'c>(
        &'c mut self,
        options: &TransactionOptions,
    ) -> impl Future<Output = Result<SqliteTransaction<'c>>> + Send {
        let options = *options;
        async move {
            if let Some(level) = options.isolation_level
                && level != IsolationLevel::Serializable
            {
                let error = ClientError::Validation(format!(
                    "SQLite does not support the {} isolation level",
                    level
                ));
                log::error!("{}", error);
                return Err(error.into());
            }
            SqliteTransaction::new(self, &options).await
        }
    }
}
