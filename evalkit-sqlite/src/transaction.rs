use crate::{SqliteConnection, SqliteDriver};
use evalkit_core::{
    Driver, ErrorContext, Executor, Query, QueryResult, Result, SqlWriter, Transaction,
    TransactionOptions, stream::Stream,
};
use libsqlite3_sys::{sqlite3_exec, sqlite3_get_autocommit};
use std::{future::Future, ptr, time::Instant};

/// Open transaction, rolled back on drop unless committed or rolled back explicitly.
pub struct SqliteTransaction<'c> {
    connection: &'c mut SqliteConnection,
    finished: bool,
}

impl<'c> SqliteTransaction<'c> {
    pub(crate) async fn new(
        connection: &'c mut SqliteConnection,
        options: &TransactionOptions,
    ) -> Result<Self> {
        let mut sql = String::new();
        connection
            .driver()
            .sql_writer()
            .write_transaction_begin(&mut sql, None);
        connection.deadline = Instant::now().checked_add(options.max_wait);
        let begun = connection
            .execute(sql.into())
            .await
            .context("While beginning a transaction");
        if let Err(error) = begun {
            connection.deadline = None;
            return Err(error);
        }
        connection.deadline = Instant::now().checked_add(options.timeout);
        Ok(Self {
            connection,
            finished: false,
        })
    }

    async fn finish(&mut self, commit: bool) -> Result<()> {
        self.connection.deadline = None;
        let mut sql = String::new();
        let writer = self.connection.driver().sql_writer();
        if commit {
            writer.write_transaction_commit(&mut sql);
        } else {
            writer.write_transaction_rollback(&mut sql);
        }
        self.connection.execute(sql.into()).await?;
        self.finished = true;
        Ok(())
    }
}

impl<'c> Executor for SqliteTransaction<'c> {
    type Driver = SqliteDriver;

    fn driver(&self) -> &SqliteDriver {
        self.connection.driver()
    }

    fn prepare(
        &mut self,
        query: String,
    ) -> impl Future<Output = Result<Query<SqliteDriver>>> + Send {
        self.connection.prepare(query)
    }

    fn run(
        &mut self,
        query: Query<SqliteDriver>,
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        self.connection.run(query)
    }
}

impl<'c> Transaction<'c> for SqliteTransaction<'c> {
    fn commit(mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.finish(true)
                .await
                .context("While committing the transaction")
        }
    }

    fn rollback(mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.finish(false)
                .await
                .context("While rolling back the transaction")
        }
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        self.connection.deadline = None;
        if self.finished {
            return;
        }
        unsafe {
            let connection = *self.connection.connection;
            if sqlite3_get_autocommit(connection) != 0 {
                return;
            }
            sqlite3_exec(
                connection,
                c"ROLLBACK;".as_ptr(),
                None,
                ptr::null_mut(),
                ptr::null_mut(),
            );
        }
        log::warn!("Transaction dropped while still open, it was rolled back");
    }
}
