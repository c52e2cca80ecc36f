use crate::{
    ClientOptions,
    schema::{
        Admin, Evaluation, EvaluationResponse, Instructor, InstructorSubject, Question, Student,
        StudentSubject, Subject, drop_schema, push_schema,
    },
};
use evalkit_core::{
    ClientError, Connection, Delegate, Driver, Entity, Error, ErrorContext, Executor, Result,
    RowLabeled, TRANSACTION_API_ERROR, Transaction, TransactionOptions, Value,
    future::BoxFuture,
};
use std::future::Future;
use tokio::time::timeout;

macro_rules! model_accessors {
    ($($method:ident => $model:ident),* $(,)?) => {
        $(
            #[doc = concat!("Operations on `", stringify!($model), "` records.")]
            fn $method(&mut self) -> Delegate<'_, $model, Self::Executor> {
                self.delegate::<$model>()
            }
        )*
    };
}

/// Where delegates and raw statements run: the client connection or an open transaction.
pub trait Scope: Send {
    type Executor: Executor;

    fn executor(&mut self) -> &mut Self::Executor;

    fn log_queries(&self) -> bool;

    fn delegate<E: Entity>(&mut self) -> Delegate<'_, E, Self::Executor> {
        let log_queries = self.log_queries();
        Delegate::new(self.executor(), log_queries)
    }

    model_accessors! {
        student => Student,
        instructor => Instructor,
        admin => Admin,
        subject => Subject,
        student_subject => StudentSubject,
        instructor_subject => InstructorSubject,
        question => Question,
        evaluation => Evaluation,
        evaluation_response => EvaluationResponse,
    }

    /// Run raw SQL, `?` placeholders are bound to `params` in order.
    fn execute_raw(
        &mut self,
        sql: &str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<u64>> + Send {
        let log_queries = self.log_queries();
        evalkit_core::execute_raw(self.executor(), sql, params, log_queries)
    }

    /// Run a raw query and return its rows.
    fn query_raw(
        &mut self,
        sql: &str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Vec<RowLabeled>>> + Send {
        let log_queries = self.log_queries();
        evalkit_core::query_raw(self.executor(), sql, params, log_queries)
    }
}

/// Typed entry point to the evaluation database.
///
/// ```rust,ignore
/// let options = ClientOptions::new("sqlite://evaluations.sqlite?mode=rwc")?;
/// let mut client = Client::<SqliteConnection>::connect(options).await?;
/// client.push_schema().await?;
/// let student = client.student().create(&Student::new("S-001", "Ada", "hash")).await?;
/// ```
pub struct Client<C: Connection> {
    connection: C,
    options: ClientOptions,
}

impl<C: Connection> Client<C> {
    pub async fn connect(options: ClientOptions) -> Result<Self> {
        let expected = <C::Driver as Driver>::NAME;
        if !options.scheme().eq_ignore_ascii_case(expected) {
            let error = ClientError::Initialization(format!(
                "The URL `{}` is not a `{}` database",
                options.url, expected
            ));
            log::error!("{}", error);
            return Err(error.into());
        }
        let connection = C::connect(&options.url)
            .await
            .with_context(|| format!("While connecting to `{}`", options.url))?;
        Ok(Self::new(connection, options))
    }

    pub fn new(connection: C, options: ClientOptions) -> Self {
        Self {
            connection,
            options,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Run the statements in order inside one transaction, returns the rows affected by each.
    pub async fn batch<S: AsRef<str>>(
        &mut self,
        statements: impl IntoIterator<Item = S>,
    ) -> Result<Vec<u64>> {
        let statements: Vec<String> = statements
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        let log_queries = self.options.log_queries;
        let transaction_options = self.options.transaction;
        let mut transaction = self.connection.begin(&transaction_options).await?;
        let mut result = Vec::with_capacity(statements.len());
        for (i, sql) in statements.iter().enumerate() {
            match evalkit_core::execute_raw(&mut transaction, sql, Vec::new(), log_queries).await
            {
                Ok(affected) => result.push(affected),
                Err(error) => {
                    log::warn!("Batch statement {} failed, rolling back", i);
                    rollback_quietly(transaction).await;
                    return Err(error.context(format!("While running batch statement {}", i)));
                }
            }
        }
        transaction.commit().await?;
        Ok(result)
    }

    /// Interactive transaction: `callback` receives a scope bound to the
    /// transaction, `Ok` commits and `Err` rolls back.
    ///
    /// Beginning may take at most `max_wait` and the callback at most
    /// `timeout`, expiry rolls back and fails with `P2028`. `None` uses the
    /// client defaults.
    ///
    /// ```rust,ignore
    /// client
    ///     .transaction(None, |tx| {
    ///         async move {
    ///             let student = tx.student().create(&student).await?;
    ///             tx.student_subject().create(&enrollment).await?;
    ///             Ok(student)
    ///         }
    ///         .boxed()
    ///     })
    ///     .await?;
    /// ```
    pub async fn transaction<'c, R, F>(
        &'c mut self,
        options: Option<TransactionOptions>,
        callback: F,
    ) -> Result<R>
    where
        R: Send,
        F: for<'t> FnOnce(
                &'t mut TransactionClient<<C::Driver as Driver>::Transaction<'c>>,
            ) -> BoxFuture<'t, Result<R>>
            + Send,
    {
        let options = options.unwrap_or(self.options.transaction);
        let log_queries = self.options.log_queries;
        let transaction = match timeout(options.max_wait, self.connection.begin(&options)).await {
            Ok(transaction) => transaction?,
            Err(..) => {
                return Err(expired(format!(
                    "Unable to start a transaction in the given time ({} ms)",
                    options.max_wait.as_millis()
                )));
            }
        };
        let mut client = TransactionClient {
            transaction,
            log_queries,
        };
        let outcome = timeout(options.timeout, callback(&mut client)).await;
        match outcome {
            Ok(Ok(value)) => {
                client
                    .transaction
                    .commit()
                    .await
                    .context("While committing the transaction")?;
                Ok(value)
            }
            Ok(Err(error)) => {
                log::warn!("Transaction rolled back: {:#}", error);
                rollback_quietly(client.transaction).await;
                Err(error)
            }
            Err(..) => {
                let error = expired(format!(
                    "Transaction already closed: the timeout of {} ms expired",
                    options.timeout.as_millis()
                ));
                rollback_quietly(client.transaction).await;
                Err(error)
            }
        }
    }

    /// Create every table that does not exist yet, referenced tables first.
    pub async fn push_schema(&mut self) -> Result<()> {
        push_schema(&mut self.connection).await
    }

    /// Drop and recreate every table.
    pub async fn reset_schema(&mut self) -> Result<()> {
        drop_schema(&mut self.connection).await?;
        push_schema(&mut self.connection).await
    }

    pub async fn disconnect(self) -> Result<()> {
        self.connection.disconnect().await
    }
}

impl<C: Connection> Scope for Client<C> {
    type Executor = C;

    fn executor(&mut self) -> &mut C {
        &mut self.connection
    }

    fn log_queries(&self) -> bool {
        self.options.log_queries
    }
}

/// Scope handed to the callback of [`Client::transaction`].
pub struct TransactionClient<T: Executor> {
    transaction: T,
    log_queries: bool,
}

impl<T: Executor> Scope for TransactionClient<T> {
    type Executor = T;

    fn executor(&mut self) -> &mut T {
        &mut self.transaction
    }

    fn log_queries(&self) -> bool {
        self.log_queries
    }
}

fn expired(message: String) -> Error {
    let error = ClientError::known(TRANSACTION_API_ERROR, message);
    log::warn!("{}", error);
    error.into()
}

async fn rollback_quietly<'c, T: Transaction<'c>>(transaction: T) {
    if let Err(error) = transaction.rollback().await {
        log::error!("Rollback failed: {:#}", error);
    }
}
