use crate::{Driver, Executor, Result, TransactionOptions};
use std::future::Future;

pub trait Connection: Executor {
    /// Open a connection to the given URL.
    fn connect(url: &str) -> impl Future<Output = Result<Self>> + Send;

    /// Start a transaction borrowing the connection until it is committed or rolled back.
    fn begin<'c>(
        &'c mut self,
        options: &TransactionOptions,
    ) -> impl Future<Output = Result<<Self::Driver as Driver>::Transaction<'c>>> + Send;

    /// Close the connection.
    fn disconnect(self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}
