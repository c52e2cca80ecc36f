use crate::{ClientError, Error, Executor, Result};
use std::{fmt, future::Future, str::FromStr, time::Duration};

/// An open transaction, dropped without `commit` it is rolled back by the driver.
pub trait Transaction<'c>: Executor {
    fn commit(self) -> impl Future<Output = Result<()>> + Send;
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IsolationLevel::ReadUncommitted => "ReadUncommitted",
            IsolationLevel::ReadCommitted => "ReadCommitted",
            IsolationLevel::RepeatableRead => "RepeatableRead",
            IsolationLevel::Serializable => "Serializable",
        })
    }
}

impl FromStr for IsolationLevel {
    type Err = Error;

    /// Accepts both `ReadCommitted` and `read committed` spellings.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(match normalized.as_str() {
            "readuncommitted" => IsolationLevel::ReadUncommitted,
            "readcommitted" => IsolationLevel::ReadCommitted,
            "repeatableread" => IsolationLevel::RepeatableRead,
            "serializable" => IsolationLevel::Serializable,
            _ => {
                return Err(ClientError::Validation(format!(
                    "Unknown isolation level `{}`",
                    s
                ))
                .into());
            }
        })
    }
}

/// Limits and isolation of an interactive transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Time allowed to acquire the engine and begin.
    pub max_wait: Duration,
    /// Time allowed to the transaction body before it is rolled back.
    pub timeout: Duration,
    /// `None` keeps the engine default.
    pub isolation_level: Option<IsolationLevel>,
}

impl TransactionOptions {
    pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(2);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn isolation_level(mut self, isolation_level: IsolationLevel) -> Self {
        self.isolation_level = Some(isolation_level);
        self
    }
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_wait: Self::DEFAULT_MAX_WAIT,
            timeout: Self::DEFAULT_TIMEOUT,
            isolation_level: None,
        }
    }
}
