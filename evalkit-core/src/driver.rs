use crate::{Connection, Prepared, SqlWriter, Transaction};

/// Engine binding: connection, dialect, prepared statement and transaction types.
pub trait Driver: Send + Sync + Sized + 'static {
    type Connection: Connection<Driver = Self>;
    type SqlWriter: SqlWriter;
    type Prepared: Prepared;
    type Transaction<'c>: Transaction<'c, Driver = Self>;

    /// URL scheme, `sqlite` for `sqlite://...`.
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;
}
