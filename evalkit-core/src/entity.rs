use crate::{
    ColumnDef, ColumnRef, Driver, Executor, Result, RowFields, RowLabeled, SqlWriter, TableRef,
    UniqueWhere, log_query,
};
use std::future::Future;

/// A model mapped to a table, implemented by `#[derive(Entity)]`.
///
/// The static metadata (`table_ref`, `columns`, keys) drives the SQL writer,
/// the row codecs (`from_row`, `row_filtered`, `row_full`) move records in and
/// out of the engine.
pub trait Entity: Send + Sync + Sized + 'static {
    /// Primary and unique key selector, `<Model>Unique`.
    type Unique: UniqueWhere;

    fn table_ref() -> &'static TableRef;

    /// Every column, in declaration order.
    fn columns() -> &'static [ColumnDef];

    fn primary_key_def() -> &'static [&'static ColumnDef];

    /// Composite unique constraints, single column ones are flagged on the column.
    fn unique_defs() -> &'static [Box<[&'static ColumnDef]>];

    /// Decode a row, columns are matched by label.
    fn from_row(row: RowLabeled) -> Result<Self>;

    /// Column values, leaving out passive fields that are not set.
    fn row_filtered(&self) -> RowFields;

    /// Every column value.
    fn row_full(&self) -> RowFields;

    /// Selector of this record through its primary key, fails when the key is not set.
    fn unique_key(&self) -> Result<Self::Unique>;

    fn model_name() -> &'static str {
        Self::table_ref().name
    }

    fn column_def(column: &ColumnRef) -> Option<&'static ColumnDef> {
        Self::columns().iter().find(|c| c.column_ref == *column)
    }

    fn has_column(column: &ColumnRef) -> bool {
        Self::column_def(column).is_some()
    }

    fn create_table<Exec: Executor>(
        executor: &mut Exec,
        if_not_exists: bool,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let mut query = String::with_capacity(512);
            executor
                .driver()
                .sql_writer()
                .write_create_table::<Self>(&mut query, if_not_exists);
            log_query(true, &query);
            executor.execute(query.into()).await.map(|_| ())
        }
    }

    fn drop_table<Exec: Executor>(
        executor: &mut Exec,
        if_exists: bool,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let mut query = String::with_capacity(64);
            executor
                .driver()
                .sql_writer()
                .write_drop_table::<Self>(&mut query, if_exists);
            log_query(true, &query);
            executor.execute(query.into()).await.map(|_| ())
        }
    }
}
