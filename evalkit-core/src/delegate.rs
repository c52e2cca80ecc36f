use crate::{
    AggregateArgs, AggregateResult, AggregateSelection, AsValue, ClientError, ColumnDef, ColumnRef,
    Condition, Driver, Entity, Error, ErrorContext, Executor, FieldUpdate, FindArgs, GroupByArgs,
    GroupByRow, Operand, OrderBy, Ordered, Result, RowFields, RowLabeled, SqlWriter, UniqueWhere,
    UpdateData, Value, Window, log_query, stream::TryStreamExt,
};
use std::{collections::BTreeMap, marker::PhantomData};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Typed operations on one model, forwarded to the executor it borrows.
///
/// A delegate is cheap to create and lives for a single call chain:
///
/// ```rust,ignore
/// let student = client.student().find_unique(StudentUnique::Id(1)).await?;
/// ```
///
/// Every filter, ordering and column argument is checked against the model
/// before any SQL is produced, a column of another model is a validation error.
pub struct Delegate<'e, E: Entity, Exec: Executor> {
    executor: &'e mut Exec,
    log_queries: bool,
    _entity: PhantomData<fn() -> E>,
}

fn validation(message: String) -> Error {
    let error = ClientError::Validation(message);
    log::error!("{}", error);
    error.into()
}

impl<'e, E: Entity, Exec: Executor> Delegate<'e, E, Exec> {
    pub fn new(executor: &'e mut Exec, log_queries: bool) -> Self {
        Self {
            executor,
            log_queries,
            _entity: PhantomData,
        }
    }

    fn writer(&self) -> <Exec::Driver as Driver>::SqlWriter {
        self.executor.driver().sql_writer()
    }

    async fn fetch_rows(&mut self, sql: String) -> Result<Vec<RowLabeled>> {
        log_query(self.log_queries, &sql);
        self.executor.fetch(sql.into()).try_collect().await
    }

    async fn fetch_entities(&mut self, sql: String) -> Result<Vec<E>> {
        self.fetch_rows(sql)
            .await?
            .into_iter()
            .map(|row| {
                E::from_row(row).with_context(|| {
                    format!("While decoding a `{}` record", E::model_name())
                })
            })
            .collect()
    }

    async fn execute_sql(&mut self, sql: String) -> Result<u64> {
        log_query(self.log_queries, &sql);
        Ok(self.executor.execute(sql.into()).await?.rows_affected)
    }

    fn check_columns<'c>(
        columns: impl IntoIterator<Item = &'c ColumnRef>,
        usage: &str,
    ) -> Result<()> {
        for column in columns {
            if !E::has_column(column) {
                return Err(validation(format!(
                    "Column `{}.{}` used in {} does not belong to model `{}`",
                    column.table,
                    column.name,
                    usage,
                    E::model_name()
                )));
            }
        }
        Ok(())
    }

    fn check_filter(filter: Option<&Condition>, usage: &str) -> Result<()> {
        if let Some(filter) = filter {
            Self::check_columns(&filter.columns(), usage)?;
        }
        Ok(())
    }

    fn check_order_by(order_by: &[OrderBy], allow_aggregates: bool) -> Result<()> {
        for order in order_by {
            match &order.expression {
                Operand::Column(column) => Self::check_columns([column], "order_by")?,
                Operand::Call(..) if allow_aggregates => {
                    Self::check_columns(&order.columns(), "order_by")?
                }
                other => {
                    return Err(validation(format!(
                        "Cannot order `{}` records by {:?}",
                        E::model_name(),
                        other
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_selection(selection: &AggregateSelection) -> Result<()> {
        Self::check_columns(
            selection
                .count
                .iter()
                .chain(&selection.avg)
                .chain(&selection.sum)
                .chain(&selection.min)
                .chain(&selection.max),
            "an aggregate",
        )?;
        for column in selection.avg.iter().chain(&selection.sum) {
            let numeric = E::column_def(column).is_some_and(|c| c.value.is_numeric());
            if !numeric {
                return Err(validation(format!(
                    "Column `{}` of model `{}` is not numeric, it cannot be averaged or summed",
                    column.name,
                    E::model_name()
                )));
            }
        }
        Ok(())
    }

    /// Primary key ascending, the default ordering when reading backwards.
    fn primary_key_order() -> Vec<OrderBy> {
        E::primary_key_def()
            .iter()
            .map(|c| crate::Sortable::asc(&c.column_ref))
            .collect()
    }

    /// Assignments stamping the `updated_at` columns not already present.
    fn stamp_updated_at(mut data: UpdateData) -> UpdateData {
        let now = OffsetDateTime::now_utc();
        for column in E::columns().iter().filter(|c| c.updated_at) {
            if data.contains(&column.column_ref) {
                continue;
            }
            let value = match column.value {
                Value::Timestamp(..) => PrimitiveDateTime::new(now.date(), now.time()).as_value(),
                Value::TimestampWithTimezone(..) => now.as_value(),
                _ => {
                    log::warn!(
                        "Column `{}` is marked updated_at but it is not a timestamp",
                        column.name()
                    );
                    continue;
                }
            };
            data = data.with(column.column_ref, FieldUpdate::Set(value));
        }
        data
    }

    fn check_update(data: &UpdateData) -> Result<()> {
        Self::check_columns(data.columns(), "update data")?;
        for (column, update) in &data.fields {
            let numeric = !matches!(update, FieldUpdate::Set(..));
            if numeric && !E::column_def(column).is_some_and(|c| c.value.is_numeric()) {
                return Err(validation(format!(
                    "Column `{}` of model `{}` is not numeric, it cannot be incremented, decremented, multiplied or divided",
                    column.name,
                    E::model_name()
                )));
            }
        }
        Ok(())
    }

    /// Record matching a primary or unique key.
    pub async fn find_unique(&mut self, key: E::Unique) -> Result<Option<E>> {
        self.find_first(key.condition()).await
    }

    /// Record matching a primary or unique key, `P2025` when absent.
    pub async fn find_unique_or_throw(&mut self, key: E::Unique) -> Result<E> {
        self.find_unique(key)
            .await?
            .ok_or_else(|| ClientError::not_found(E::model_name()).into())
    }

    /// First record matching the arguments, honoring ordering and skip.
    pub async fn find_first(&mut self, args: impl Into<FindArgs>) -> Result<Option<E>> {
        let mut args = args.into();
        args.take = Some(if args.take.is_some_and(|v| v < 0) { -1 } else { 1 });
        Ok(self.find_many(args).await?.into_iter().next())
    }

    /// First record matching the arguments, `P2025` when absent.
    pub async fn find_first_or_throw(&mut self, args: impl Into<FindArgs>) -> Result<E> {
        self.find_first(args)
            .await?
            .ok_or_else(|| ClientError::not_found(E::model_name()).into())
    }

    /// Records matching the arguments.
    ///
    /// A negative `take` reverses the ordering (the primary key when no
    /// ordering is given), takes the absolute amount and restores the original
    /// order of the page. `distinct` keeps the first record of every distinct
    /// combination of the listed columns, pagination applies after it.
    pub async fn find_many(&mut self, args: impl Into<FindArgs>) -> Result<Vec<E>> {
        let args = args.into();
        Self::check_filter(args.filter.as_ref(), "the filter")?;
        Self::check_order_by(&args.order_by, false)?;
        Self::check_columns(&args.distinct, "distinct")?;
        let backwards = args.take.is_some_and(|v| v < 0);
        let mut order_by = args.order_by.clone();
        if backwards {
            if order_by.is_empty() {
                order_by = Self::primary_key_order();
            }
            order_by = order_by.into_iter().map(Ordered::reversed).collect();
        }
        let take = args.take.map(i64::unsigned_abs);
        let mut result = if args.distinct.is_empty() {
            let mut sql = String::with_capacity(256);
            self.writer().write_select::<E>(
                &mut sql,
                &Window {
                    filter: args.filter.as_ref(),
                    order_by: &order_by,
                    skip: args.skip,
                    take,
                },
            );
            self.fetch_entities(sql).await?
        } else {
            let mut sql = String::with_capacity(256);
            self.writer().write_select::<E>(
                &mut sql,
                &Window {
                    filter: args.filter.as_ref(),
                    order_by: &order_by,
                    skip: None,
                    take: None,
                },
            );
            let rows = self.fetch_rows(sql).await?;
            let mut seen: Vec<Vec<Value>> = Vec::new();
            let mut distinct = Vec::new();
            for row in rows {
                let key: Vec<Value> = args
                    .distinct
                    .iter()
                    .map(|c| row.get_column(c.name).cloned().unwrap_or_default())
                    .collect();
                if seen.contains(&key) {
                    continue;
                }
                seen.push(key);
                distinct.push(row);
            }
            distinct
                .into_iter()
                .skip(args.skip.unwrap_or(0) as usize)
                .take(take.map(|v| v as usize).unwrap_or(usize::MAX))
                .map(E::from_row)
                .collect::<Result<Vec<_>>>()?
        };
        if backwards {
            result.reverse();
        }
        Ok(result)
    }

    /// Insert a record and return it as stored, engine defaults included.
    pub async fn create(&mut self, data: &E) -> Result<E> {
        let mut sql = String::with_capacity(256);
        self.writer()
            .write_insert::<E>(&mut sql, &[data.row_filtered()], false, true);
        self.fetch_entities(sql).await?.into_iter().next().ok_or_else(|| {
            ClientError::UnknownRequest(format!(
                "The engine did not return the inserted `{}` record",
                E::model_name()
            ))
            .into()
        })
    }

    /// Insert many records, returns how many were inserted.
    ///
    /// With `skip_duplicates` the records violating a unique constraint are ignored.
    pub async fn create_many<'a>(
        &mut self,
        data: impl IntoIterator<Item = &'a E>,
        skip_duplicates: bool,
    ) -> Result<u64>
    where
        E: 'a,
    {
        let mut groups: Vec<(Vec<&'static str>, Vec<RowFields>)> = Vec::new();
        for row in data.into_iter().map(Entity::row_filtered) {
            let names: Vec<&'static str> = row.iter().map(|(name, _)| *name).collect();
            match groups.iter_mut().find(|(n, _)| *n == names) {
                Some((_, rows)) => rows.push(row),
                None => groups.push((names, vec![row])),
            }
        }
        let mut total = 0;
        for (names, rows) in groups {
            let batches: Vec<&[RowFields]> = if names.is_empty() {
                rows.chunks(1).collect()
            } else {
                vec![rows.as_slice()]
            };
            for batch in batches {
                let mut sql = String::with_capacity(128 + batch.len() * 64);
                self.writer()
                    .write_insert::<E>(&mut sql, batch, skip_duplicates, false);
                total += self.execute_sql(sql).await?;
            }
        }
        Ok(total)
    }

    async fn update_where(&mut self, filter: Condition, data: UpdateData) -> Result<Option<E>> {
        Self::check_update(&data)?;
        let data = Self::stamp_updated_at(data);
        if data.is_empty() {
            return self.find_first(filter).await;
        }
        let mut sql = String::with_capacity(256);
        self.writer()
            .write_update::<E>(&mut sql, &data, &filter, true);
        Ok(self.fetch_entities(sql).await?.into_iter().next())
    }

    /// Update the record matching the key, `P2025` when absent.
    ///
    /// Columns flagged `updated_at` are stamped with the current time unless `data` sets them.
    pub async fn update(&mut self, key: E::Unique, data: UpdateData) -> Result<E> {
        self.update_where(key.condition(), data)
            .await?
            .ok_or_else(|| ClientError::not_found(E::model_name()).into())
    }

    /// Update every record matching the filter, returns how many.
    pub async fn update_many(&mut self, filter: Condition, data: UpdateData) -> Result<u64> {
        Self::check_filter(Some(&filter), "the filter")?;
        Self::check_update(&data)?;
        let data = Self::stamp_updated_at(data);
        if data.is_empty() {
            return self.count(filter).await;
        }
        let mut sql = String::with_capacity(256);
        self.writer()
            .write_update::<E>(&mut sql, &data, &filter, false);
        self.execute_sql(sql).await
    }

    /// Update the record matching the key when it exists, otherwise create `create`.
    pub async fn upsert(&mut self, key: E::Unique, create: &E, update: UpdateData) -> Result<E> {
        if let Some(updated) = self.update_where(key.condition(), update).await? {
            return Ok(updated);
        }
        self.create(create).await
    }

    /// Delete the record matching the key and return it, `P2025` when absent.
    pub async fn delete(&mut self, key: E::Unique) -> Result<E> {
        let mut sql = String::with_capacity(128);
        self.writer()
            .write_delete::<E>(&mut sql, &key.condition(), true);
        self.fetch_entities(sql)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::not_found(E::model_name()).into())
    }

    /// Delete every record matching the filter, returns how many.
    pub async fn delete_many(&mut self, filter: Condition) -> Result<u64> {
        Self::check_filter(Some(&filter), "the filter")?;
        let mut sql = String::with_capacity(128);
        self.writer()
            .write_delete::<E>(&mut sql, &filter, false);
        self.execute_sql(sql).await
    }

    /// Number of records matching the arguments, honoring skip and take.
    pub async fn count(&mut self, args: impl Into<FindArgs>) -> Result<u64> {
        let args = args.into();
        if !args.distinct.is_empty() {
            return Ok(self.find_many(args).await?.len() as u64);
        }
        Self::check_filter(args.filter.as_ref(), "the filter")?;
        Self::check_order_by(&args.order_by, false)?;
        let mut order_by = args.order_by.clone();
        if args.take.is_some_and(|v| v < 0) {
            if order_by.is_empty() {
                order_by = Self::primary_key_order();
            }
            order_by = order_by.into_iter().map(Ordered::reversed).collect();
        }
        let mut sql = String::with_capacity(256);
        self.writer().write_count::<E>(
            &mut sql,
            &Window {
                filter: args.filter.as_ref(),
                order_by: &order_by,
                skip: args.skip,
                take: args.take.map(i64::unsigned_abs),
            },
        );
        let mut rows = self.fetch_rows(sql).await?;
        let value = rows
            .first_mut()
            .and_then(|row| row.take_column("_count"))
            .ok_or_else(|| {
                ClientError::UnknownRequest("The engine did not return the count".into())
            })?;
        u64::try_from_value(value)
    }

    /// Aggregates over the filtered, ordered, paginated window.
    pub async fn aggregate(&mut self, args: AggregateArgs) -> Result<AggregateResult> {
        if args.selection.is_empty() {
            return Err(validation(format!(
                "The aggregate on `{}` does not select any aggregate",
                E::model_name()
            )));
        }
        Self::check_selection(&args.selection)?;
        Self::check_filter(args.filter.as_ref(), "the filter")?;
        Self::check_order_by(&args.order_by, false)?;
        let functions = args.selection.functions();
        let mut sql = String::with_capacity(256);
        self.writer()
            .write_aggregate::<E>(&mut sql, &functions, &args.window());
        let row = self.fetch_rows(sql).await?.into_iter().next().ok_or_else(|| {
            ClientError::UnknownRequest("The engine did not return the aggregate".into())
        })?;
        Ok(AggregateResult {
            values: row
                .labels
                .iter()
                .cloned()
                .zip(row.values.into_vec())
                .collect(),
        })
    }

    /// Groups of records sharing the `by` columns, with their aggregates.
    pub async fn group_by(&mut self, args: GroupByArgs) -> Result<Vec<GroupByRow>> {
        if args.by.is_empty() {
            return Err(validation(format!(
                "The group by on `{}` needs at least one column in `by`",
                E::model_name()
            )));
        }
        Self::check_columns(&args.by, "by")?;
        Self::check_selection(&args.selection)?;
        Self::check_filter(args.filter.as_ref(), "the filter")?;
        Self::check_filter(args.having.as_ref(), "having")?;
        Self::check_order_by(&args.order_by, true)?;
        for order in &args.order_by {
            if let Operand::Column(column) = &order.expression
                && !args.by.contains(column)
            {
                return Err(validation(format!(
                    "Column `{}` in order_by must be part of `by`",
                    column.name
                )));
            }
        }
        if (args.skip.is_some() || args.take.is_some()) && args.order_by.is_empty() {
            return Err(validation(format!(
                "The group by on `{}` uses skip or take, it needs an order_by",
                E::model_name()
            )));
        }
        let functions = args.selection.functions();
        let mut sql = String::with_capacity(256);
        self.writer().write_group_by::<E>(
            &mut sql,
            &args.by,
            &functions,
            args.having.as_ref(),
            &args.window(),
        );
        let rows = self.fetch_rows(sql).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let mut fields = BTreeMap::new();
                let mut aggregates = BTreeMap::new();
                for (label, value) in row.labels.iter().zip(row.values.into_vec()) {
                    if label.starts_with('_') && label.contains('.') {
                        aggregates.insert(label.clone(), value);
                    } else {
                        fields.insert(label.clone(), value);
                    }
                }
                GroupByRow {
                    fields,
                    aggregates: AggregateResult { values: aggregates },
                }
            })
            .collect())
    }

    /// Column definitions of the model.
    pub fn columns(&self) -> &'static [ColumnDef] {
        E::columns()
    }
}
