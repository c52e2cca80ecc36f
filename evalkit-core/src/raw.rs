use crate::{
    ClientError, Executor, Prepared, Query, Result, RowLabeled, Value, log_query,
    stream::TryStreamExt, truncate_long,
};

async fn raw_query<Exec: Executor>(
    executor: &mut Exec,
    sql: &str,
    params: Vec<Value>,
) -> Result<Query<Exec::Driver>> {
    if params.is_empty() {
        return Ok(Query::Raw(sql.into()));
    }
    let mut query = executor.prepare(sql.into()).await?;
    if let Query::Prepared(prepared) = &mut query {
        let expected = prepared.parameters();
        if expected != params.len() as u64 {
            let error = ClientError::Validation(format!(
                "The query has {} parameters, {} values were given:\n{}",
                expected,
                params.len(),
                truncate_long!(sql)
            ));
            log::error!("{}", error);
            return Err(error.into());
        }
        for value in params {
            prepared.bind_value(value)?;
        }
    }
    Ok(query)
}

/// Run raw SQL and return the number of rows affected.
///
/// Without parameters the text may contain several statements, with parameters
/// it must be a single statement using positional placeholders.
pub async fn execute_raw<Exec: Executor>(
    executor: &mut Exec,
    sql: &str,
    params: Vec<Value>,
    log_queries: bool,
) -> Result<u64> {
    log_query(log_queries, sql);
    let query = raw_query(executor, sql, params).await?;
    Ok(executor.execute(query).await?.rows_affected)
}

/// Run raw SQL and return the rows it produces.
pub async fn query_raw<Exec: Executor>(
    executor: &mut Exec,
    sql: &str,
    params: Vec<Value>,
    log_queries: bool,
) -> Result<Vec<RowLabeled>> {
    log_query(log_queries, sql);
    let query = raw_query(executor, sql, params).await?;
    executor
        .fetch(query)
        .try_collect::<Vec<_>>()
        .await
}
