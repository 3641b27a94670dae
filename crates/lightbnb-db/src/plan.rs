//! Executable query plans.
//!
//! A [`QueryPlan`] is the final SQL text plus its bind parameters in
//! placeholder order. Plans come either from hand-written SQL via [`query()`]
//! or from a rendered [`Sql`](crate::Sql) builder.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::row::FromRow;
use crate::value::BindValue;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Maximum number of SQL bytes included in log events.
pub const LOG_SQL_MAX_BYTES: usize = 200;

/// SQL text and ordered bind parameters, ready to execute.
///
/// # Example
///
/// ```ignore
/// use lightbnb_db::query;
///
/// let user: Option<User> = query("SELECT * FROM users WHERE email = $1")
///     .bind(email)
///     .fetch_opt_as(&conn)
///     .await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    sql: String,
    params: Vec<BindValue>,
}

/// Create a plan from hand-written SQL. Bind values with [`QueryPlan::bind`].
pub fn query(sql: impl Into<String>) -> QueryPlan {
    QueryPlan::new(sql, Vec::new())
}

impl QueryPlan {
    pub(crate) fn new(sql: impl Into<String>, params: Vec<BindValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Bind the next positional parameter.
    ///
    /// The SQL must already contain the matching `$n` placeholder.
    pub fn bind(mut self, value: impl Into<BindValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// The SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound values in placeholder order (`$1` is index 0).
    pub fn params(&self) -> &[BindValue] {
        &self.params
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }

    /// Execute the plan and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> DbResult<Vec<Row>> {
        self.log_before();
        let result = conn.query(&self.sql, &self.params_ref()).await;
        self.log_result(result)
    }

    /// Execute the plan and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the plan and return the first row; `NotFound` if there is none.
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> DbResult<Row> {
        self.log_before();
        let result = conn.query_one(&self.sql, &self.params_ref()).await;
        self.log_result(result)
    }

    /// Execute the plan and return the first row mapped to `T`.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the plan and return at most one row.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> DbResult<Option<Row>> {
        self.log_before();
        let result = conn.query_opt(&self.sql, &self.params_ref()).await;
        self.log_result(result)
    }

    /// Execute the plan and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the plan and return the affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> DbResult<u64> {
        self.log_before();
        let result = conn.execute(&self.sql, &self.params_ref()).await;
        self.log_result(result)
    }

    fn log_before(&self) {
        tracing::debug!(
            target: "lightbnb_db::sql",
            sql = %truncate_sql(&self.sql, LOG_SQL_MAX_BYTES),
            params = self.params.len(),
            "executing query"
        );
    }

    fn log_result<T>(&self, result: DbResult<T>) -> DbResult<T> {
        if let Err(err) = &result {
            // Not-found from query_one is an expected outcome, not a failure.
            if !err.is_not_found() {
                tracing::warn!(
                    target: "lightbnb_db::sql",
                    sql = %truncate_sql(&self.sql, LOG_SQL_MAX_BYTES),
                    code = err.sqlstate().unwrap_or("-"),
                    error = %err,
                    "query failed"
                );
            }
        }
        result
    }
}

/// Shorten `sql` to at most `max_bytes`, cutting on a char boundary.
pub(crate) fn truncate_sql(sql: &str, max_bytes: usize) -> std::borrow::Cow<'_, str> {
    if sql.len() <= max_bytes {
        return sql.into();
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end]).into()
}
