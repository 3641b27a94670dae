//! SQL-first dynamic builder.
//!
//! This module complements [`query()`](crate::query):
//! - `query()` is for a full SQL string that already has `$1, $2...`.
//! - `Sql` is for *composing* SQL without manually tracking placeholder indices.
//!
//! # Example
//!
//! ```ignore
//! use lightbnb_db::sql;
//!
//! let mut q = sql("SELECT * FROM properties");
//! if let Some(city) = city {
//!     q.push(" WHERE city LIKE ").push_bind(format!("%{city}%"));
//! }
//! q.push(" ORDER BY cost_per_night").limit(10);
//!
//! let plan = q.into_plan();
//! ```

use crate::plan::QueryPlan;
use crate::value::BindValue;
use std::fmt::Write;

#[derive(Debug, Clone)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A SQL-first, parameter-safe dynamic SQL builder.
///
/// `Sql` stores SQL pieces and parameters separately and generates `$1, $2, ...`
/// placeholders when rendered, so the Nth placeholder always refers to the Nth
/// bound value.
#[derive(Debug, Clone)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<BindValue>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<BindValue>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append another `Sql` fragment, consuming it.
    ///
    /// The fragment's placeholders are renumbered to follow the ones already
    /// present in `self`.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        self.parts.append(&mut other.parts);
        self.params.append(&mut other.params);
        self
    }

    /// Append `sep`-joined fragments. Nothing is written for an empty list.
    pub fn push_joined(&mut self, fragments: impl IntoIterator<Item = Sql>, sep: &str) -> &mut Self {
        for (i, fragment) in fragments.into_iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            self.push_sql(fragment);
        }
        self
    }

    /// Append a `WHERE ...` clause with the fragments joined by `AND`.
    ///
    /// If `fragments` is empty, this is a no-op.
    pub fn push_where_and(&mut self, fragments: Vec<Sql>) -> &mut Self {
        if fragments.is_empty() {
            return self;
        }
        self.push(" WHERE ");
        self.push_joined(fragments, " AND ")
    }

    /// Append `LIMIT $n` to the query with a bound parameter.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.push(" LIMIT ").push_bind(n)
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    let _ = write!(&mut out, "${}", idx);
                }
            }
        }
        out
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> &[BindValue] {
        &self.params
    }

    /// Render into an executable [`QueryPlan`].
    pub fn into_plan(self) -> QueryPlan {
        let sql = self.to_sql();
        QueryPlan::new(sql, self.params)
    }
}
