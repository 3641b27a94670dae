//! Owned bind parameters.
//!
//! [`BindValue`] is the parameter type carried by [`Sql`](crate::Sql) and
//! [`QueryPlan`](crate::QueryPlan). Unlike a boxed `dyn ToSql`, it can be
//! compared and printed, which lets a built plan be inspected before it is
//! sent to the server.

use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A single positional parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    /// `text` / `varchar`
    Text(String),
    /// `integer`
    Int(i32),
    /// `bigint` (also what Postgres infers for `LIMIT $n`)
    BigInt(i64),
    /// `numeric`
    Numeric(Decimal),
}

impl ToSql for BindValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Text(v) => v.to_sql(ty, out),
            Self::Int(v) => v.to_sql(ty, out),
            Self::BigInt(v) => v.to_sql(ty, out),
            Self::Numeric(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <String as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <Decimal as ToSql>::accepts(ty)
    }

    // The type check has to run against the variant actually held, not the
    // union that `accepts` reports.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Text(v) => v.to_sql_checked(ty, out),
            Self::Int(v) => v.to_sql_checked(ty, out),
            Self::BigInt(v) => v.to_sql_checked(ty, out),
            Self::Numeric(v) => v.to_sql_checked(ty, out),
        }
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<&String> for BindValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<Decimal> for BindValue {
    fn from(v: Decimal) -> Self {
        Self::Numeric(v)
    }
}
