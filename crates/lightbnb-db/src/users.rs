//! User lookups and registration.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::models::{NewUser, User};
use crate::plan::query;

/// The user registered with `email`, if any.
pub async fn get_user_with_email(conn: &impl GenericClient, email: &str) -> DbResult<Option<User>> {
    query("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_opt_as(conn)
        .await
}

/// The user with primary key `id`, if any.
pub async fn get_user_with_id(conn: &impl GenericClient, id: i32) -> DbResult<Option<User>> {
    query("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_opt_as(conn)
        .await
}

/// Insert a user and return the number of rows written.
///
/// A duplicate email surfaces as [`DbError::UniqueViolation`](crate::DbError::UniqueViolation)
/// when the schema carries a unique constraint on `users.email`.
pub async fn add_user(conn: &impl GenericClient, user: &NewUser) -> DbResult<u64> {
    query("INSERT INTO users (name, email, password) VALUES ($1, $2, $3)")
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .execute(conn)
        .await
}
