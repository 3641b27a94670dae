//! # lightbnb-db
//!
//! PostgreSQL data access for the LightBnB vacation-rental application.
//!
//! ## Features
//!
//! - **Injected connections**: every operation takes `&impl GenericClient`, so a
//!   plain client, a pooled connection or a transaction all work
//! - **Parameter-safe dynamic SQL**: the [`Sql`] builder numbers placeholders for you
//! - **Inspectable plans**: a [`QueryPlan`] exposes its SQL and [`BindValue`]s before execution
//! - **Typed errors**: failures come back as [`DbError`], never as an empty result
//!
//! ## Property search
//!
//! ```ignore
//! use lightbnb_db::{SearchOptions, create_pool, properties, DatabaseConfig};
//!
//! let pool = create_pool(&DatabaseConfig::from_env()?)?;
//! let conn = pool.get().await?;
//!
//! let options = SearchOptions::new()
//!     .city("Vancouver")
//!     .minimum_price_per_night(50)
//!     .maximum_price_per_night(150)
//!     .minimum_rating(4);
//! let listings = properties::search_properties(&conn, &options, Some(20)).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod plan;
pub mod properties;
pub mod reservations;
pub mod row;
pub mod search;
pub mod sql;
pub mod users;
pub mod value;

pub use client::GenericClient;
pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use models::{NewProperty, NewUser, Property, PropertyListing, Reservation, User};
pub use plan::{QueryPlan, query};
pub use row::{FromRow, RowExt};
pub use search::{DEFAULT_LIMIT, PropertySearch, SearchOptions, build_search_plan};
pub use sql::{Sql, sql};
pub use value::BindValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_url, create_pool_with_tls};
