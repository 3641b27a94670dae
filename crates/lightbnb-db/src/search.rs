//! Property search.
//!
//! [`PropertySearch`] turns a sparse [`SearchOptions`] into a single aggregate
//! query over `properties` joined with `property_reviews`:
//!
//! ```text
//! SELECT properties.*, avg(property_reviews.rating) AS average_rating
//! FROM properties
//! JOIN property_reviews ON properties.id = property_reviews.property_id
//! [WHERE <city> AND <owner> AND <min price> AND <max price>]
//! GROUP BY properties.id
//! [HAVING avg(property_reviews.rating) >= <min rating>]
//! ORDER BY properties.cost_per_night
//! LIMIT <limit>
//! ```
//!
//! Each present filter contributes exactly one predicate and one bind value,
//! always in the order shown, so `$n` matches the nth entry of
//! [`QueryPlan::params`].
//!
//! A filter counts as present only when it is set to a non-zero number or a
//! non-empty string. `owner_id: Some(0)` and `city: Some("")` are ignored.
//!
//! # Example
//!
//! ```ignore
//! use lightbnb_db::{PropertySearch, SearchOptions};
//!
//! let options = SearchOptions::new().city("Vancouver").minimum_rating(4);
//! let plan = PropertySearch::new(options).limit(20).build();
//! let listings: Vec<PropertyListing> = plan.fetch_all_as(&conn).await?;
//! ```

use crate::plan::QueryPlan;
use crate::sql::Sql;
use crate::value::BindValue;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

/// Result cap used when the caller does not supply a positive limit.
pub const DEFAULT_LIMIT: i64 = 10;

const SELECT_WITH_RATING: &str = "SELECT properties.*, avg(property_reviews.rating) AS average_rating \
     FROM properties \
     JOIN property_reviews ON properties.id = property_reviews.property_id";

/// Optional filters for [`PropertySearch`].
///
/// Deserializes from a query string or JSON body. Numeric fields accept
/// numbers or numeric strings, and an empty string reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Substring of the city name (`LIKE '%city%'`).
    pub city: Option<String>,
    /// Only properties owned by this user.
    #[serde(deserialize_with = "lenient")]
    pub owner_id: Option<i32>,
    /// Inclusive lower bound, in dollars.
    #[serde(deserialize_with = "lenient")]
    pub minimum_price_per_night: Option<Decimal>,
    /// Inclusive upper bound, in dollars.
    #[serde(deserialize_with = "lenient")]
    pub maximum_price_per_night: Option<Decimal>,
    /// Inclusive lower bound on the average review rating (0–5).
    #[serde(deserialize_with = "lenient")]
    pub minimum_rating: Option<Decimal>,
}

impl SearchOptions {
    /// Options with every filter absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match cities containing `city`.
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Restrict to one owner. `0` counts as absent.
    pub fn owner_id(mut self, owner_id: i32) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Inclusive lower price bound in dollars. `0` counts as absent.
    pub fn minimum_price_per_night(mut self, dollars: impl Into<Decimal>) -> Self {
        self.minimum_price_per_night = Some(dollars.into());
        self
    }

    /// Inclusive upper price bound in dollars. `0` counts as absent.
    pub fn maximum_price_per_night(mut self, dollars: impl Into<Decimal>) -> Self {
        self.maximum_price_per_night = Some(dollars.into());
        self
    }

    /// Inclusive lower bound on the average rating. `0` counts as absent.
    pub fn minimum_rating(mut self, rating: impl Into<Decimal>) -> Self {
        self.minimum_rating = Some(rating.into());
        self
    }

    /// Whether no filter would be applied.
    pub fn is_empty(&self) -> bool {
        WHERE_PREDICATES.iter().all(|p| p(self).is_none()) && rating_filter(self).is_none()
    }
}

/// A `WHERE` predicate contributed by one option, or `None` when the option is absent.
type PredicateBuilder = fn(&SearchOptions) -> Option<Sql>;

/// Row filters, in binding order.
const WHERE_PREDICATES: [PredicateBuilder; 4] = [
    city_predicate,
    owner_predicate,
    minimum_price_predicate,
    maximum_price_predicate,
];

fn predicate(lhs: &str, value: impl Into<BindValue>) -> Sql {
    let mut s = Sql::empty();
    s.push(lhs).push_bind(value);
    s
}

fn city_predicate(options: &SearchOptions) -> Option<Sql> {
    let city = options.city.as_deref().filter(|c| !c.is_empty())?;
    Some(predicate("properties.city LIKE ", format!("%{city}%")))
}

fn owner_predicate(options: &SearchOptions) -> Option<Sql> {
    let owner_id = options.owner_id.filter(|id| *id != 0)?;
    Some(predicate("properties.owner_id = ", owner_id))
}

fn minimum_price_predicate(options: &SearchOptions) -> Option<Sql> {
    let dollars = present(options.minimum_price_per_night)?;
    Some(predicate("properties.cost_per_night >= ", dollars_to_cents(dollars)))
}

fn maximum_price_predicate(options: &SearchOptions) -> Option<Sql> {
    let dollars = present(options.maximum_price_per_night)?;
    Some(predicate("properties.cost_per_night <= ", dollars_to_cents(dollars)))
}

fn rating_filter(options: &SearchOptions) -> Option<Sql> {
    let rating = present(options.minimum_rating)?;
    Some(predicate(" HAVING avg(property_reviews.rating) >= ", rating))
}

fn present(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| !v.is_zero())
}

/// Convert a dollar amount to the integer cents stored in `cost_per_night`.
///
/// Rounds half away from zero and saturates at the `integer` column bounds.
pub fn dollars_to_cents(dollars: Decimal) -> i32 {
    let saturated = if dollars.is_sign_negative() {
        i32::MIN
    } else {
        i32::MAX
    };
    dollars
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|c| c.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|c| c.to_i32())
        .unwrap_or(saturated)
}

/// Resolve a caller-supplied limit: absent or non-positive means [`DEFAULT_LIMIT`].
pub fn effective_limit(limit: Option<i64>) -> i64 {
    limit.filter(|n| *n > 0).unwrap_or(DEFAULT_LIMIT)
}

/// Builder for the property search query.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySearch {
    options: SearchOptions,
    limit: i64,
}

impl PropertySearch {
    /// A search over `options`, capped at [`DEFAULT_LIMIT`] rows.
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Cap the number of rows. Non-positive values fall back to [`DEFAULT_LIMIT`].
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = effective_limit(Some(limit));
        self
    }

    /// The filters this search was built from.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Assemble the query as a [`Sql`] builder.
    pub fn to_sql(&self) -> Sql {
        let mut q = Sql::new(SELECT_WITH_RATING);

        let filters: Vec<Sql> = WHERE_PREDICATES
            .iter()
            .filter_map(|build| build(&self.options))
            .collect();
        q.push_where_and(filters);

        // The rating is an aggregate, so it can only be filtered after grouping.
        q.push(" GROUP BY properties.id");
        if let Some(having) = rating_filter(&self.options) {
            q.push_sql(having);
        }

        q.push(" ORDER BY properties.cost_per_night");
        q.limit(self.limit);
        q
    }

    /// Render the final SQL text and bind values.
    pub fn build(&self) -> QueryPlan {
        self.to_sql().into_plan()
    }
}

/// Shorthand for `PropertySearch::new(options.clone()).limit(limit).build()`.
pub fn build_search_plan(options: &SearchOptions, limit: i64) -> QueryPlan {
    PropertySearch::new(options.clone()).limit(limit).build()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Text(String),
}

/// Accept `T`, a string that parses as `T`, or an empty string meaning absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<Lenient<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Value(v)) => Ok(Some(v)),
        Some(Lenient::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse().map(Some).map_err(serde::de::Error::custom)
        }
    }
}
