//! Property search, listing and creation.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::models::{NewProperty, Property, PropertyListing};
use crate::plan::{QueryPlan, query};
use crate::search::{DEFAULT_LIMIT, PropertySearch, SearchOptions, effective_limit};

/// Properties matching `options`, cheapest first, with their average rating.
///
/// Only properties with at least one review are returned, since the rating
/// comes from an inner join on `property_reviews`.
pub async fn search_properties(
    conn: &impl GenericClient,
    options: &SearchOptions,
    limit: Option<i64>,
) -> DbResult<Vec<PropertyListing>> {
    let plan = search_plan(options, limit);
    tracing::debug!(
        target: "lightbnb_db::search",
        filtered = !options.is_empty(),
        params = plan.params().len(),
        "searching properties"
    );
    plan.fetch_all_as(conn).await
}

// `PropertySearch::limit` owns the non-positive fallback.
fn search_plan(options: &SearchOptions, limit: Option<i64>) -> QueryPlan {
    PropertySearch::new(options.clone())
        .limit(limit.unwrap_or(DEFAULT_LIMIT))
        .build()
}

/// Unfiltered properties, no ordering or ratings.
pub async fn list_properties(conn: &impl GenericClient, limit: Option<i64>) -> DbResult<Vec<Property>> {
    query("SELECT * FROM properties LIMIT $1")
        .bind(effective_limit(limit))
        .fetch_all_as(conn)
        .await
}

/// Insert a property and return the stored row.
pub async fn add_property(conn: &impl GenericClient, property: &NewProperty) -> DbResult<Property> {
    query(
        "INSERT INTO properties (owner_id, title, description, thumbnail_photo_url, \
         cover_photo_url, cost_per_night, parking_spaces, number_of_bathrooms, \
         number_of_bedrooms, country, street, city, province, post_code) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         RETURNING *",
    )
    .bind(property.owner_id)
    .bind(&property.title)
    .bind(&property.description)
    .bind(&property.thumbnail_photo_url)
    .bind(&property.cover_photo_url)
    .bind(property.cost_per_night)
    .bind(property.parking_spaces)
    .bind(property.number_of_bathrooms)
    .bind(property.number_of_bedrooms)
    .bind(&property.country)
    .bind(&property.street)
    .bind(&property.city)
    .bind(&property.province)
    .bind(&property.post_code)
    .fetch_one_as(conn)
    .await
}
