//! Reservation listings.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::models::Reservation;
use crate::plan::query;
use crate::search::effective_limit;

// `properties.*` supplies the property's own `id`, so the reservation key is aliased.
const GUEST_RESERVATIONS: &str = "SELECT reservations.id AS reservation_id, reservations.guest_id, \
     reservations.start_date, reservations.end_date, properties.* \
     FROM reservations \
     INNER JOIN properties ON reservations.property_id = properties.id \
     WHERE reservations.guest_id = $1 \
     LIMIT $2";

/// Reservations made by `guest_id`, each joined with its property.
///
/// `limit` defaults to [`DEFAULT_LIMIT`](crate::DEFAULT_LIMIT) when absent or non-positive.
pub async fn get_all_reservations(
    conn: &impl GenericClient,
    guest_id: i32,
    limit: Option<i64>,
) -> DbResult<Vec<Reservation>> {
    query(GUEST_RESERVATIONS)
        .bind(guest_id)
        .bind(effective_limit(limit))
        .fetch_all_as(conn)
        .await
}
