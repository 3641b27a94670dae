//! End-to-end checks against a live database.
//!
//! These run only when `DATABASE_URL` is set. Each test creates session-local
//! temporary tables that shadow the real schema, so nothing is written to it.

use lightbnb_db::{
    DbError, GenericClient, NewProperty, NewUser, SearchOptions, properties, reservations, users,
};

async fn try_connect() -> Option<tokio_postgres::Client> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    Some(client)
}

const SCHEMA: &str = "
CREATE TEMP TABLE users (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    password VARCHAR(255) NOT NULL
);
CREATE TEMP TABLE properties (
    id SERIAL PRIMARY KEY,
    owner_id INTEGER NOT NULL REFERENCES pg_temp.users(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    thumbnail_photo_url VARCHAR(255) NOT NULL,
    cover_photo_url VARCHAR(255) NOT NULL,
    cost_per_night INTEGER NOT NULL DEFAULT 0,
    parking_spaces INTEGER NOT NULL DEFAULT 0,
    number_of_bathrooms INTEGER NOT NULL DEFAULT 0,
    number_of_bedrooms INTEGER NOT NULL DEFAULT 0,
    country VARCHAR(255) NOT NULL,
    street VARCHAR(255) NOT NULL,
    city VARCHAR(255) NOT NULL,
    province VARCHAR(255) NOT NULL,
    post_code VARCHAR(255) NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE
);
CREATE TEMP TABLE reservations (
    id SERIAL PRIMARY KEY,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    property_id INTEGER NOT NULL REFERENCES pg_temp.properties(id) ON DELETE CASCADE,
    guest_id INTEGER NOT NULL REFERENCES pg_temp.users(id) ON DELETE CASCADE
);
CREATE TEMP TABLE property_reviews (
    id SERIAL PRIMARY KEY,
    guest_id INTEGER NOT NULL REFERENCES pg_temp.users(id) ON DELETE CASCADE,
    property_id INTEGER NOT NULL REFERENCES pg_temp.properties(id) ON DELETE CASCADE,
    reservation_id INTEGER NOT NULL REFERENCES pg_temp.reservations(id) ON DELETE CASCADE,
    rating SMALLINT NOT NULL DEFAULT 0,
    message TEXT
);
";

async fn setup() -> Option<tokio_postgres::Client> {
    let client = try_connect().await?;
    client.batch_execute(SCHEMA).await.expect("create temp schema");
    Some(client)
}

fn new_property(owner_id: i32, title: &str, city: &str, cost_per_night: i32) -> NewProperty {
    NewProperty {
        owner_id,
        title: title.to_string(),
        description: "description".to_string(),
        thumbnail_photo_url: "https://images.example/thumb.jpg".to_string(),
        cover_photo_url: "https://images.example/cover.jpg".to_string(),
        cost_per_night,
        parking_spaces: 1,
        number_of_bathrooms: 1,
        number_of_bedrooms: 2,
        country: "Canada".to_string(),
        street: "1 Main St".to_string(),
        city: city.to_string(),
        province: "BC".to_string(),
        post_code: "V5K 0A1".to_string(),
    }
}

async fn add_user(conn: &impl GenericClient, name: &str, email: &str) -> i32 {
    let user = NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "password".to_string(),
    };
    assert_eq!(users::add_user(conn, &user).await.unwrap(), 1);
    users::get_user_with_email(conn, email)
        .await
        .unwrap()
        .expect("user just inserted")
        .id
}

async fn review(conn: &tokio_postgres::Client, guest_id: i32, property_id: i32, rating: i16) {
    let row = conn
        .query_one(
            "INSERT INTO reservations (start_date, end_date, property_id, guest_id) \
             VALUES ('2026-01-01', '2026-01-05', $1, $2) RETURNING id",
            &[&property_id, &guest_id],
        )
        .await
        .unwrap();
    let reservation_id: i32 = row.get(0);
    conn.execute(
        "INSERT INTO property_reviews (guest_id, property_id, reservation_id, rating) \
         VALUES ($1, $2, $3, $4)",
        &[&guest_id, &property_id, &reservation_id, &rating],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn user_lookup_and_duplicate_email() {
    let Some(conn) = setup().await else {
        return;
    };

    let id = add_user(&conn, "Ada", "ada@example.com").await;
    let by_id = users::get_user_with_id(&conn, id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "ada@example.com");

    assert!(users::get_user_with_email(&conn, "nobody@example.com")
        .await
        .unwrap()
        .is_none());

    let dup = NewUser {
        name: "Ada again".to_string(),
        email: "ada@example.com".to_string(),
        password: "x".to_string(),
    };
    let err = users::add_user(&conn, &dup).await.unwrap_err();
    assert!(err.is_unique_violation(), "{err}");
}

#[tokio::test]
async fn search_filters_and_orders_by_price() {
    let Some(conn) = setup().await else {
        return;
    };

    let owner = add_user(&conn, "Owner", "owner@example.com").await;
    let guest = add_user(&conn, "Guest", "guest@example.com").await;

    let cheap = properties::add_property(&conn, &new_property(owner, "Cheap", "Vancouver", 5000))
        .await
        .unwrap();
    let pricey = properties::add_property(&conn, &new_property(owner, "Pricey", "North Vancouver", 15000))
        .await
        .unwrap();
    let elsewhere = properties::add_property(&conn, &new_property(owner, "Far", "Toronto", 8000))
        .await
        .unwrap();
    let unreviewed = properties::add_property(&conn, &new_property(owner, "New", "Vancouver", 6000))
        .await
        .unwrap();
    assert_eq!(cheap.cost_per_night, 5000);
    assert!(unreviewed.id > 0);

    review(&conn, guest, cheap.id, 3).await;
    review(&conn, guest, pricey.id, 5).await;
    review(&conn, guest, pricey.id, 4).await;
    review(&conn, guest, elsewhere.id, 2).await;

    // No filters: reviewed properties only, cheapest first.
    let all = properties::search_properties(&conn, &SearchOptions::new(), None)
        .await
        .unwrap();
    let titles: Vec<_> = all.iter().map(|l| l.property.title.as_str()).collect();
    assert_eq!(titles, ["Cheap", "Far", "Pricey"]);

    let vancouver = properties::search_properties(&conn, &SearchOptions::new().city("Vancouver"), None)
        .await
        .unwrap();
    assert_eq!(vancouver.len(), 2);

    // Bounds are inclusive.
    let ranged = SearchOptions::new()
        .minimum_price_per_night(50)
        .maximum_price_per_night(150);
    let in_range = properties::search_properties(&conn, &ranged, None).await.unwrap();
    assert_eq!(in_range.len(), 3);

    let rated = properties::search_properties(&conn, &SearchOptions::new().minimum_rating(4), None)
        .await
        .unwrap();
    assert_eq!(rated.len(), 1);
    assert_eq!(rated[0].property.id, pricey.id);
    assert_eq!(rated[0].average_rating, Some(rust_decimal::Decimal::new(45, 1)));

    let limited = properties::search_properties(&conn, &SearchOptions::new(), Some(1))
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);

    let listed = properties::list_properties(&conn, None).await.unwrap();
    assert_eq!(listed.len(), 4);
}

#[tokio::test]
async fn reservations_are_joined_with_properties() {
    let Some(conn) = setup().await else {
        return;
    };

    let owner = add_user(&conn, "Owner", "owner@example.com").await;
    let guest = add_user(&conn, "Guest", "guest@example.com").await;
    let property = properties::add_property(&conn, &new_property(owner, "Cabin", "Whistler", 20000))
        .await
        .unwrap();
    review(&conn, guest, property.id, 5).await;

    let found = reservations::get_all_reservations(&conn, guest, None)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].guest_id, guest);
    assert_eq!(found[0].property.id, property.id);
    assert_eq!(found[0].property.title, "Cabin");
    assert!(found[0].end_date > found[0].start_date);

    let none = reservations::get_all_reservations(&conn, owner, Some(5))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn failures_are_returned_not_swallowed() {
    let Some(conn) = setup().await else {
        return;
    };

    let err = properties::add_property(&conn, &new_property(9999, "Orphan", "Nowhere", 100))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation(_)), "{err}");
}

#[tokio::test]
async fn query_errors_carry_server_message_and_sqlstate() {
    let Some(conn) = setup().await else {
        return;
    };

    let err = lightbnb_db::query("SELEC * FROM properties")
        .fetch_all(&conn)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Query(_)), "{err}");
    assert_eq!(err.sqlstate(), Some("42601"));

    let text = err.to_string();
    assert!(text.contains("syntax error"), "{text}");
    assert!(text.contains("SQLSTATE 42601"), "{text}");
}
