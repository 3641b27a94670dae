//! Property search against a LightBnB database.
//!
//! Run with: cargo run --example search_properties -p lightbnb-db -- Vancouver
//!
//! Set DATABASE_URL in .env file or environment variable, or rely on the
//! development defaults (development:development@localhost/lightbnb).

use lightbnb_db::{DatabaseConfig, DbError, SearchOptions, create_pool, properties, users};

#[tokio::main]
async fn main() -> Result<(), DbError> {
    let config = DatabaseConfig::from_env()?;
    let pool = create_pool(&config)?;
    let conn = pool.get().await?;

    let city = std::env::args().nth(1).unwrap_or_else(|| "Vancouver".to_string());

    // ============================================
    // Example 1: inspect the plan without running it
    // ============================================
    println!("=== Query plan ===");

    let options = SearchOptions::new()
        .city(city.as_str())
        .minimum_price_per_night(50)
        .maximum_price_per_night(150)
        .minimum_rating(4);
    let plan = lightbnb_db::build_search_plan(&options, 10);
    println!("{}", plan.sql());
    for (i, value) in plan.params().iter().enumerate() {
        println!("  ${} = {:?}", i + 1, value);
    }

    // ============================================
    // Example 2: run the search
    // ============================================
    println!("\n=== Results ===");

    let listings = properties::search_properties(&conn, &options, Some(10)).await?;
    for listing in &listings {
        println!(
            "{:>5} ${:>8.2}  {:<40} rating {}",
            listing.property.id,
            f64::from(listing.property.cost_per_night) / 100.0,
            listing.property.title,
            listing
                .average_rating
                .map(|r| r.round_dp(2).to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    println!("{} properties", listings.len());

    // ============================================
    // Example 3: owner lookup
    // ============================================
    if let Some(first) = listings.first() {
        match users::get_user_with_id(&conn, first.property.owner_id).await? {
            Some(owner) => println!("\nCheapest match is listed by {}", owner.name),
            None => println!("\nOwner {} not found", first.property.owner_id),
        }
    }

    Ok(())
}
