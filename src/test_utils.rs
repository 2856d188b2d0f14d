//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::settings::LimitsConfig,
    core::{
        access::{Actor, Role},
        cuisine::{self, CuisineInput},
        dish::{self, DishInput},
        restaurant::{self, NewRestaurant},
    },
    entities::{country, dish as dish_entity, restaurant as restaurant_entity},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Owner id used by [`create_test_restaurant`].
pub const TEST_OWNER_ID: &str = "owner-1";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Default caps (20 images, 5 videos).
#[must_use]
pub fn test_limits() -> LimitsConfig {
    LimitsConfig::default()
}

/// A signed-in customer.
#[must_use]
pub fn customer(user_id: &str) -> Actor {
    Actor::new(user_id, Role::Customer)
}

/// Creates a cuisine with only a name.
pub async fn create_test_cuisine(db: &DatabaseConnection, name: &str) -> Result<country::Model> {
    cuisine::create_cuisine(
        db,
        CuisineInput {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Creates an active restaurant owned by [`TEST_OWNER_ID`].
pub async fn create_test_restaurant(
    db: &DatabaseConnection,
    name: &str,
    country_id: i64,
) -> Result<restaurant_entity::Model> {
    restaurant::create_restaurant(
        db,
        NewRestaurant {
            name: name.to_string(),
            slug: None,
            country_id,
            owner_id: TEST_OWNER_ID.to_string(),
            status: None,
        },
    )
    .await
}

/// Creates an available dish in the "Mains" category.
pub async fn create_test_dish(
    db: &DatabaseConnection,
    restaurant_id: i64,
    name: &str,
    price: f64,
) -> Result<dish_entity::Model> {
    dish::create_dish(
        db,
        restaurant_id,
        DishInput {
            name: name.to_string(),
            category: "Mains".to_string(),
            price,
            ..Default::default()
        },
    )
    .await
}

/// Sets up a database with one cuisine and one active restaurant.
/// Returns (db, restaurant) for common test scenarios.
pub async fn setup_with_restaurant() -> Result<(DatabaseConnection, restaurant_entity::Model)> {
    let db = setup_test_db().await?;
    let cuisine = create_test_cuisine(&db, "Syrian").await?;
    let restaurant = create_test_restaurant(&db, "Damascus Grill", cuisine.id).await?;
    Ok((db, restaurant))
}

/// Sets up a restaurant with one dish priced at 10.0.
/// Returns (db, restaurant, dish) for menu-related tests.
pub async fn setup_with_dish() -> Result<(
    DatabaseConnection,
    restaurant_entity::Model,
    dish_entity::Model,
)> {
    let (db, restaurant) = setup_with_restaurant().await?;
    let dish = create_test_dish(&db, restaurant.id, "Shawarma", 10.0).await?;
    Ok((db, restaurant, dish))
}
