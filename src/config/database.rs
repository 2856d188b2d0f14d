//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`; composite uniqueness rules that the
//! derive macros cannot express are added as explicit unique indexes.

use crate::entities::{
    BlogPost, Country, DiningTable, Dish, DishReview, FavoriteDish, FavoriteRestaurant, Feature,
    GalleryImage, Order, OrderItem, QrCode, QrScan, Restaurant, RestaurantReview, Service, Video,
    blog_post, dining_table, dish, dish_review, favorite_dish, favorite_restaurant,
    restaurant_review,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::{Index, IndexCreateStatement},
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {database_url}");
    if let Some(parent) = sqlite_file_parent(database_url) {
        std::fs::create_dir_all(parent)?;
    }
    Database::connect(database_url).await.map_err(Into::into)
}

/// Directory holding the database file of a `sqlite://path/to/file` URL.
fn sqlite_file_parent(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let file = rest.split('?').next().unwrap_or(rest);
    if file.is_empty() || file.starts_with(':') {
        return None;
    }
    Path::new(file)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

async fn create_table<E: EntityTrait + Copy>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }
    Ok(())
}

fn composite_unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_dishes_restaurant_slug")
            .table(Dish)
            .col(dish::Column::RestaurantId)
            .col(dish::Column::Slug)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_dish_reviews_user_dish")
            .table(DishReview)
            .col(dish_review::Column::UserId)
            .col(dish_review::Column::DishId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_restaurant_reviews_user_restaurant")
            .table(RestaurantReview)
            .col(restaurant_review::Column::UserId)
            .col(restaurant_review::Column::RestaurantId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_favorite_dishes_user_dish")
            .table(FavoriteDish)
            .col(favorite_dish::Column::UserId)
            .col(favorite_dish::Column::DishId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_favorite_restaurants_user_restaurant")
            .table(FavoriteRestaurant)
            .col(favorite_restaurant::Column::UserId)
            .col(favorite_restaurant::Column::RestaurantId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_dining_tables_restaurant_number")
            .table(DiningTable)
            .col(dining_table::Column::RestaurantId)
            .col(dining_table::Column::Number)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_blog_posts_restaurant_slug")
            .table(BlogPost)
            .col(blog_post::Column::RestaurantId)
            .col(blog_post::Column::Slug)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Parents are created before children so foreign keys resolve on backends
/// that check them at creation time.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Country).await?;
    create_table(db, &schema, Restaurant).await?;
    create_table(db, &schema, Dish).await?;
    create_table(db, &schema, DishReview).await?;
    create_table(db, &schema, RestaurantReview).await?;
    create_table(db, &schema, FavoriteDish).await?;
    create_table(db, &schema, FavoriteRestaurant).await?;
    create_table(db, &schema, Service).await?;
    create_table(db, &schema, Feature).await?;
    create_table(db, &schema, GalleryImage).await?;
    create_table(db, &schema, Video).await?;
    create_table(db, &schema, DiningTable).await?;
    create_table(db, &schema, QrCode).await?;
    create_table(db, &schema, QrScan).await?;
    create_table(db, &schema, BlogPost).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, OrderItem).await?;

    for index in composite_unique_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{country, order, restaurant};
    use sea_orm::QuerySelect;

    #[test]
    fn test_sqlite_file_parent() {
        assert_eq!(
            sqlite_file_parent("sqlite://data/restaurants.sqlite?mode=rwc"),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_file_parent("sqlite://restaurants.sqlite"), None);
        assert_eq!(sqlite_file_parent("sqlite::memory:"), None);
        assert_eq!(sqlite_file_parent("sqlite://:memory:"), None);
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<country::Model> = Country::find().limit(1).all(&db).await?;
        let _: Vec<restaurant::Model> = Restaurant::find().limit(1).all(&db).await?;
        let _: Vec<order::Model> = Order::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
