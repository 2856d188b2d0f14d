//! Favorite business logic - per-user bookmarks of dishes and restaurants.
//!
//! Favorites are toggled: the first call adds the pair, the second removes it.

use crate::{
    entities::{
        Dish, FavoriteDish, FavoriteRestaurant, Restaurant, dish, favorite_dish,
        favorite_restaurant, restaurant,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, instrument};

/// Adds the dish to the user's favorites, or removes it if already there.
///
/// Returns `true` when the dish is a favorite after the call.
#[instrument(skip(db))]
pub async fn toggle_favorite_dish(
    db: &DatabaseConnection,
    user_id: &str,
    dish_id: i64,
) -> Result<bool> {
    if Dish::find_by_id(dish_id).one(db).await?.is_none() {
        return Err(Error::not_found("dish", dish_id));
    }

    let existing = FavoriteDish::find()
        .filter(favorite_dish::Column::UserId.eq(user_id))
        .filter(favorite_dish::Column::DishId.eq(dish_id))
        .one(db)
        .await?;

    if let Some(favorite) = existing {
        favorite.delete(db).await?;
        debug!("dish removed from favorites");
        return Ok(false);
    }

    favorite_dish::ActiveModel {
        user_id: Set(user_id.to_string()),
        dish_id: Set(dish_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!("dish added to favorites");
    Ok(true)
}

/// Adds the restaurant to the user's favorites, or removes it if already there.
///
/// Returns `true` when the restaurant is a favorite after the call.
#[instrument(skip(db))]
pub async fn toggle_favorite_restaurant(
    db: &DatabaseConnection,
    user_id: &str,
    restaurant_id: i64,
) -> Result<bool> {
    if Restaurant::find_by_id(restaurant_id).one(db).await?.is_none() {
        return Err(Error::not_found("restaurant", restaurant_id));
    }

    let existing = FavoriteRestaurant::find()
        .filter(favorite_restaurant::Column::UserId.eq(user_id))
        .filter(favorite_restaurant::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?;

    if let Some(favorite) = existing {
        favorite.delete(db).await?;
        return Ok(false);
    }

    favorite_restaurant::ActiveModel {
        user_id: Set(user_id.to_string()),
        restaurant_id: Set(restaurant_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(true)
}

/// Whether the user has bookmarked the dish.
pub async fn is_favorite_dish(
    db: &DatabaseConnection,
    user_id: &str,
    dish_id: i64,
) -> Result<bool> {
    Ok(FavoriteDish::find()
        .filter(favorite_dish::Column::UserId.eq(user_id))
        .filter(favorite_dish::Column::DishId.eq(dish_id))
        .one(db)
        .await?
        .is_some())
}

/// Whether the user has bookmarked the restaurant.
pub async fn is_favorite_restaurant(
    db: &DatabaseConnection,
    user_id: &str,
    restaurant_id: i64,
) -> Result<bool> {
    Ok(FavoriteRestaurant::find()
        .filter(favorite_restaurant::Column::UserId.eq(user_id))
        .filter(favorite_restaurant::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .is_some())
}

/// The user's favorite dishes, most recently bookmarked first.
pub async fn list_favorite_dishes(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<dish::Model>> {
    let favorites = FavoriteDish::find()
        .filter(favorite_dish::Column::UserId.eq(user_id))
        .order_by_desc(favorite_dish::Column::CreatedAt)
        .order_by_desc(favorite_dish::Column::Id)
        .find_also_related(Dish)
        .all(db)
        .await?;
    Ok(favorites.into_iter().filter_map(|(_, dish)| dish).collect())
}

/// The user's favorite restaurants, most recently bookmarked first.
pub async fn list_favorite_restaurants(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<restaurant::Model>> {
    let favorites = FavoriteRestaurant::find()
        .filter(favorite_restaurant::Column::UserId.eq(user_id))
        .order_by_desc(favorite_restaurant::Column::CreatedAt)
        .order_by_desc(favorite_restaurant::Column::Id)
        .find_also_related(Restaurant)
        .all(db)
        .await?;
    Ok(favorites
        .into_iter()
        .filter_map(|(_, restaurant)| restaurant)
        .collect())
}
