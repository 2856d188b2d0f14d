//! Endpoints for signed-in visitors: reviews, favorites and ordering.

use super::{
    AppState,
    extractor::{JsonBody, PathParam},
    response::{ActionResponse, ApiResult, done},
};
use crate::{
    cache::{RESTAURANTS_TAG, restaurant_tag},
    core::{
        access::Actor,
        dish, favorite,
        order::{self, OrderWithItems, PlaceOrder},
        restaurant,
        review::{self, ReviewInput},
    },
    entities::{dish as dish_entity, dish_review, restaurant as restaurant_entity, restaurant_review},
    errors::Error,
};
use axum::{
    Json,
    extract::State,
};
use serde::Serialize;

async fn revalidate_restaurant(state: &AppState, restaurant_id: i64) {
    state
        .cache
        .revalidate_tags([restaurant_tag(restaurant_id), RESTAURANTS_TAG.to_string()])
        .await;
}

/// POST /api/restaurants/{slug}/reviews
pub async fn submit_restaurant_review(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(slug): PathParam<String>,
    JsonBody(input): JsonBody<ReviewInput>,
) -> ApiResult<Json<ActionResponse<restaurant_review::Model>>> {
    let restaurant = restaurant::require_public_restaurant(&*state.db, &slug).await?;
    let review = review::submit_restaurant_review(&*state.db, &actor, restaurant.id, input).await?;
    revalidate_restaurant(&state, restaurant.id).await;
    Ok(done("شكراً لك! تم إضافة تقييمك", review))
}

/// PUT /api/reviews/{id}
pub async fn update_restaurant_review(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(review_id): PathParam<i64>,
    JsonBody(input): JsonBody<ReviewInput>,
) -> ApiResult<Json<ActionResponse<restaurant_review::Model>>> {
    let review = review::update_restaurant_review(&*state.db, &actor, review_id, input).await?;
    revalidate_restaurant(&state, review.restaurant_id).await;
    Ok(done("تم تحديث تقييمك", review))
}

/// DELETE /api/reviews/{id}
pub async fn delete_restaurant_review(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(review_id): PathParam<i64>,
) -> ApiResult<Json<ActionResponse<restaurant_entity::Model>>> {
    let restaurant = review::delete_restaurant_review(&*state.db, &actor, review_id).await?;
    revalidate_restaurant(&state, restaurant.id).await;
    Ok(done("تم حذف التقييم", restaurant))
}

/// POST /api/dishes/{id}/reviews - creates or replaces the caller's review.
pub async fn submit_dish_review(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(dish_id): PathParam<i64>,
    JsonBody(input): JsonBody<ReviewInput>,
) -> ApiResult<Json<ActionResponse<dish_review::Model>>> {
    let (review, created) = review::submit_dish_review(&*state.db, &actor, dish_id, input).await?;
    if let Some(dish) = dish::get_dish_by_id(&*state.db, dish_id).await? {
        state.cache.revalidate_tag(&restaurant_tag(dish.restaurant_id)).await;
    }
    let message = if created {
        "شكراً لك! تم إضافة تقييمك"
    } else {
        "تم تحديث تقييمك"
    };
    Ok(done(message, review))
}

/// DELETE /api/dishes/reviews/{id}
pub async fn delete_dish_review(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(review_id): PathParam<i64>,
) -> ApiResult<Json<ActionResponse<dish_entity::Model>>> {
    let dish = review::delete_dish_review(&*state.db, &actor, review_id).await?;
    state.cache.revalidate_tag(&restaurant_tag(dish.restaurant_id)).await;
    Ok(done("تم حذف التقييم", dish))
}

/// Whether the item is now bookmarked.
#[derive(Debug, Serialize)]
pub struct FavoriteState {
    /// `true` after adding, `false` after removing
    pub is_favorite: bool,
}

fn favorite_message(is_favorite: bool) -> &'static str {
    if is_favorite {
        "تمت الإضافة إلى المفضلة"
    } else {
        "تمت الإزالة من المفضلة"
    }
}

/// POST /api/favorites/dishes/{id}
pub async fn toggle_favorite_dish(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(dish_id): PathParam<i64>,
) -> ApiResult<Json<ActionResponse<FavoriteState>>> {
    let is_favorite = favorite::toggle_favorite_dish(&*state.db, &actor.user_id, dish_id).await?;
    Ok(done(favorite_message(is_favorite), FavoriteState { is_favorite }))
}

/// POST /api/favorites/restaurants/{id}
pub async fn toggle_favorite_restaurant(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(restaurant_id): PathParam<i64>,
) -> ApiResult<Json<ActionResponse<FavoriteState>>> {
    let is_favorite =
        favorite::toggle_favorite_restaurant(&*state.db, &actor.user_id, restaurant_id).await?;
    Ok(done(favorite_message(is_favorite), FavoriteState { is_favorite }))
}

/// GET /api/favorites/dishes/{id}
pub async fn favorite_dish_status(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(dish_id): PathParam<i64>,
) -> ApiResult<Json<FavoriteState>> {
    let is_favorite = favorite::is_favorite_dish(&*state.db, &actor.user_id, dish_id).await?;
    Ok(Json(FavoriteState { is_favorite }))
}

/// GET /api/favorites/restaurants/{id}
pub async fn favorite_restaurant_status(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(restaurant_id): PathParam<i64>,
) -> ApiResult<Json<FavoriteState>> {
    let is_favorite =
        favorite::is_favorite_restaurant(&*state.db, &actor.user_id, restaurant_id).await?;
    Ok(Json(FavoriteState { is_favorite }))
}

/// The caller's bookmarks.
#[derive(Debug, Serialize)]
pub struct Favorites {
    /// Favorite dishes, newest first
    pub dishes: Vec<dish_entity::Model>,
    /// Favorite restaurants, newest first
    pub restaurants: Vec<restaurant_entity::Model>,
}

/// GET /api/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Json<Favorites>> {
    Ok(Json(Favorites {
        dishes: favorite::list_favorite_dishes(&*state.db, &actor.user_id).await?,
        restaurants: favorite::list_favorite_restaurants(&*state.db, &actor.user_id).await?,
    }))
}

/// POST /api/restaurants/{slug}/orders
pub async fn place_order(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(slug): PathParam<String>,
    JsonBody(input): JsonBody<PlaceOrder>,
) -> ApiResult<Json<ActionResponse<OrderWithItems>>> {
    let restaurant = restaurant::get_public_restaurant(&*state.db, &slug)
        .await?
        .ok_or_else(|| Error::not_found("restaurant", &slug))?;
    let placed = order::place_order(
        &*state.db,
        restaurant.id,
        Some(&actor.user_id),
        input,
        state.config.orders.tax_rate,
    )
    .await?;
    Ok(done("تم إرسال طلبك بنجاح", placed))
}
