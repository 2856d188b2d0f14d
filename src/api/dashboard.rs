//! Admin dashboard endpoints: cuisines and restaurant listings.

use super::{
    AppState,
    extractor::{JsonBody, PathParam},
    response::{ActionResponse, ApiResult, done, done_empty},
};
use crate::{
    cache::{CUISINES_TAG, RESTAURANTS_TAG, cuisine_tag, restaurant_tag},
    core::{
        access::{self, Actor},
        cuisine::{self, CuisineInput},
        restaurant::{self, NewRestaurant},
    },
    entities::{RestaurantStatus, country, restaurant as restaurant_entity},
};
use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;
use tracing::info;

async fn revalidate_listings(state: &AppState) {
    state
        .cache
        .revalidate_tags([CUISINES_TAG, RESTAURANTS_TAG])
        .await;
}

/// GET /api/dashboard/cuisines
pub async fn list_cuisines(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Json<Vec<country::Model>>> {
    access::ensure_admin(&actor)?;
    Ok(Json(cuisine::list_cuisines(&*state.db).await?))
}

/// POST /api/dashboard/cuisines
pub async fn create_cuisine(
    State(state): State<AppState>,
    actor: Actor,
    JsonBody(input): JsonBody<CuisineInput>,
) -> ApiResult<Json<ActionResponse<country::Model>>> {
    access::ensure_admin(&actor)?;
    let created = cuisine::create_cuisine(&*state.db, input).await?;
    revalidate_listings(&state).await;
    Ok(done("تمت إضافة المطبخ", created))
}

/// PUT /api/dashboard/cuisines/{id}
pub async fn update_cuisine(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<CuisineInput>,
) -> ApiResult<Json<ActionResponse<country::Model>>> {
    access::ensure_admin(&actor)?;
    let updated = cuisine::update_cuisine(&*state.db, id, input).await?;
    state.cache.revalidate_tag(&cuisine_tag(id)).await;
    revalidate_listings(&state).await;
    Ok(done("تم تحديث المطبخ", updated))
}

/// DELETE /api/dashboard/cuisines/{id}
pub async fn delete_cuisine(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<ActionResponse<()>>> {
    access::ensure_admin(&actor)?;
    cuisine::delete_cuisine(&*state.db, id).await?;
    state.cache.revalidate_tag(&cuisine_tag(id)).await;
    revalidate_listings(&state).await;
    Ok(done_empty("تم حذف المطبخ"))
}

/// GET /api/dashboard/restaurants - every restaurant, whatever its status.
pub async fn list_restaurants(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Json<Vec<restaurant_entity::Model>>> {
    access::ensure_admin(&actor)?;
    Ok(Json(restaurant::list_restaurants(&*state.db).await?))
}

/// POST /api/dashboard/restaurants
pub async fn create_restaurant(
    State(state): State<AppState>,
    actor: Actor,
    JsonBody(input): JsonBody<NewRestaurant>,
) -> ApiResult<Json<ActionResponse<restaurant_entity::Model>>> {
    access::ensure_admin(&actor)?;
    let created = restaurant::create_restaurant(&*state.db, input).await?;
    revalidate_listings(&state).await;
    Ok(done("تمت إضافة المطعم", created))
}

/// Body of a restaurant status change.
#[derive(Debug, Deserialize)]
pub struct StatusInput {
    /// New status
    pub status: RestaurantStatus,
}

/// PUT /api/dashboard/restaurants/{id}/status
pub async fn set_restaurant_status(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<StatusInput>,
) -> ApiResult<Json<ActionResponse<restaurant_entity::Model>>> {
    access::ensure_admin(&actor)?;
    let updated = restaurant::set_status(&*state.db, id, input.status).await?;
    state.cache.revalidate_tag(&restaurant_tag(id)).await;
    revalidate_listings(&state).await;
    Ok(done("تم تحديث حالة المطعم", updated))
}

/// DELETE /api/dashboard/restaurants/{id}
pub async fn delete_restaurant(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<ActionResponse<()>>> {
    access::ensure_admin(&actor)?;
    restaurant::delete_restaurant(&*state.db, id).await?;
    state.cache.revalidate_tag(&restaurant_tag(id)).await;
    revalidate_listings(&state).await;
    info!(restaurant_id = id, admin = %actor.user_id, "restaurant removed from dashboard");
    Ok(done_empty("تم حذف المطعم"))
}
