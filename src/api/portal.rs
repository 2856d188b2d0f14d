//! Owner portal endpoints under `/api/portal/restaurants/{id}`.
//!
//! Every handler first checks that the caller owns the restaurant (or is an
//! administrator), then drops the restaurant's cached pages after a write.

use super::{
    AppState,
    extractor::{JsonBody, PathParam, QueryParams},
    response::{ActionResponse, ApiResult, done, done_empty},
};
use crate::{
    cache::{RESTAURANTS_TAG, restaurant_tag},
    core::{
        access::{self, Actor},
        blog::{self, BlogPostInput},
        dish::{self, DishInput, MenuSection},
        feature,
        gallery::{self, GalleryImageInput},
        highlight::HighlightInput,
        order::{self, OrderWithItems},
        qr::{self, QrStats},
        restaurant::{self, RestaurantProfile},
        service,
        table::{self, TableInput},
        video::{self, VideoInput},
    },
    entities::{
        OrderStatus, blog_post, dining_table, dish as dish_entity, feature as feature_entity,
        gallery_image, order as order_entity, restaurant as restaurant_entity,
        service as service_entity, video as video_entity,
    },
};
use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;

const SAVED: &str = "تم الحفظ بنجاح";
const DELETED: &str = "تم الحذف بنجاح";

async fn manage(state: &AppState, actor: &Actor, restaurant_id: i64) -> ApiResult<restaurant_entity::Model> {
    access::ensure_can_manage(&*state.db, actor, restaurant_id).await
}

async fn revalidate(state: &AppState, restaurant_id: i64) {
    state.cache.revalidate_tag(&restaurant_tag(restaurant_id)).await;
}

/// GET /api/portal/restaurants - restaurants the caller may manage.
pub async fn my_restaurants(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Json<Vec<restaurant_entity::Model>>> {
    let restaurants = if actor.is_admin() {
        restaurant::list_restaurants(&*state.db).await?
    } else {
        restaurant::list_owned(&*state.db, &actor.user_id).await?
    };
    Ok(Json(restaurants))
}

// --- Profile ---

/// GET /api/portal/restaurants/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<restaurant_entity::Model>> {
    Ok(Json(manage(&state, &actor, id).await?))
}

/// PUT /api/portal/restaurants/{id}
pub async fn update_profile(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(profile): JsonBody<RestaurantProfile>,
) -> ApiResult<Json<ActionResponse<restaurant_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let updated = restaurant::update_profile(&*state.db, id, profile).await?;
    state
        .cache
        .revalidate_tags([restaurant_tag(id), RESTAURANTS_TAG.to_string()])
        .await;
    Ok(done(SAVED, updated))
}

// --- Dishes ---

/// GET /api/portal/restaurants/{id}/dishes - full menu, sold-out dishes included.
pub async fn list_dishes(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Vec<MenuSection>>> {
    manage(&state, &actor, id).await?;
    Ok(Json(dish::list_menu(&*state.db, id, true).await?))
}

/// POST /api/portal/restaurants/{id}/dishes
pub async fn create_dish(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<DishInput>,
) -> ApiResult<Json<ActionResponse<dish_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let created = dish::create_dish(&*state.db, id, input).await?;
    revalidate(&state, id).await;
    Ok(done("تمت إضافة الطبق", created))
}

/// PUT /api/portal/restaurants/{id}/dishes/{dish_id}
pub async fn update_dish(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, dish_id)): PathParam<(i64, i64)>,
    JsonBody(input): JsonBody<DishInput>,
) -> ApiResult<Json<ActionResponse<dish_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let updated = dish::update_dish(&*state.db, id, dish_id, input).await?;
    revalidate(&state, id).await;
    Ok(done(SAVED, updated))
}

/// Body of a dish availability toggle.
#[derive(Debug, Deserialize)]
pub struct AvailabilityInput {
    /// Whether the dish shows on the public menu
    pub is_available: bool,
}

/// PUT /api/portal/restaurants/{id}/dishes/{dish_id}/availability
pub async fn set_dish_availability(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, dish_id)): PathParam<(i64, i64)>,
    JsonBody(input): JsonBody<AvailabilityInput>,
) -> ApiResult<Json<ActionResponse<dish_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let updated = dish::set_availability(&*state.db, id, dish_id, input.is_available).await?;
    revalidate(&state, id).await;
    Ok(done(SAVED, updated))
}

/// DELETE /api/portal/restaurants/{id}/dishes/{dish_id}
pub async fn delete_dish(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, dish_id)): PathParam<(i64, i64)>,
) -> ApiResult<Json<ActionResponse<()>>> {
    manage(&state, &actor, id).await?;
    dish::delete_dish(&*state.db, id, dish_id).await?;
    revalidate(&state, id).await;
    Ok(done_empty(DELETED))
}

// --- Gallery ---

/// Body of a gallery or video reorder.
#[derive(Debug, Deserialize)]
pub struct ReorderInput {
    /// Every item id, in the new order
    pub ids: Vec<i64>,
}

/// Body of a gallery caption edit.
#[derive(Debug, Deserialize)]
pub struct CaptionInput {
    /// New caption; blank clears it
    #[serde(default)]
    pub caption: Option<String>,
}

/// GET /api/portal/restaurants/{id}/gallery
pub async fn list_gallery(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Vec<gallery_image::Model>>> {
    manage(&state, &actor, id).await?;
    Ok(Json(gallery::list_images(&*state.db, id).await?))
}

/// POST /api/portal/restaurants/{id}/gallery
pub async fn add_gallery_image(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<GalleryImageInput>,
) -> ApiResult<Json<ActionResponse<gallery_image::Model>>> {
    manage(&state, &actor, id).await?;
    let limit = state.config.limits.max_gallery_images;
    let image = gallery::add_image(&*state.db, id, input, limit).await?;
    revalidate(&state, id).await;
    Ok(done("تمت إضافة الصورة", image))
}

/// PUT /api/portal/restaurants/{id}/gallery/{image_id}
pub async fn update_gallery_caption(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, image_id)): PathParam<(i64, i64)>,
    JsonBody(input): JsonBody<CaptionInput>,
) -> ApiResult<Json<ActionResponse<gallery_image::Model>>> {
    manage(&state, &actor, id).await?;
    let image = gallery::update_caption(&*state.db, id, image_id, input.caption).await?;
    revalidate(&state, id).await;
    Ok(done(SAVED, image))
}

/// DELETE /api/portal/restaurants/{id}/gallery/{image_id}
pub async fn remove_gallery_image(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, image_id)): PathParam<(i64, i64)>,
) -> ApiResult<Json<ActionResponse<()>>> {
    manage(&state, &actor, id).await?;
    gallery::remove_image(&*state.db, id, image_id).await?;
    revalidate(&state, id).await;
    Ok(done_empty(DELETED))
}

/// PUT /api/portal/restaurants/{id}/gallery/order
pub async fn reorder_gallery(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<ReorderInput>,
) -> ApiResult<Json<ActionResponse<Vec<gallery_image::Model>>>> {
    manage(&state, &actor, id).await?;
    let images = gallery::reorder_images(&*state.db, id, &input.ids).await?;
    revalidate(&state, id).await;
    Ok(done("تم حفظ الترتيب", images))
}

// --- Videos ---

/// GET /api/portal/restaurants/{id}/videos
pub async fn list_videos(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Vec<video_entity::Model>>> {
    manage(&state, &actor, id).await?;
    Ok(Json(video::list_videos(&*state.db, id).await?))
}

/// POST /api/portal/restaurants/{id}/videos
pub async fn add_video(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<VideoInput>,
) -> ApiResult<Json<ActionResponse<video_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let limit = state.config.limits.max_videos;
    let added = video::add_video(&*state.db, id, input, limit).await?;
    revalidate(&state, id).await;
    Ok(done("تمت إضافة الفيديو", added))
}

/// DELETE /api/portal/restaurants/{id}/videos/{video_id}
pub async fn remove_video(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, video_id)): PathParam<(i64, i64)>,
) -> ApiResult<Json<ActionResponse<()>>> {
    manage(&state, &actor, id).await?;
    video::remove_video(&*state.db, id, video_id).await?;
    revalidate(&state, id).await;
    Ok(done_empty(DELETED))
}

/// PUT /api/portal/restaurants/{id}/videos/order
pub async fn reorder_videos(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<ReorderInput>,
) -> ApiResult<Json<ActionResponse<Vec<video_entity::Model>>>> {
    manage(&state, &actor, id).await?;
    let videos = video::reorder_videos(&*state.db, id, &input.ids).await?;
    revalidate(&state, id).await;
    Ok(done("تم حفظ الترتيب", videos))
}

// --- Tables ---

/// GET /api/portal/restaurants/{id}/tables
pub async fn list_tables(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Vec<dining_table::Model>>> {
    manage(&state, &actor, id).await?;
    Ok(Json(table::list_tables(&*state.db, id).await?))
}

/// POST /api/portal/restaurants/{id}/tables
pub async fn create_table(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<TableInput>,
) -> ApiResult<Json<ActionResponse<dining_table::Model>>> {
    manage(&state, &actor, id).await?;
    let created = table::create_dining_table(&*state.db, id, input).await?;
    Ok(done("تمت إضافة الطاولة", created))
}

/// PUT /api/portal/restaurants/{id}/tables/{table_id}
pub async fn update_table(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, table_id)): PathParam<(i64, i64)>,
    JsonBody(input): JsonBody<TableInput>,
) -> ApiResult<Json<ActionResponse<dining_table::Model>>> {
    manage(&state, &actor, id).await?;
    let updated = table::update_dining_table(&*state.db, id, table_id, input).await?;
    Ok(done(SAVED, updated))
}

/// DELETE /api/portal/restaurants/{id}/tables/{table_id}
pub async fn delete_table(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, table_id)): PathParam<(i64, i64)>,
) -> ApiResult<Json<ActionResponse<()>>> {
    manage(&state, &actor, id).await?;
    table::delete_dining_table(&*state.db, id, table_id).await?;
    Ok(done_empty(DELETED))
}

// --- Services and features ---

/// GET /api/portal/restaurants/{id}/services
pub async fn list_services(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Vec<service_entity::Model>>> {
    manage(&state, &actor, id).await?;
    Ok(Json(service::list_services(&*state.db, id).await?))
}

/// POST /api/portal/restaurants/{id}/services
pub async fn create_service(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<HighlightInput>,
) -> ApiResult<Json<ActionResponse<service_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let created = service::create_service(&*state.db, id, input).await?;
    revalidate(&state, id).await;
    Ok(done("تمت إضافة الخدمة", created))
}

/// PUT /api/portal/restaurants/{id}/services/{item_id}
pub async fn update_service(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, item_id)): PathParam<(i64, i64)>,
    JsonBody(input): JsonBody<HighlightInput>,
) -> ApiResult<Json<ActionResponse<service_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let updated = service::update_service(&*state.db, id, item_id, input).await?;
    revalidate(&state, id).await;
    Ok(done(SAVED, updated))
}

/// DELETE /api/portal/restaurants/{id}/services/{item_id}
pub async fn delete_service(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, item_id)): PathParam<(i64, i64)>,
) -> ApiResult<Json<ActionResponse<()>>> {
    manage(&state, &actor, id).await?;
    service::delete_service(&*state.db, id, item_id).await?;
    revalidate(&state, id).await;
    Ok(done_empty(DELETED))
}

/// GET /api/portal/restaurants/{id}/features
pub async fn list_features(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Vec<feature_entity::Model>>> {
    manage(&state, &actor, id).await?;
    Ok(Json(feature::list_features(&*state.db, id).await?))
}

/// POST /api/portal/restaurants/{id}/features
pub async fn create_feature(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<HighlightInput>,
) -> ApiResult<Json<ActionResponse<feature_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let created = feature::create_feature(&*state.db, id, input).await?;
    revalidate(&state, id).await;
    Ok(done("تمت إضافة الميزة", created))
}

/// PUT /api/portal/restaurants/{id}/features/{item_id}
pub async fn update_feature(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, item_id)): PathParam<(i64, i64)>,
    JsonBody(input): JsonBody<HighlightInput>,
) -> ApiResult<Json<ActionResponse<feature_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let updated = feature::update_feature(&*state.db, id, item_id, input).await?;
    revalidate(&state, id).await;
    Ok(done(SAVED, updated))
}

/// DELETE /api/portal/restaurants/{id}/features/{item_id}
pub async fn delete_feature(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, item_id)): PathParam<(i64, i64)>,
) -> ApiResult<Json<ActionResponse<()>>> {
    manage(&state, &actor, id).await?;
    feature::delete_feature(&*state.db, id, item_id).await?;
    revalidate(&state, id).await;
    Ok(done_empty(DELETED))
}

// --- Blog ---

/// GET /api/portal/restaurants/{id}/blog - drafts included.
pub async fn list_posts(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Vec<blog_post::Model>>> {
    manage(&state, &actor, id).await?;
    Ok(Json(blog::list_posts(&*state.db, id).await?))
}

/// POST /api/portal/restaurants/{id}/blog
pub async fn create_post(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<BlogPostInput>,
) -> ApiResult<Json<ActionResponse<blog_post::Model>>> {
    manage(&state, &actor, id).await?;
    let created = blog::create_post(&*state.db, id, input).await?;
    revalidate(&state, id).await;
    Ok(done("تم نشر المقال", created))
}

/// PUT /api/portal/restaurants/{id}/blog/{post_id}
pub async fn update_post(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, post_id)): PathParam<(i64, i64)>,
    JsonBody(input): JsonBody<BlogPostInput>,
) -> ApiResult<Json<ActionResponse<blog_post::Model>>> {
    manage(&state, &actor, id).await?;
    let updated = blog::update_post(&*state.db, id, post_id, input).await?;
    revalidate(&state, id).await;
    Ok(done(SAVED, updated))
}

/// DELETE /api/portal/restaurants/{id}/blog/{post_id}
pub async fn delete_post(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, post_id)): PathParam<(i64, i64)>,
) -> ApiResult<Json<ActionResponse<()>>> {
    manage(&state, &actor, id).await?;
    blog::delete_post(&*state.db, id, post_id).await?;
    revalidate(&state, id).await;
    Ok(done_empty(DELETED))
}

// --- Orders ---

/// Query string of the order list.
#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    /// Only orders in this status
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// GET /api/portal/restaurants/{id}/orders?status=
pub async fn list_orders(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    QueryParams(filter): QueryParams<OrderFilter>,
) -> ApiResult<Json<Vec<order_entity::Model>>> {
    manage(&state, &actor, id).await?;
    Ok(Json(order::list_orders(&*state.db, id, filter.status).await?))
}

/// GET /api/portal/restaurants/{id}/orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, order_id)): PathParam<(i64, i64)>,
) -> ApiResult<Json<OrderWithItems>> {
    manage(&state, &actor, id).await?;
    Ok(Json(order::get_order(&*state.db, id, order_id).await?))
}

/// Body of an order status change.
#[derive(Debug, Deserialize)]
pub struct StatusInput {
    /// New status
    pub status: OrderStatus,
}

/// PUT /api/portal/restaurants/{id}/orders/{order_id}/status
pub async fn set_order_status(
    State(state): State<AppState>,
    actor: Actor,
    PathParam((id, order_id)): PathParam<(i64, i64)>,
    JsonBody(input): JsonBody<StatusInput>,
) -> ApiResult<Json<ActionResponse<order_entity::Model>>> {
    manage(&state, &actor, id).await?;
    let updated = order::set_order_status(&*state.db, id, order_id, input.status).await?;
    Ok(done("تم تحديث حالة الطلب", updated))
}

// --- QR ---

/// Query string of the QR statistics.
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    /// Days of history; 30 when absent
    #[serde(default)]
    pub days: Option<u32>,
}

/// GET /api/portal/restaurants/{id}/qr?days=
pub async fn qr_stats(
    State(state): State<AppState>,
    actor: Actor,
    PathParam(id): PathParam<i64>,
    QueryParams(params): QueryParams<StatsParams>,
) -> ApiResult<Json<QrStats>> {
    manage(&state, &actor, id).await?;
    let days = params.days.unwrap_or(qr::DEFAULT_STATS_DAYS);
    Ok(Json(qr::get_stats(&*state.db, id, days).await?))
}
