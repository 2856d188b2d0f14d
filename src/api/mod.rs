//! HTTP API - axum router, shared state and handlers.
//!
//! | Prefix | Who |
//! |--------|-----|
//! | `/api/cuisines`, `/api/restaurants`, `/api/cart` | anyone |
//! | `/api/reviews`, `/api/favorites`, order and review posts | signed-in visitors |
//! | `/api/portal` | restaurant owner or admin |
//! | `/api/dashboard` | admin |
//! | `/qr/{slug}` | anyone (scan tracking redirect) |

pub mod account;
pub mod dashboard;
pub mod extractor;
pub mod portal;
pub mod public;
pub mod response;

use crate::{cache::PageCache, config::settings::AppConfig};
use axum::{
    Router,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// State shared by every handler.
///
/// The connection sits behind an `Arc` since `DatabaseConnection` is not
/// `Clone` when sea-orm's `mock` feature is enabled.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
    /// Settings loaded at startup
    pub config: Arc<AppConfig>,
    /// Rendered public pages
    pub cache: PageCache,
}

impl AppState {
    /// Wraps a connection and settings with an empty page cache.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db: Arc::new(db),
            cache: PageCache::with_capacity(config.server.page_cache_entries),
            config: Arc::new(config),
        }
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cuisines", get(public::list_cuisines))
        .route(
            "/api/cuisines/{slug}/restaurants",
            get(public::cuisine_restaurants),
        )
        .route("/api/restaurants", get(public::search_restaurants))
        .route("/api/restaurants/top", get(public::top_rated))
        .route("/api/restaurants/{slug}", get(public::restaurant_page))
        .route("/api/restaurants/{slug}/menu", get(public::menu))
        .route(
            "/api/restaurants/{slug}/dishes/{dish}",
            get(public::dish_page),
        )
        .route(
            "/api/restaurants/{slug}/reviews",
            get(public::restaurant_reviews).post(account::submit_restaurant_review),
        )
        .route("/api/restaurants/{slug}/blog", get(public::blog_posts))
        .route("/api/restaurants/{slug}/blog/{post}", get(public::blog_post))
        .route("/api/restaurants/{slug}/qr", get(public::qr_links))
        .route("/api/restaurants/{slug}/orders", post(account::place_order))
        .route("/api/cart/preview", post(public::preview_cart))
        .route("/qr/{slug}", get(public::scan))
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reviews/{id}",
            put(account::update_restaurant_review).delete(account::delete_restaurant_review),
        )
        .route(
            "/api/dishes/{id}/reviews",
            get(public::dish_reviews).post(account::submit_dish_review),
        )
        .route(
            "/api/dishes/reviews/{id}",
            axum::routing::delete(account::delete_dish_review),
        )
        .route(
            "/api/favorites/dishes/{id}",
            get(account::favorite_dish_status).post(account::toggle_favorite_dish),
        )
        .route(
            "/api/favorites/restaurants/{id}",
            get(account::favorite_restaurant_status).post(account::toggle_favorite_restaurant),
        )
        .route("/api/favorites", get(account::list_favorites))
}

fn portal_routes() -> Router<AppState> {
    const BASE: &str = "/api/portal/restaurants/{id}";
    let path = |suffix: &str| format!("{BASE}{suffix}");

    Router::new()
        .route("/api/portal/restaurants", get(portal::my_restaurants))
        .route(BASE, get(portal::get_profile).put(portal::update_profile))
        .route(
            &path("/dishes"),
            get(portal::list_dishes).post(portal::create_dish),
        )
        .route(
            &path("/dishes/{dish_id}"),
            put(portal::update_dish).delete(portal::delete_dish),
        )
        .route(
            &path("/dishes/{dish_id}/availability"),
            put(portal::set_dish_availability),
        )
        .route(
            &path("/gallery"),
            get(portal::list_gallery).post(portal::add_gallery_image),
        )
        .route(&path("/gallery/order"), put(portal::reorder_gallery))
        .route(
            &path("/gallery/{image_id}"),
            put(portal::update_gallery_caption).delete(portal::remove_gallery_image),
        )
        .route(
            &path("/videos"),
            get(portal::list_videos).post(portal::add_video),
        )
        .route(&path("/videos/order"), put(portal::reorder_videos))
        .route(
            &path("/videos/{video_id}"),
            axum::routing::delete(portal::remove_video),
        )
        .route(
            &path("/tables"),
            get(portal::list_tables).post(portal::create_table),
        )
        .route(
            &path("/tables/{table_id}"),
            put(portal::update_table).delete(portal::delete_table),
        )
        .route(
            &path("/services"),
            get(portal::list_services).post(portal::create_service),
        )
        .route(
            &path("/services/{item_id}"),
            put(portal::update_service).delete(portal::delete_service),
        )
        .route(
            &path("/features"),
            get(portal::list_features).post(portal::create_feature),
        )
        .route(
            &path("/features/{item_id}"),
            put(portal::update_feature).delete(portal::delete_feature),
        )
        .route(
            &path("/blog"),
            get(portal::list_posts).post(portal::create_post),
        )
        .route(
            &path("/blog/{post_id}"),
            put(portal::update_post).delete(portal::delete_post),
        )
        .route(&path("/orders"), get(portal::list_orders))
        .route(&path("/orders/{order_id}"), get(portal::get_order))
        .route(
            &path("/orders/{order_id}/status"),
            put(portal::set_order_status),
        )
        .route(&path("/qr"), get(portal::qr_stats))
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/dashboard/cuisines",
            get(dashboard::list_cuisines).post(dashboard::create_cuisine),
        )
        .route(
            "/api/dashboard/cuisines/{id}",
            put(dashboard::update_cuisine).delete(dashboard::delete_cuisine),
        )
        .route(
            "/api/dashboard/restaurants",
            get(dashboard::list_restaurants).post(dashboard::create_restaurant),
        )
        .route(
            "/api/dashboard/restaurants/{id}",
            axum::routing::delete(dashboard::delete_restaurant),
        )
        .route(
            "/api/dashboard/restaurants/{id}/status",
            put(dashboard::set_restaurant_status),
        )
}

/// Every route, without middleware or state.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(account_routes())
        .merge(portal_routes())
        .merge(dashboard_routes())
}

/// The application served by `main` and exercised by the tests.
pub fn build_app(state: AppState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
