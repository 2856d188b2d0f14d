//! Public read endpoints, cart preview and QR tracking.
//!
//! Page-level reads go through the [`PageCache`](crate::cache::PageCache)
//! keyed by request URI and tagged with what they render.

use super::{
    AppState,
    extractor::{JsonBody, PathParam, QueryParams},
    response::ApiResult,
};
use crate::{
    cache::{CUISINES_TAG, RESTAURANTS_TAG, cuisine_tag, restaurant_tag},
    core::{
        blog, cuisine, dish, feature, gallery,
        order::{self, CartLine, CartPreview},
        qr, restaurant, review, service, share, video,
    },
    entities::{
        blog_post, country, dish as dish_entity, dish_review, feature as feature_entity, gallery_image,
        restaurant as restaurant_entity, service as service_entity, video as video_entity,
    },
    errors::Error,
};
use axum::{
    Json,
    extract::State,
    http::Uri,
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use tracing::debug;

/// How many restaurants the "top rated" strip shows.
const TOP_RATED_LIMIT: u64 = 10;

async fn cached<T, Fut, Tags>(state: &AppState, uri: &Uri, load: Fut, tags: Tags) -> ApiResult<Json<Value>>
where
    T: Serialize,
    Fut: Future<Output = crate::errors::Result<T>>,
    Tags: FnOnce(&T) -> Vec<String>,
{
    let key = uri.to_string();
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(Json(hit));
    }
    let data = load.await?;
    let tags = tags(&data);
    let value = serde_json::to_value(&data)?;
    state.cache.put(&key, &tags, value.clone()).await;
    debug!(key, "page cached");
    Ok(Json(value))
}

/// GET /api/cuisines
pub async fn list_cuisines(State(state): State<AppState>, uri: Uri) -> ApiResult<Json<Value>> {
    cached(
        &state,
        &uri,
        cuisine::list_cuisines_with_counts(&*state.db),
        |_| vec![CUISINES_TAG.to_string(), RESTAURANTS_TAG.to_string()],
    )
    .await
}

/// A cuisine with its active restaurants.
#[derive(Debug, Serialize)]
pub struct CuisinePage {
    /// The cuisine
    pub cuisine: country::Model,
    /// Active restaurants, alphabetical
    pub restaurants: Vec<restaurant_entity::Model>,
}

/// GET /api/cuisines/{slug}/restaurants
pub async fn cuisine_restaurants(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
    uri: Uri,
) -> ApiResult<Json<Value>> {
    let load = async {
        let cuisine = cuisine::get_cuisine_by_slug(&*state.db, &slug)
            .await?
            .ok_or_else(|| Error::not_found("cuisine", &slug))?;
        let restaurants = restaurant::list_active_by_cuisine(&*state.db, cuisine.id).await?;
        Ok::<_, Error>(CuisinePage {
            cuisine,
            restaurants,
        })
    };
    cached(&state, &uri, load, |_| {
        vec![CUISINES_TAG.to_string(), RESTAURANTS_TAG.to_string()]
    })
    .await
}

/// Query string of the restaurant search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Name fragment; blank lists every active restaurant
    #[serde(default)]
    pub q: String,
}

/// GET /api/restaurants?q=
///
/// Only the unfiltered listing is cached; free-text queries hit the database.
pub async fn search_restaurants(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
    uri: Uri,
) -> ApiResult<Json<Value>> {
    let found = restaurant::search_restaurants(&*state.db, &params.q);
    if params.q.trim().is_empty() {
        return cached(&state, &uri, found, |_| vec![RESTAURANTS_TAG.to_string()]).await;
    }
    Ok(Json(serde_json::to_value(found.await?)?))
}

/// GET /api/restaurants/top
pub async fn top_rated(State(state): State<AppState>, uri: Uri) -> ApiResult<Json<Value>> {
    cached(
        &state,
        &uri,
        restaurant::top_rated(&*state.db, TOP_RATED_LIMIT),
        |_| vec![RESTAURANTS_TAG.to_string()],
    )
    .await
}

/// A video with ready-to-use embed links.
#[derive(Debug, Serialize)]
pub struct VideoCard {
    /// Stored video
    #[serde(flatten)]
    pub video: video_entity::Model,
    /// Privacy-friendly player URL
    pub embed_url: String,
    /// Preview image URL
    pub thumbnail_url: String,
}

/// Everything the public restaurant page renders.
#[derive(Debug, Serialize)]
pub struct RestaurantPage {
    /// Profile fields
    #[serde(flatten)]
    pub restaurant: restaurant_entity::Model,
    /// Cuisine the restaurant is listed under
    pub cuisine: Option<country::Model>,
    /// Services offered
    pub services: Vec<service_entity::Model>,
    /// Highlighted features
    pub features: Vec<feature_entity::Model>,
    /// Gallery in display order
    pub gallery: Vec<gallery_image::Model>,
    /// Videos in display order
    pub videos: Vec<VideoCard>,
    /// Canonical public URL of the page
    pub page_url: String,
    /// Social share links for `page_url`
    pub share: share::ShareLinks,
    /// Click-to-chat link when a WhatsApp number is set
    pub whatsapp_url: Option<String>,
    /// Map embed when an address is set
    pub map_embed_url: Option<String>,
}

async fn load_restaurant_page(state: &AppState, slug: &str) -> crate::errors::Result<RestaurantPage> {
    let db = &*state.db;
    let base = &state.config.server.public_base_url;
    let restaurant = restaurant::require_public_restaurant(db, slug).await?;

    let videos = video::list_videos(db, restaurant.id)
        .await?
        .into_iter()
        .map(|video| VideoCard {
            embed_url: share::youtube_embed_url(&video.youtube_id),
            thumbnail_url: share::youtube_thumbnail_url(&video.youtube_id),
            video,
        })
        .collect();

    let page_url = qr::restaurant_url(base, &restaurant.slug);
    let greeting = format!("مرحباً، أود الاستفسار عن {}", restaurant.name);
    Ok(RestaurantPage {
        cuisine: cuisine::get_cuisine_by_id(db, restaurant.country_id).await?,
        services: service::list_services(db, restaurant.id).await?,
        features: feature::list_features(db, restaurant.id).await?,
        gallery: gallery::list_images(db, restaurant.id).await?,
        videos,
        share: share::share_links(&page_url, &restaurant.name),
        whatsapp_url: restaurant
            .whatsapp
            .as_deref()
            .and_then(|n| share::whatsapp_chat_url(n, Some(&greeting))),
        map_embed_url: restaurant.address.as_deref().map(share::maps_embed_url),
        page_url,
        restaurant,
    })
}

/// GET /api/restaurants/{slug}
pub async fn restaurant_page(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
    uri: Uri,
) -> ApiResult<Json<Value>> {
    cached(&state, &uri, load_restaurant_page(&state, &slug), |page| {
        vec![
            restaurant_tag(page.restaurant.id),
            cuisine_tag(page.restaurant.country_id),
        ]
    })
    .await
}

/// Public menu of a restaurant.
#[derive(Debug, Serialize)]
pub struct MenuPage {
    /// Restaurant the page belongs to
    pub restaurant_id: i64,
    /// Available dishes grouped by category
    pub sections: Vec<dish::MenuSection>,
}

/// GET /api/restaurants/{slug}/menu
pub async fn menu(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
    uri: Uri,
) -> ApiResult<Json<Value>> {
    let load = async {
        let restaurant = restaurant::require_public_restaurant(&*state.db, &slug).await?;
        Ok::<_, Error>(MenuPage {
            restaurant_id: restaurant.id,
            sections: dish::list_menu(&*state.db, restaurant.id, false).await?,
        })
    };
    cached(&state, &uri, load, |page| vec![restaurant_tag(page.restaurant_id)]).await
}

/// A dish with its reviews.
#[derive(Debug, Serialize)]
pub struct DishPage {
    /// The dish
    #[serde(flatten)]
    pub dish: dish_entity::Model,
    /// Reviews, newest first
    pub reviews: Vec<dish_review::Model>,
}

/// GET /api/restaurants/{slug}/dishes/{dish} - hidden dishes are not found.
pub async fn dish_page(
    State(state): State<AppState>,
    PathParam((slug, dish_slug)): PathParam<(String, String)>,
    uri: Uri,
) -> ApiResult<Json<Value>> {
    let load = async {
        let restaurant = restaurant::require_public_restaurant(&*state.db, &slug).await?;
        let dish = dish::get_dish_by_slug(&*state.db, restaurant.id, &dish_slug)
            .await?
            .filter(|dish| dish.is_available)
            .ok_or_else(|| Error::not_found("dish", &dish_slug))?;
        Ok::<_, Error>(DishPage {
            reviews: review::list_dish_reviews(&*state.db, dish.id).await?,
            dish,
        })
    };
    cached(&state, &uri, load, |page| vec![restaurant_tag(page.dish.restaurant_id)]).await
}

/// GET /api/restaurants/{slug}/reviews
pub async fn restaurant_reviews(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
) -> ApiResult<Json<Value>> {
    let restaurant = restaurant::require_public_restaurant(&*state.db, &slug).await?;
    let reviews = review::list_restaurant_reviews(&*state.db, restaurant.id).await?;
    Ok(Json(serde_json::to_value(reviews)?))
}

/// GET /api/dishes/{id}/reviews
pub async fn dish_reviews(
    State(state): State<AppState>,
    PathParam(dish_id): PathParam<i64>,
) -> ApiResult<Json<Value>> {
    let reviews = review::list_dish_reviews(&*state.db, dish_id).await?;
    Ok(Json(serde_json::to_value(reviews)?))
}

/// Published posts of a restaurant.
#[derive(Debug, Serialize)]
pub struct BlogPage {
    /// Restaurant the page belongs to
    pub restaurant_id: i64,
    /// Posts, newest first
    pub posts: Vec<blog_post::Model>,
}

/// GET /api/restaurants/{slug}/blog
pub async fn blog_posts(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
    uri: Uri,
) -> ApiResult<Json<Value>> {
    let load = async {
        let restaurant = restaurant::require_public_restaurant(&*state.db, &slug).await?;
        Ok::<_, Error>(BlogPage {
            restaurant_id: restaurant.id,
            posts: blog::list_published_posts(&*state.db, restaurant.id).await?,
        })
    };
    cached(&state, &uri, load, |page| vec![restaurant_tag(page.restaurant_id)]).await
}

/// GET /api/restaurants/{slug}/blog/{post}
pub async fn blog_post(
    State(state): State<AppState>,
    PathParam((slug, post_slug)): PathParam<(String, String)>,
) -> ApiResult<Json<Value>> {
    let restaurant = restaurant::require_public_restaurant(&*state.db, &slug).await?;
    let post = blog::get_published_post(&*state.db, restaurant.id, &post_slug).await?;
    Ok(Json(serde_json::to_value(post)?))
}

/// Body of a cart preview.
#[derive(Debug, Deserialize)]
pub struct CartPreviewRequest {
    /// Restaurant the cart is for
    pub restaurant_slug: String,
    /// Cart lines as held by the client
    pub items: Vec<CartLine>,
}

/// POST /api/cart/preview
pub async fn preview_cart(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CartPreviewRequest>,
) -> ApiResult<Json<CartPreview>> {
    let restaurant = restaurant::require_public_restaurant(&*state.db, &request.restaurant_slug).await?;
    let preview = order::preview_cart(
        &*state.db,
        restaurant.id,
        &request.items,
        state.config.orders.tax_rate,
    )
    .await?;
    Ok(Json(preview))
}

/// Links printed on a restaurant's QR code.
#[derive(Debug, Serialize)]
pub struct QrLinks {
    /// URL to encode in the printed code
    pub scan_url: String,
    /// Page the scan redirects to
    pub restaurant_url: String,
}

/// GET /api/restaurants/{slug}/qr
pub async fn qr_links(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
) -> ApiResult<Json<QrLinks>> {
    let restaurant = restaurant::require_public_restaurant(&*state.db, &slug).await?;
    let base = &state.config.server.public_base_url;
    Ok(Json(QrLinks {
        scan_url: qr::scan_url(base, &restaurant.slug),
        restaurant_url: qr::restaurant_url(base, &restaurant.slug),
    }))
}

/// GET /qr/{slug} - records the scan and sends the visitor to the page.
pub async fn scan(State(state): State<AppState>, PathParam(slug): PathParam<String>) -> ApiResult<Redirect> {
    let restaurant = qr::record_scan_by_slug(&*state.db, &slug).await?;
    let target = qr::restaurant_url(&state.config.server.public_base_url, &restaurant.slug);
    Ok(Redirect::temporary(&target))
}
