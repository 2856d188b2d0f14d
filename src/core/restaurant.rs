//! Restaurant business logic - listing, profile management and status.
//!
//! Restaurants are created, suspended and deleted from the dashboard; owners
//! edit the public profile through the portal. Only `ACTIVE` restaurants are
//! returned by the public lookups in this module.

use crate::{
    core::{slug, text},
    entities::{
        BlogPost, Country, DiningTable, Dish, DishReview, FavoriteDish, FavoriteRestaurant,
        Feature, GalleryImage, Order, OrderItem, QrCode, QrScan, Restaurant, RestaurantReview,
        RestaurantStatus, Service, Video, blog_post, dining_table, dish, dish_review,
        favorite_dish, favorite_restaurant, feature, gallery_image, order, order_item, qr_code,
        qr_scan, restaurant, restaurant_review, service, video,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Dashboard form for listing a new restaurant.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRestaurant {
    /// Display name
    pub name: String,
    /// Slug; derived from the name when absent
    #[serde(default)]
    pub slug: Option<String>,
    /// Cuisine id
    pub country_id: i64,
    /// Auth-provider user id of the owner
    pub owner_id: String,
    /// Initial status; `ACTIVE` when absent
    #[serde(default)]
    pub status: Option<RestaurantStatus>,
}

/// Portal form for the public profile. Every field is replaced as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RestaurantProfile {
    /// Display name
    pub name: String,
    /// Cuisine id; unchanged when absent
    pub country_id: Option<i64>,
    /// Description
    pub description: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// WhatsApp number
    pub whatsapp: Option<String>,
    /// Google Maps link
    pub map_url: Option<String>,
    /// Logo URL
    pub logo_url: Option<String>,
    /// Cover image URL
    pub cover_url: Option<String>,
    /// Facebook page URL
    pub facebook_url: Option<String>,
    /// Instagram profile URL
    pub instagram_url: Option<String>,
    /// Opening hours text
    pub opening_hours: Option<String>,
}

fn validate_phone(field: &'static str, value: Option<&str>) -> Result<Option<String>> {
    let phone = text::optional(field, value, 32)?;
    if let Some(p) = &phone {
        let digits = p.chars().filter(char::is_ascii_digit).count();
        let allowed = p
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
        if !allowed || !(6..=15).contains(&digits) {
            return Err(Error::validation(field, "رقم الهاتف غير صالح"));
        }
    }
    Ok(phone)
}

async fn ensure_cuisine_exists(db: &DatabaseConnection, country_id: i64) -> Result<()> {
    Country::find_by_id(country_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::validation("country_id", "المطبخ المحدد غير موجود"))
}

/// Finds a restaurant by id regardless of status.
pub async fn get_restaurant_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<restaurant::Model>> {
    Restaurant::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a restaurant by slug regardless of status.
pub async fn get_restaurant_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<restaurant::Model>> {
    Restaurant::find()
        .filter(restaurant::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an `ACTIVE` restaurant by slug; suspended and inactive ones are hidden.
pub async fn get_public_restaurant(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<restaurant::Model>> {
    Restaurant::find()
        .filter(restaurant::Column::Slug.eq(slug))
        .filter(restaurant::Column::Status.eq(RestaurantStatus::Active.as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_public_restaurant`] but a miss is an error.
pub async fn require_public_restaurant(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<restaurant::Model> {
    get_public_restaurant(db, slug)
        .await?
        .ok_or_else(|| Error::not_found("restaurant", slug))
}

/// All restaurants for the dashboard, newest first.
pub async fn list_restaurants(db: &DatabaseConnection) -> Result<Vec<restaurant::Model>> {
    Restaurant::find()
        .order_by_desc(restaurant::Column::CreatedAt)
        .order_by_desc(restaurant::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active restaurants under one cuisine, best rated first.
pub async fn list_active_by_cuisine(
    db: &DatabaseConnection,
    country_id: i64,
) -> Result<Vec<restaurant::Model>> {
    Restaurant::find()
        .filter(restaurant::Column::CountryId.eq(country_id))
        .filter(restaurant::Column::Status.eq(RestaurantStatus::Active.as_str()))
        .order_by_desc(restaurant::Column::Rating)
        .order_by_asc(restaurant::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active restaurants whose name contains `query`; all active ones for a blank query.
pub async fn search_restaurants(
    db: &DatabaseConnection,
    query: &str,
) -> Result<Vec<restaurant::Model>> {
    let mut select = Restaurant::find()
        .filter(restaurant::Column::Status.eq(RestaurantStatus::Active.as_str()));
    let query = query.trim();
    if !query.is_empty() {
        select = select.filter(restaurant::Column::Name.contains(query));
    }
    select
        .order_by_asc(restaurant::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Highest rated active restaurants; ties go to the one with more reviews.
pub async fn top_rated(db: &DatabaseConnection, limit: u64) -> Result<Vec<restaurant::Model>> {
    Restaurant::find()
        .filter(restaurant::Column::Status.eq(RestaurantStatus::Active.as_str()))
        .filter(restaurant::Column::RatingCount.gt(0))
        .order_by_desc(restaurant::Column::Rating)
        .order_by_desc(restaurant::Column::RatingCount)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Restaurants an owner manages through the portal.
pub async fn list_owned(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<restaurant::Model>> {
    Restaurant::find()
        .filter(restaurant::Column::OwnerId.eq(owner_id))
        .order_by_asc(restaurant::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a new restaurant.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank name/owner or unknown cuisine,
/// [`Error::Duplicate`] when the slug is taken.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_restaurant(
    db: &DatabaseConnection,
    input: NewRestaurant,
) -> Result<restaurant::Model> {
    let name = text::required("name", &input.name, 120)?;
    let owner_id = text::required("owner_id", &input.owner_id, 128)?;
    let slug = slug::slug_or_derive(input.slug.as_deref(), &name);
    if slug.is_empty() {
        return Err(Error::validation("slug", "الرابط المختصر غير صالح"));
    }
    ensure_cuisine_exists(db, input.country_id).await?;
    if get_restaurant_by_slug(db, &slug).await?.is_some() {
        return Err(Error::duplicate("restaurant", slug));
    }

    let now = chrono::Utc::now();
    let status = input.status.unwrap_or(RestaurantStatus::Active);
    let restaurant = restaurant::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        country_id: Set(input.country_id),
        owner_id: Set(owner_id),
        status: Set(status.as_str().to_string()),
        description: Set(None),
        address: Set(None),
        phone: Set(None),
        whatsapp: Set(None),
        map_url: Set(None),
        logo_url: Set(None),
        cover_url: Set(None),
        facebook_url: Set(None),
        instagram_url: Set(None),
        opening_hours: Set(None),
        rating: Set(0.0),
        rating_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = restaurant.insert(db).await?;
    info!(restaurant_id = created.id, slug = %created.slug, "restaurant created");
    Ok(created)
}

/// Replaces the public profile of a restaurant. The slug never changes here
/// so printed QR codes keep working.
#[instrument(skip(db, profile))]
pub async fn update_profile(
    db: &DatabaseConnection,
    id: i64,
    profile: RestaurantProfile,
) -> Result<restaurant::Model> {
    let name = text::required("name", &profile.name, 120)?;
    let description = text::optional("description", profile.description.as_deref(), 5000)?;
    let address = text::optional("address", profile.address.as_deref(), 300)?;
    let phone = validate_phone("phone", profile.phone.as_deref())?;
    let whatsapp = validate_phone("whatsapp", profile.whatsapp.as_deref())?;
    let map_url = text::optional_url("map_url", profile.map_url.as_deref())?;
    let logo_url = text::optional_url("logo_url", profile.logo_url.as_deref())?;
    let cover_url = text::optional_url("cover_url", profile.cover_url.as_deref())?;
    let facebook_url = text::optional_url("facebook_url", profile.facebook_url.as_deref())?;
    let instagram_url = text::optional_url("instagram_url", profile.instagram_url.as_deref())?;
    let opening_hours = text::optional("opening_hours", profile.opening_hours.as_deref(), 300)?;

    let mut restaurant: restaurant::ActiveModel = get_restaurant_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("restaurant", id))?
        .into();

    if let Some(country_id) = profile.country_id {
        ensure_cuisine_exists(db, country_id).await?;
        restaurant.country_id = Set(country_id);
    }
    restaurant.name = Set(name);
    restaurant.description = Set(description);
    restaurant.address = Set(address);
    restaurant.phone = Set(phone);
    restaurant.whatsapp = Set(whatsapp);
    restaurant.map_url = Set(map_url);
    restaurant.logo_url = Set(logo_url);
    restaurant.cover_url = Set(cover_url);
    restaurant.facebook_url = Set(facebook_url);
    restaurant.instagram_url = Set(instagram_url);
    restaurant.opening_hours = Set(opening_hours);
    restaurant.updated_at = Set(chrono::Utc::now());

    restaurant.update(db).await.map_err(Into::into)
}

/// Sets the listing status directly; any status may follow any other.
#[instrument(skip(db))]
pub async fn set_status(
    db: &DatabaseConnection,
    id: i64,
    status: RestaurantStatus,
) -> Result<restaurant::Model> {
    let mut restaurant: restaurant::ActiveModel = get_restaurant_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("restaurant", id))?
        .into();
    restaurant.status = Set(status.as_str().to_string());
    restaurant.updated_at = Set(chrono::Utc::now());
    let updated = restaurant.update(db).await?;
    info!(restaurant_id = id, %status, "restaurant status changed");
    Ok(updated)
}

async fn delete_where<E, C, V>(conn: &C, column: E::Column, value: V) -> Result<u64>
where
    E: EntityTrait,
    C: ConnectionTrait,
    V: Into<sea_orm::Value>,
{
    let result = E::delete_many().filter(column.eq(value)).exec(conn).await?;
    Ok(result.rows_affected)
}

/// Deletes a restaurant together with everything it owns: orders, dishes
/// and their reviews and favorites, media, tables, posts and QR history.
///
/// Children go first, inside one transaction, so the result does not depend
/// on the backend enforcing foreign-key cascades.
#[instrument(skip(db))]
pub async fn delete_restaurant(db: &DatabaseConnection, id: i64) -> Result<()> {
    let txn = db.begin().await?;
    if Restaurant::find_by_id(id).one(&txn).await?.is_none() {
        return Err(Error::not_found("restaurant", id));
    }

    let order_ids: Vec<i64> = Order::find()
        .select_only()
        .column(order::Column::Id)
        .filter(order::Column::RestaurantId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;
    let dish_ids: Vec<i64> = Dish::find()
        .select_only()
        .column(dish::Column::Id)
        .filter(dish::Column::RestaurantId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;

    OrderItem::delete_many()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .exec(&txn)
        .await?;
    let orders = delete_where::<Order, _, _>(&txn, order::Column::RestaurantId, id).await?;
    DishReview::delete_many()
        .filter(dish_review::Column::DishId.is_in(dish_ids.clone()))
        .exec(&txn)
        .await?;
    FavoriteDish::delete_many()
        .filter(favorite_dish::Column::DishId.is_in(dish_ids))
        .exec(&txn)
        .await?;
    let dishes = delete_where::<Dish, _, _>(&txn, dish::Column::RestaurantId, id).await?;

    delete_where::<RestaurantReview, _, _>(&txn, restaurant_review::Column::RestaurantId, id)
        .await?;
    delete_where::<FavoriteRestaurant, _, _>(&txn, favorite_restaurant::Column::RestaurantId, id)
        .await?;
    delete_where::<Service, _, _>(&txn, service::Column::RestaurantId, id).await?;
    delete_where::<Feature, _, _>(&txn, feature::Column::RestaurantId, id).await?;
    delete_where::<GalleryImage, _, _>(&txn, gallery_image::Column::RestaurantId, id).await?;
    delete_where::<Video, _, _>(&txn, video::Column::RestaurantId, id).await?;
    delete_where::<DiningTable, _, _>(&txn, dining_table::Column::RestaurantId, id).await?;
    delete_where::<BlogPost, _, _>(&txn, blog_post::Column::RestaurantId, id).await?;
    delete_where::<QrScan, _, _>(&txn, qr_scan::Column::RestaurantId, id).await?;
    delete_where::<QrCode, _, _>(&txn, qr_code::Column::RestaurantId, id).await?;

    Restaurant::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(restaurant_id = id, orders, dishes, "restaurant deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        favorite,
        order::{self as ordering, CartLine, PlaceOrder},
        qr,
        review::{self, ReviewInput},
    };
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_restaurant_integration() -> Result<()> {
        let (_db, restaurant) = setup_with_restaurant().await?;
        assert_eq!(restaurant.slug, "damascus-grill");
        assert_eq!(restaurant.status, "ACTIVE");
        assert_eq!(restaurant.owner_id, TEST_OWNER_ID);
        assert_eq!(restaurant.rating_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_restaurant_duplicate_slug() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let result = create_test_restaurant(&db, "Damascus  Grill", restaurant.country_id).await;
        assert!(matches!(result.unwrap_err(), Error::Duplicate { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_restaurant_unknown_cuisine() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_test_restaurant(&db, "Nowhere", 42).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "country_id",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;

        let updated = update_profile(
            &db,
            restaurant.id,
            RestaurantProfile {
                name: "Damascus Grill House".to_string(),
                whatsapp: Some("+963 944 123 456".to_string()),
                logo_url: Some("https://cdn.example/logo.png".to_string()),
                opening_hours: Some("  10:00 - 23:00 ".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.name, "Damascus Grill House");
        assert_eq!(updated.slug, "damascus-grill");
        assert_eq!(updated.opening_hours.as_deref(), Some("10:00 - 23:00"));
        assert_eq!(updated.whatsapp.as_deref(), Some("+963 944 123 456"));

        let bad_phone = update_profile(
            &db,
            restaurant.id,
            RestaurantProfile {
                name: "X".to_string(),
                phone: Some("call me".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            bad_phone.unwrap_err(),
            Error::Validation { field: "phone", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_suspended_restaurant_is_hidden() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        assert!(get_public_restaurant(&db, &restaurant.slug).await?.is_some());

        set_status(&db, restaurant.id, RestaurantStatus::Suspended).await?;
        assert!(get_public_restaurant(&db, &restaurant.slug).await?.is_none());
        assert!(search_restaurants(&db, "").await?.is_empty());
        assert!(
            list_active_by_cuisine(&db, restaurant.country_id)
                .await?
                .is_empty()
        );
        // Still visible to the dashboard
        assert_eq!(list_restaurants(&db).await?.len(), 1);

        set_status(&db, restaurant.id, RestaurantStatus::Active).await?;
        assert!(get_public_restaurant(&db, &restaurant.slug).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_restaurants() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        create_test_restaurant(&db, "Aleppo Kitchen", restaurant.country_id).await?;

        let hits = search_restaurants(&db, "aleppo").await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Aleppo Kitchen");
        assert_eq!(search_restaurants(&db, "  ").await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_owned() -> Result<()> {
        let (db, _restaurant) = setup_with_restaurant().await?;
        assert_eq!(list_owned(&db, TEST_OWNER_ID).await?.len(), 1);
        assert!(list_owned(&db, "nobody").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_restaurant_cascades() -> Result<()> {
        let (db, restaurant, dish) = setup_with_dish().await?;
        let visitor = customer("visitor");
        let five = || ReviewInput {
            rating: 5,
            comment: None,
        };
        review::submit_dish_review(&db, &visitor, dish.id, five()).await?;
        review::submit_restaurant_review(&db, &visitor, restaurant.id, five()).await?;
        favorite::toggle_favorite_dish(&db, "visitor", dish.id).await?;
        favorite::toggle_favorite_restaurant(&db, "visitor", restaurant.id).await?;
        qr::record_scan(&db, restaurant.id).await?;
        ordering::place_order(
            &db,
            restaurant.id,
            Some("visitor"),
            PlaceOrder {
                items: vec![CartLine {
                    dish_id: dish.id,
                    quantity: 2,
                }],
                ..Default::default()
            },
            0.15,
        )
        .await?;

        // A second restaurant keeps its rows
        let other = create_test_restaurant(&db, "Elsewhere", restaurant.country_id).await?;
        qr::record_scan(&db, other.id).await?;

        delete_restaurant(&db, restaurant.id).await?;
        assert!(get_restaurant_by_id(&db, restaurant.id).await?.is_none());
        assert!(Dish::find().all(&db).await?.is_empty());
        assert!(DishReview::find().all(&db).await?.is_empty());
        assert!(RestaurantReview::find().all(&db).await?.is_empty());
        assert!(FavoriteDish::find().all(&db).await?.is_empty());
        assert!(FavoriteRestaurant::find().all(&db).await?.is_empty());
        assert!(Order::find().all(&db).await?.is_empty());
        assert!(OrderItem::find().all(&db).await?.is_empty());

        let codes = QrCode::find().all(&db).await?;
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].restaurant_id, other.id);
        let scans = QrScan::find().all(&db).await?;
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].restaurant_id, other.id);

        let again = delete_restaurant(&db, restaurant.id).await;
        assert!(matches!(again.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
