//! Service business logic - what a restaurant offers (delivery, catering, ...).
//!
//! Form handling and title uniqueness live in [`highlight`].

use crate::{
    core::highlight::{self, HighlightInput},
    entities::{Service, service},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::instrument;

async fn get_restaurant_service(
    db: &DatabaseConnection,
    restaurant_id: i64,
    service_id: i64,
) -> Result<service::Model> {
    Service::find_by_id(service_id)
        .filter(service::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("service", service_id))
}

async fn ensure_unique_title(
    db: &DatabaseConnection,
    restaurant_id: i64,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let existing = list_services(db, restaurant_id).await?;
    highlight::ensure_unique_title(
        "service",
        existing.iter().map(|item| (item.id, item.title.as_str())),
        title,
        exclude_id,
    )
}

/// Services of a restaurant in the order they were added.
pub async fn list_services(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<service::Model>> {
    Service::find()
        .filter(service::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(service::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a service.
#[instrument(skip(db, input))]
pub async fn create_service(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: HighlightInput,
) -> Result<service::Model> {
    let valid = input.validate()?;
    ensure_unique_title(db, restaurant_id, &valid.title, None).await?;

    service::ActiveModel {
        restaurant_id: Set(restaurant_id),
        title: Set(valid.title),
        description: Set(valid.description),
        icon: Set(valid.icon),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Edits a service.
#[instrument(skip(db, input))]
pub async fn update_service(
    db: &DatabaseConnection,
    restaurant_id: i64,
    service_id: i64,
    input: HighlightInput,
) -> Result<service::Model> {
    let valid = input.validate()?;
    let existing = get_restaurant_service(db, restaurant_id, service_id).await?;
    ensure_unique_title(db, restaurant_id, &valid.title, Some(service_id)).await?;

    let mut service: service::ActiveModel = existing.into();
    service.title = Set(valid.title);
    service.description = Set(valid.description);
    service.icon = Set(valid.icon);
    service.update(db).await.map_err(Into::into)
}

/// Removes a service.
#[instrument(skip(db))]
pub async fn delete_service(
    db: &DatabaseConnection,
    restaurant_id: i64,
    service_id: i64,
) -> Result<()> {
    get_restaurant_service(db, restaurant_id, service_id)
        .await?
        .delete(db)
        .await?;
    Ok(())
}
