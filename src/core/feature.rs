//! Feature business logic - amenities a restaurant highlights (outdoor seating, wifi, ...).
//!
//! Form handling and title uniqueness live in [`highlight`].

use crate::{
    core::highlight::{self, HighlightInput},
    entities::{Feature, feature},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::instrument;

async fn get_restaurant_feature(
    db: &DatabaseConnection,
    restaurant_id: i64,
    feature_id: i64,
) -> Result<feature::Model> {
    Feature::find_by_id(feature_id)
        .filter(feature::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("feature", feature_id))
}

async fn ensure_unique_title(
    db: &DatabaseConnection,
    restaurant_id: i64,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let existing = list_features(db, restaurant_id).await?;
    highlight::ensure_unique_title(
        "feature",
        existing.iter().map(|item| (item.id, item.title.as_str())),
        title,
        exclude_id,
    )
}

/// Features of a restaurant in the order they were added.
pub async fn list_features(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<feature::Model>> {
    Feature::find()
        .filter(feature::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(feature::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a feature.
#[instrument(skip(db, input))]
pub async fn create_feature(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: HighlightInput,
) -> Result<feature::Model> {
    let valid = input.validate()?;
    ensure_unique_title(db, restaurant_id, &valid.title, None).await?;

    feature::ActiveModel {
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

/// Edits a feature.
#[instrument(skip(db, input))]
pub async fn update_feature(
    db: &DatabaseConnection,
    restaurant_id: i64,
    feature_id: i64,
    input: HighlightInput,
) -> Result<feature::Model> {
    let valid = input.validate()?;
    let existing = get_restaurant_feature(db, restaurant_id, feature_id).await?;
    ensure_unique_title(db, restaurant_id, &valid.title, Some(feature_id)).await?;

    let mut feature: feature::ActiveModel = existing.into();
    feature.title = Set(valid.title);
    feature.description = Set(valid.description);
    feature.icon = Set(valid.icon);
    feature.update(db).await.map_err(Into::into)
}

/// Removes a feature.
#[instrument(skip(db))]
pub async fn delete_feature(
    db: &DatabaseConnection,
    restaurant_id: i64,
    feature_id: i64,
) -> Result<()> {
    get_restaurant_feature(db, restaurant_id, feature_id)
        .await?
        .delete(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_features_are_separate_from_services() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let wifi = HighlightInput {
            title: "Free Wifi".to_string(),
            ..Default::default()
        };
        crate::core::service::create_service(&db, restaurant.id, wifi.clone()).await?;

        // Same title is fine across kinds, not within one
        let feature = create_feature(&db, restaurant.id, wifi.clone()).await?;
        let again = create_feature(&db, restaurant.id, wifi).await;
        assert!(matches!(again.unwrap_err(), Error::Duplicate { entity: "feature", .. }));

        delete_feature(&db, restaurant.id, feature.id).await?;
        assert!(list_features(&db, restaurant.id).await?.is_empty());
        Ok(())
    }
}
