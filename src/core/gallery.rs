//! Gallery business logic - ordered restaurant photos.
//!
//! Each restaurant keeps at most `limits.max_gallery_images` images. Positions
//! are 0-based and contiguous; removing an image closes the gap and a reorder
//! rewrites every position in one transaction (last writer wins).

use crate::{
    core::text,
    entities::{GalleryImage, gallery_image},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, instrument};

/// Portal form for a gallery image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryImageInput {
    /// Hosted image URL
    pub image_url: String,
    /// Optional caption
    #[serde(default)]
    pub caption: Option<String>,
}

/// Images of a restaurant in display order.
pub async fn list_images<C>(conn: &C, restaurant_id: i64) -> Result<Vec<gallery_image::Model>>
where
    C: ConnectionTrait,
{
    GalleryImage::find()
        .filter(gallery_image::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(gallery_image::Column::SortOrder)
        .order_by_asc(gallery_image::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Appends an image at the end of the gallery.
///
/// # Errors
/// Returns [`Error::LimitReached`] when the gallery already holds `max_images`.
#[instrument(skip(db, input))]
pub async fn add_image(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: GalleryImageInput,
    max_images: u64,
) -> Result<gallery_image::Model> {
    let image_url = text::required_url("image_url", &input.image_url)?;
    let caption = text::optional("caption", input.caption.as_deref(), 200)?;

    let txn = db.begin().await?;
    let count = GalleryImage::find()
        .filter(gallery_image::Column::RestaurantId.eq(restaurant_id))
        .count(&txn)
        .await?;
    if count >= max_images {
        return Err(Error::LimitReached {
            entity: "gallery image",
            limit: max_images,
        });
    }

    let image = gallery_image::ActiveModel {
        restaurant_id: Set(restaurant_id),
        image_url: Set(image_url),
        caption: Set(caption),
        sort_order: Set(i32::try_from(count).unwrap_or(i32::MAX)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(restaurant_id, image_id = image.id, "gallery image added");
    Ok(image)
}

/// Changes an image's caption.
pub async fn update_caption(
    db: &DatabaseConnection,
    restaurant_id: i64,
    image_id: i64,
    caption: Option<String>,
) -> Result<gallery_image::Model> {
    let caption = text::optional("caption", caption.as_deref(), 200)?;
    let mut image: gallery_image::ActiveModel = GalleryImage::find_by_id(image_id)
        .filter(gallery_image::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("gallery image", image_id))?
        .into();
    image.caption = Set(caption);
    image.update(db).await.map_err(Into::into)
}

/// Removes an image and renumbers the rest.
#[instrument(skip(db))]
pub async fn remove_image(db: &DatabaseConnection, restaurant_id: i64, image_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let image = GalleryImage::find_by_id(image_id)
        .filter(gallery_image::Column::RestaurantId.eq(restaurant_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("gallery image", image_id))?;
    image.delete(&txn).await?;

    let remaining: Vec<i64> = list_images(&txn, restaurant_id)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();
    write_positions(&txn, &remaining).await?;
    txn.commit().await?;
    Ok(())
}

/// Persists a new display order.
///
/// `ordered_ids` must contain every image of the restaurant exactly once.
///
/// # Errors
/// Returns [`Error::Validation`] when the ids do not match the gallery.
#[instrument(skip(db, ordered_ids))]
pub async fn reorder_images(
    db: &DatabaseConnection,
    restaurant_id: i64,
    ordered_ids: &[i64],
) -> Result<Vec<gallery_image::Model>> {
    let txn = db.begin().await?;
    let current: Vec<i64> = list_images(&txn, restaurant_id)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();
    ensure_same_items(&current, ordered_ids)?;

    write_positions(&txn, ordered_ids).await?;
    let images = list_images(&txn, restaurant_id).await?;
    txn.commit().await?;
    Ok(images)
}

async fn write_positions<C>(conn: &C, ordered_ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    for (position, id) in ordered_ids.iter().enumerate() {
        GalleryImage::update_many()
            .col_expr(
                gallery_image::Column::SortOrder,
                Expr::value(i32::try_from(position).unwrap_or(i32::MAX)),
            )
            .filter(gallery_image::Column::Id.eq(*id))
            .exec(conn)
            .await?;
    }
    Ok(())
}

/// Checks that `ordered` is a permutation of `current`.
pub(crate) fn ensure_same_items(current: &[i64], ordered: &[i64]) -> Result<()> {
    let wanted: HashSet<i64> = ordered.iter().copied().collect();
    let have: HashSet<i64> = current.iter().copied().collect();
    if wanted.len() != ordered.len() || wanted != have {
        return Err(Error::validation(
            "order",
            "الترتيب المرسل لا يطابق العناصر الحالية",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn image(n: usize) -> GalleryImageInput {
        GalleryImageInput {
            image_url: format!("https://cdn.example/{n}.jpg"),
            caption: None,
        }
    }

    #[tokio::test]
    async fn test_gallery_capped() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let limit = test_limits().max_gallery_images;

        for n in 0..20 {
            let added = add_image(&db, restaurant.id, image(n), limit).await?;
            assert_eq!(added.sort_order, i32::try_from(n).unwrap());
        }
        let result = add_image(&db, restaurant.id, image(21), limit).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::LimitReached { limit: 20, .. }
        ));
        assert_eq!(list_images(&db, restaurant.id).await?.len(), 20);
        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_images() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let a = add_image(&db, restaurant.id, image(0), 20).await?;
        let b = add_image(&db, restaurant.id, image(1), 20).await?;
        let c = add_image(&db, restaurant.id, image(2), 20).await?;

        let reordered = reorder_images(&db, restaurant.id, &[c.id, a.id, b.id]).await?;
        let ids: Vec<i64> = reordered.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![c.id, a.id, b.id]);
        let orders: Vec<i32> = reordered.iter().map(|i| i.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        // Missing, duplicated and foreign ids are rejected
        for bad in [vec![a.id, b.id], vec![a.id, a.id, b.id], vec![a.id, b.id, 999]] {
            let result = reorder_images(&db, restaurant.id, &bad).await;
            assert!(matches!(
                result.unwrap_err(),
                Error::Validation { field: "order", .. }
            ));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_image_closes_gap() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let a = add_image(&db, restaurant.id, image(0), 20).await?;
        let b = add_image(&db, restaurant.id, image(1), 20).await?;
        let c = add_image(&db, restaurant.id, image(2), 20).await?;

        remove_image(&db, restaurant.id, b.id).await?;
        let images = list_images(&db, restaurant.id).await?;
        assert_eq!(images.len(), 2);
        assert_eq!((images[0].id, images[0].sort_order), (a.id, 0));
        assert_eq!((images[1].id, images[1].sort_order), (c.id, 1));

        // The freed slot can be reused
        let d = add_image(&db, restaurant.id, image(3), 20).await?;
        assert_eq!(d.sort_order, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_image_url_required() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let result = add_image(&db, restaurant.id, GalleryImageInput::default(), 20).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "image_url",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_caption() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let img = add_image(&db, restaurant.id, image(0), 20).await?;
        let updated = update_caption(&db, restaurant.id, img.id, Some(" Terrace ".into())).await?;
        assert_eq!(updated.caption.as_deref(), Some("Terrace"));
        Ok(())
    }
}
