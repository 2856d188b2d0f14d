//! Review business logic - dish and restaurant ratings.
//!
//! Each user has at most one review per dish and one per restaurant. A second
//! dish review replaces the first; a second restaurant review is rejected and
//! the user must edit the existing one instead. Every change recomputes the
//! denormalized `rating`/`rating_count` of the reviewed row inside the same
//! database transaction.

use crate::{
    core::{access::Actor, rating, text},
    entities::{
        Dish, DishReview, Restaurant, RestaurantReview, dish, dish_review, restaurant,
        restaurant_review,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Maximum comment length in characters.
pub const MAX_COMMENT_CHARS: usize = 1000;

/// Review form.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    /// 1 to 5
    pub rating: i32,
    /// Optional comment
    #[serde(default)]
    pub comment: Option<String>,
}

fn validate(input: &ReviewInput) -> Result<Option<String>> {
    rating::validate(input.rating)?;
    text::optional("comment", input.comment.as_deref(), MAX_COMMENT_CHARS)
}

/// Recomputes a dish's average rating from all of its reviews.
pub async fn recompute_dish_rating<C>(conn: &C, dish_id: i64) -> Result<dish::Model>
where
    C: ConnectionTrait,
{
    let ratings: Vec<i32> = DishReview::find()
        .select_only()
        .column(dish_review::Column::Rating)
        .filter(dish_review::Column::DishId.eq(dish_id))
        .into_tuple()
        .all(conn)
        .await?;

    let mut dish: dish::ActiveModel = Dish::find_by_id(dish_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("dish", dish_id))?
        .into();
    dish.rating = Set(rating::average(&ratings));
    dish.rating_count = Set(i32::try_from(ratings.len()).unwrap_or(i32::MAX));
    let updated = dish.update(conn).await?;
    debug!(dish_id, rating = updated.rating, "dish rating recomputed");
    Ok(updated)
}

/// Recomputes a restaurant's average rating from all of its reviews.
pub async fn recompute_restaurant_rating<C>(conn: &C, restaurant_id: i64) -> Result<restaurant::Model>
where
    C: ConnectionTrait,
{
    let ratings: Vec<i32> = RestaurantReview::find()
        .select_only()
        .column(restaurant_review::Column::Rating)
        .filter(restaurant_review::Column::RestaurantId.eq(restaurant_id))
        .into_tuple()
        .all(conn)
        .await?;

    let mut restaurant: restaurant::ActiveModel = Restaurant::find_by_id(restaurant_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("restaurant", restaurant_id))?
        .into();
    restaurant.rating = Set(rating::average(&ratings));
    restaurant.rating_count = Set(i32::try_from(ratings.len()).unwrap_or(i32::MAX));
    let updated = restaurant.update(conn).await?;
    debug!(restaurant_id, rating = updated.rating, "restaurant rating recomputed");
    Ok(updated)
}

/// Creates or replaces the actor's review of a dish.
///
/// Returns the stored review and whether it was newly created.
///
/// # Errors
/// Returns [`Error::Validation`] for a rating outside 1–5 or an overlong
/// comment, [`Error::NotFound`] for an unknown dish.
#[instrument(skip(db, actor, input), fields(user_id = %actor.user_id))]
pub async fn submit_dish_review(
    db: &DatabaseConnection,
    actor: &Actor,
    dish_id: i64,
    input: ReviewInput,
) -> Result<(dish_review::Model, bool)> {
    let comment = validate(&input)?;

    let txn = db.begin().await?;
    Dish::find_by_id(dish_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("dish", dish_id))?;

    let existing = DishReview::find()
        .filter(dish_review::Column::DishId.eq(dish_id))
        .filter(dish_review::Column::UserId.eq(actor.user_id.as_str()))
        .one(&txn)
        .await?;

    let now = chrono::Utc::now();
    let (review, created) = match existing {
        Some(review) => {
            let mut review: dish_review::ActiveModel = review.into();
            review.rating = Set(input.rating);
            review.comment = Set(comment);
            review.user_name = Set(actor.name.clone());
            review.updated_at = Set(now);
            (review.update(&txn).await?, false)
        }
        None => {
            let review = dish_review::ActiveModel {
                dish_id: Set(dish_id),
                user_id: Set(actor.user_id.clone()),
                user_name: Set(actor.name.clone()),
                rating: Set(input.rating),
                comment: Set(comment),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            (review.insert(&txn).await?, true)
        }
    };

    recompute_dish_rating(&txn, dish_id).await?;
    txn.commit().await?;

    info!(dish_id, review_id = review.id, created, "dish review saved");
    Ok((review, created))
}

/// Reviews of a dish, newest first.
pub async fn list_dish_reviews(
    db: &DatabaseConnection,
    dish_id: i64,
) -> Result<Vec<dish_review::Model>> {
    DishReview::find()
        .filter(dish_review::Column::DishId.eq(dish_id))
        .order_by_desc(dish_review::Column::UpdatedAt)
        .order_by_desc(dish_review::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a dish review written by the actor (or any review, for an admin).
/// Returns the dish with its recomputed rating.
#[instrument(skip(db, actor), fields(user_id = %actor.user_id))]
pub async fn delete_dish_review(
    db: &DatabaseConnection,
    actor: &Actor,
    review_id: i64,
) -> Result<dish::Model> {
    let txn = db.begin().await?;
    let review = DishReview::find_by_id(review_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("review", review_id))?;
    ensure_author(actor, &review.user_id)?;

    let dish_id = review.dish_id;
    review.delete(&txn).await?;
    let dish = recompute_dish_rating(&txn, dish_id).await?;
    txn.commit().await?;
    Ok(dish)
}

/// Creates the actor's review of a restaurant.
///
/// # Errors
/// Returns [`Error::Duplicate`] when the actor has already reviewed the
/// restaurant, [`Error::Validation`] for a rating outside 1–5,
/// [`Error::NotFound`] for an unknown restaurant.
#[instrument(skip(db, actor, input), fields(user_id = %actor.user_id))]
pub async fn submit_restaurant_review(
    db: &DatabaseConnection,
    actor: &Actor,
    restaurant_id: i64,
    input: ReviewInput,
) -> Result<restaurant_review::Model> {
    let comment = validate(&input)?;

    let txn = db.begin().await?;
    Restaurant::find_by_id(restaurant_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("restaurant", restaurant_id))?;

    let already = RestaurantReview::find()
        .filter(restaurant_review::Column::RestaurantId.eq(restaurant_id))
        .filter(restaurant_review::Column::UserId.eq(actor.user_id.as_str()))
        .one(&txn)
        .await?;
    if already.is_some() {
        return Err(Error::duplicate("review", &actor.user_id));
    }

    let now = chrono::Utc::now();
    let review = restaurant_review::ActiveModel {
        restaurant_id: Set(restaurant_id),
        user_id: Set(actor.user_id.clone()),
        user_name: Set(actor.name.clone()),
        rating: Set(input.rating),
        comment: Set(comment),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    recompute_restaurant_rating(&txn, restaurant_id).await?;
    txn.commit().await?;

    info!(restaurant_id, review_id = review.id, "restaurant review created");
    Ok(review)
}

/// Edits a restaurant review written by the actor.
#[instrument(skip(db, actor, input), fields(user_id = %actor.user_id))]
pub async fn update_restaurant_review(
    db: &DatabaseConnection,
    actor: &Actor,
    review_id: i64,
    input: ReviewInput,
) -> Result<restaurant_review::Model> {
    let comment = validate(&input)?;

    let txn = db.begin().await?;
    let review = RestaurantReview::find_by_id(review_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("review", review_id))?;
    if review.user_id != actor.user_id {
        return Err(Error::Forbidden {
            message: format!("review {review_id} belongs to another user"),
        });
    }

    let restaurant_id = review.restaurant_id;
    let mut review: restaurant_review::ActiveModel = review.into();
    review.rating = Set(input.rating);
    review.comment = Set(comment);
    review.updated_at = Set(chrono::Utc::now());
    let updated = review.update(&txn).await?;

    recompute_restaurant_rating(&txn, restaurant_id).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Deletes a restaurant review written by the actor (or any review, for an
/// admin). Returns the restaurant with its recomputed rating.
#[instrument(skip(db, actor), fields(user_id = %actor.user_id))]
pub async fn delete_restaurant_review(
    db: &DatabaseConnection,
    actor: &Actor,
    review_id: i64,
) -> Result<restaurant::Model> {
    let txn = db.begin().await?;
    let review = RestaurantReview::find_by_id(review_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("review", review_id))?;
    ensure_author(actor, &review.user_id)?;

    let restaurant_id = review.restaurant_id;
    review.delete(&txn).await?;
    let restaurant = recompute_restaurant_rating(&txn, restaurant_id).await?;
    txn.commit().await?;
    Ok(restaurant)
}

/// Reviews of a restaurant, newest first.
pub async fn list_restaurant_reviews(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<restaurant_review::Model>> {
    RestaurantReview::find()
        .filter(restaurant_review::Column::RestaurantId.eq(restaurant_id))
        .order_by_desc(restaurant_review::Column::CreatedAt)
        .order_by_desc(restaurant_review::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

fn ensure_author(actor: &Actor, author_id: &str) -> Result<()> {
    if actor.is_admin() || actor.user_id == author_id {
        Ok(())
    } else {
        Err(Error::Forbidden {
            message: "review belongs to another user".to_string(),
        })
    }
}
