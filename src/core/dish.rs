//! Dish business logic - the restaurant menu.
//!
//! Dishes belong to exactly one restaurant; every portal operation takes the
//! restaurant id alongside the dish id so an owner can only reach their own menu.

use crate::{
    core::{slug, text},
    entities::{Dish, dish},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Portal form for a dish.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DishInput {
    /// Display name
    pub name: String,
    /// Slug; derived from the name when absent
    #[serde(default)]
    pub slug: Option<String>,
    /// Menu description
    #[serde(default)]
    pub description: Option<String>,
    /// Menu section
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Availability; `true` when absent
    #[serde(default)]
    pub is_available: Option<bool>,
}

/// One section of the menu.
#[derive(Debug, Clone, Serialize)]
pub struct MenuSection {
    /// Section name
    pub category: String,
    /// Dishes in the section, alphabetical
    pub dishes: Vec<dish::Model>,
}

struct ValidDish {
    name: String,
    slug: String,
    description: Option<String>,
    category: String,
    price: f64,
    image_url: Option<String>,
}

fn validate(input: &DishInput) -> Result<ValidDish> {
    let name = text::required("name", &input.name, 120)?;
    let slug = slug::slug_or_derive(input.slug.as_deref(), &name);
    if slug.is_empty() {
        return Err(Error::validation("slug", "الرابط المختصر غير صالح"));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(Error::validation("price", "السعر يجب أن يكون رقماً موجباً"));
    }
    Ok(ValidDish {
        name,
        slug,
        description: text::optional("description", input.description.as_deref(), 2000)?,
        category: text::required("category", &input.category, 60)?,
        price: input.price,
        image_url: text::optional_url("image_url", input.image_url.as_deref())?,
    })
}

async fn ensure_unique_slug(
    db: &DatabaseConnection,
    restaurant_id: i64,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let mut query = Dish::find()
        .filter(dish::Column::RestaurantId.eq(restaurant_id))
        .filter(dish::Column::Slug.eq(slug));
    if let Some(id) = exclude_id {
        query = query.filter(dish::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::duplicate("dish", slug));
    }
    Ok(())
}

/// Finds a dish by id regardless of restaurant.
pub async fn get_dish_by_id(db: &DatabaseConnection, dish_id: i64) -> Result<Option<dish::Model>> {
    Dish::find_by_id(dish_id).one(db).await.map_err(Into::into)
}

/// Loads a dish that must belong to `restaurant_id`.
///
/// # Errors
/// Returns [`Error::NotFound`] when the dish does not exist or belongs to
/// another restaurant.
pub async fn get_restaurant_dish(
    db: &DatabaseConnection,
    restaurant_id: i64,
    dish_id: i64,
) -> Result<dish::Model> {
    Dish::find_by_id(dish_id)
        .filter(dish::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("dish", dish_id))
}

/// Finds a dish by its slug within a restaurant.
pub async fn get_dish_by_slug(
    db: &DatabaseConnection,
    restaurant_id: i64,
    slug: &str,
) -> Result<Option<dish::Model>> {
    Dish::find()
        .filter(dish::Column::RestaurantId.eq(restaurant_id))
        .filter(dish::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All dishes of a restaurant ordered by category then name.
pub async fn list_dishes(db: &DatabaseConnection, restaurant_id: i64) -> Result<Vec<dish::Model>> {
    Dish::find()
        .filter(dish::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(dish::Column::Category)
        .order_by_asc(dish::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The menu grouped by category. Unavailable dishes are left out unless
/// `include_unavailable` is set (the portal view).
pub async fn list_menu(
    db: &DatabaseConnection,
    restaurant_id: i64,
    include_unavailable: bool,
) -> Result<Vec<MenuSection>> {
    let dishes = list_dishes(db, restaurant_id).await?;
    Ok(group_by_category(
        dishes
            .into_iter()
            .filter(|d| include_unavailable || d.is_available),
    ))
}

fn group_by_category(dishes: impl Iterator<Item = dish::Model>) -> Vec<MenuSection> {
    let mut sections: Vec<MenuSection> = Vec::new();
    for dish in dishes {
        match sections.last_mut() {
            Some(section) if section.category == dish.category => section.dishes.push(dish),
            _ => sections.push(MenuSection {
                category: dish.category.clone(),
                dishes: vec![dish],
            }),
        }
    }
    sections
}

/// Adds a dish to a restaurant's menu.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank name/category or a negative or
/// non-finite price, [`Error::Duplicate`] when the slug is taken within the
/// restaurant.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_dish(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: DishInput,
) -> Result<dish::Model> {
    let valid = validate(&input)?;
    ensure_unique_slug(db, restaurant_id, &valid.slug, None).await?;

    let now = chrono::Utc::now();
    let dish = dish::ActiveModel {
        restaurant_id: Set(restaurant_id),
        name: Set(valid.name),
        slug: Set(valid.slug),
        description: Set(valid.description),
        category: Set(valid.category),
        price: Set(valid.price),
        image_url: Set(valid.image_url),
        is_available: Set(input.is_available.unwrap_or(true)),
        rating: Set(0.0),
        rating_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = dish.insert(db).await?;
    info!(dish_id = created.id, restaurant_id, "dish created");
    Ok(created)
}

/// Updates a dish; rating fields are left alone.
#[instrument(skip(db, input))]
pub async fn update_dish(
    db: &DatabaseConnection,
    restaurant_id: i64,
    dish_id: i64,
    input: DishInput,
) -> Result<dish::Model> {
    let valid = validate(&input)?;
    let existing = get_restaurant_dish(db, restaurant_id, dish_id).await?;
    ensure_unique_slug(db, restaurant_id, &valid.slug, Some(dish_id)).await?;

    let is_available = input.is_available.unwrap_or(existing.is_available);
    let mut dish: dish::ActiveModel = existing.into();
    dish.name = Set(valid.name);
    dish.slug = Set(valid.slug);
    dish.description = Set(valid.description);
    dish.category = Set(valid.category);
    dish.price = Set(valid.price);
    dish.image_url = Set(valid.image_url);
    dish.is_available = Set(is_available);
    dish.updated_at = Set(chrono::Utc::now());
    dish.update(db).await.map_err(Into::into)
}

/// Marks a dish available or sold out.
pub async fn set_availability(
    db: &DatabaseConnection,
    restaurant_id: i64,
    dish_id: i64,
    is_available: bool,
) -> Result<dish::Model> {
    let mut dish: dish::ActiveModel = get_restaurant_dish(db, restaurant_id, dish_id)
        .await?
        .into();
    dish.is_available = Set(is_available);
    dish.updated_at = Set(chrono::Utc::now());
    dish.update(db).await.map_err(Into::into)
}

/// Removes a dish; its reviews and favorites cascade.
#[instrument(skip(db))]
pub async fn delete_dish(db: &DatabaseConnection, restaurant_id: i64, dish_id: i64) -> Result<()> {
    let dish = get_restaurant_dish(db, restaurant_id, dish_id).await?;
    dish.delete(db).await?;
    info!(dish_id, restaurant_id, "dish deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_dish_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let input = DishInput {
            name: "Kibbeh".to_string(),
            category: "Mezze".to_string(),
            price: -1.0,
            ..Default::default()
        };
        let result = create_dish(&db, 1, input.clone()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "price", .. }
        ));

        let result = create_dish(
            &db,
            1,
            DishInput {
                price: f64::NAN,
                ..input.clone()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "price", .. }
        ));

        let result = create_dish(
            &db,
            1,
            DishInput {
                price: 5.0,
                category: "  ".to_string(),
                ..input
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "category",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_dish_integration() -> Result<()> {
        let (db, restaurant, dish) = setup_with_dish().await?;
        assert_eq!(dish.restaurant_id, restaurant.id);
        assert_eq!(dish.slug, "shawarma");
        assert_eq!(dish.price, 10.0);
        assert!(dish.is_available);

        let found = get_dish_by_slug(&db, restaurant.id, "shawarma").await?.unwrap();
        assert_eq!(found.id, dish.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_slug_scoped_to_restaurant() -> Result<()> {
        let (db, restaurant, _dish) = setup_with_dish().await?;

        let result = create_test_dish(&db, restaurant.id, "Shawarma", 12.0).await;
        assert!(matches!(result.unwrap_err(), Error::Duplicate { .. }));

        // Another restaurant may use the same slug
        let other = create_test_restaurant(&db, "Other Place", restaurant.country_id).await?;
        create_test_dish(&db, other.id, "Shawarma", 12.0).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_dish_wrong_restaurant() -> Result<()> {
        let (db, restaurant, dish) = setup_with_dish().await?;
        let other = create_test_restaurant(&db, "Other Place", restaurant.country_id).await?;

        let input = DishInput {
            name: "Shawarma Plate".to_string(),
            category: "Mains".to_string(),
            price: 14.5,
            ..Default::default()
        };
        let result = update_dish(&db, other.id, dish.id, input.clone()).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        let updated = update_dish(&db, restaurant.id, dish.id, input).await?;
        assert_eq!(updated.name, "Shawarma Plate");
        assert_eq!(updated.slug, "shawarma-plate");
        assert_eq!(updated.price, 14.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_menu_groups_and_hides_unavailable() -> Result<()> {
        let (db, restaurant, shawarma) = setup_with_dish().await?;
        create_dish(
            &db,
            restaurant.id,
            DishInput {
                name: "Hummus".to_string(),
                category: "Mezze".to_string(),
                price: 4.0,
                ..Default::default()
            },
        )
        .await?;
        create_test_dish(&db, restaurant.id, "Kebab", 11.0).await?;
        set_availability(&db, restaurant.id, shawarma.id, false).await?;

        let public = list_menu(&db, restaurant.id, false).await?;
        assert_eq!(public.len(), 2);
        assert_eq!(public[0].category, "Mains");
        assert_eq!(public[0].dishes.len(), 1);
        assert_eq!(public[0].dishes[0].name, "Kebab");
        assert_eq!(public[1].category, "Mezze");

        let portal = list_menu(&db, restaurant.id, true).await?;
        assert_eq!(portal[0].dishes.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_dish() -> Result<()> {
        let (db, restaurant, dish) = setup_with_dish().await?;
        delete_dish(&db, restaurant.id, dish.id).await?;
        assert!(get_dish_by_id(&db, dish.id).await?.is_none());
        assert!(matches!(
            delete_dish(&db, restaurant.id, dish.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));
        Ok(())
    }
}
