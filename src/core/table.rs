//! Dining table business logic.
//!
//! Table numbers are unique within a restaurant. A table that is switched off
//! stays attached to past orders but cannot receive new ones.

use crate::{
    core::text,
    entities::{DiningTable, dining_table},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::instrument;

/// Portal form for a table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableInput {
    /// Table number, 1 or more
    pub number: i32,
    /// Seat count, 1 or more
    pub seats: i32,
    /// Optional label
    #[serde(default)]
    pub label: Option<String>,
    /// Defaults to active
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn validate(input: &TableInput) -> Result<Option<String>> {
    if input.number < 1 {
        return Err(Error::validation("number", "رقم الطاولة يجب أن يكون 1 أو أكثر"));
    }
    if !(1..=100).contains(&input.seats) {
        return Err(Error::validation("seats", "عدد المقاعد يجب أن يكون بين 1 و 100"));
    }
    text::optional("label", input.label.as_deref(), 60)
}

async fn ensure_unique_number(
    db: &DatabaseConnection,
    restaurant_id: i64,
    number: i32,
    exclude_id: Option<i64>,
) -> Result<()> {
    let clash = DiningTable::find()
        .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
        .filter(dining_table::Column::Number.eq(number))
        .one(db)
        .await?
        .is_some_and(|t| Some(t.id) != exclude_id);
    if clash {
        return Err(Error::duplicate("table", number));
    }
    Ok(())
}

/// Finds a table, checking it belongs to `restaurant_id`.
pub async fn get_restaurant_table<C>(
    conn: &C,
    restaurant_id: i64,
    table_id: i64,
) -> Result<dining_table::Model>
where
    C: ConnectionTrait,
{
    DiningTable::find_by_id(table_id)
        .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("table", table_id))
}

/// Tables of a restaurant ordered by number.
pub async fn list_tables(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<dining_table::Model>> {
    DiningTable::find()
        .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(dining_table::Column::Number)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a table.
#[instrument(skip(db, input), fields(number = input.number))]
pub async fn create_dining_table(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: TableInput,
) -> Result<dining_table::Model> {
    let label = validate(&input)?;
    ensure_unique_number(db, restaurant_id, input.number, None).await?;

    dining_table::ActiveModel {
        restaurant_id: Set(restaurant_id),
        number: Set(input.number),
        seats: Set(input.seats),
        label: Set(label),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Edits a table. `is_active` is kept when absent.
#[instrument(skip(db, input))]
pub async fn update_dining_table(
    db: &DatabaseConnection,
    restaurant_id: i64,
    table_id: i64,
    input: TableInput,
) -> Result<dining_table::Model> {
    let label = validate(&input)?;
    let existing = get_restaurant_table(db, restaurant_id, table_id).await?;
    ensure_unique_number(db, restaurant_id, input.number, Some(table_id)).await?;

    let mut table: dining_table::ActiveModel = existing.into();
    table.number = Set(input.number);
    table.seats = Set(input.seats);
    table.label = Set(label);
    if let Some(active) = input.is_active {
        table.is_active = Set(active);
    }
    table.update(db).await.map_err(Into::into)
}

/// Removes a table. Orders placed at it keep their lines but lose the table
/// reference.
#[instrument(skip(db))]
pub async fn delete_dining_table(
    db: &DatabaseConnection,
    restaurant_id: i64,
    table_id: i64,
) -> Result<()> {
    let table = get_restaurant_table(db, restaurant_id, table_id).await?;
    table.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn table(number: i32, seats: i32) -> TableInput {
        TableInput {
            number,
            seats,
            label: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_tables_listed_by_number() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        create_dining_table(&db, restaurant.id, table(3, 2)).await?;
        create_dining_table(&db, restaurant.id, table(1, 4)).await?;

        let tables = list_tables(&db, restaurant.id).await?;
        let numbers: Vec<i32> = tables.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert!(tables.iter().all(|t| t.is_active));
        Ok(())
    }

    #[tokio::test]
    async fn test_table_number_unique_per_restaurant() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let first = create_dining_table(&db, restaurant.id, table(1, 4)).await?;
        let second = create_dining_table(&db, restaurant.id, table(2, 4)).await?;

        let result = create_dining_table(&db, restaurant.id, table(1, 2)).await;
        assert!(matches!(result, Err(Error::Duplicate { .. })));

        let result = update_dining_table(&db, restaurant.id, second.id, table(1, 2)).await;
        assert!(matches!(result, Err(Error::Duplicate { .. })));

        // Keeping its own number is fine
        let updated = update_dining_table(&db, restaurant.id, first.id, table(1, 6)).await?;
        assert_eq!(updated.seats, 6);

        // Another restaurant may reuse the number
        let other = create_test_restaurant(&db, "Aleppo House", restaurant.country_id).await?;
        create_dining_table(&db, other.id, table(1, 2)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_table_validation() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let result = create_dining_table(&db, restaurant.id, table(0, 4)).await;
        assert!(matches!(result, Err(Error::Validation { field: "number", .. })));
        let result = create_dining_table(&db, restaurant.id, table(1, 0)).await;
        assert!(matches!(result, Err(Error::Validation { field: "seats", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_deactivate_and_delete_table() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let created = create_dining_table(&db, restaurant.id, table(5, 2)).await?;

        let mut input = table(5, 2);
        input.is_active = Some(false);
        let updated = update_dining_table(&db, restaurant.id, created.id, input).await?;
        assert!(!updated.is_active);

        delete_dining_table(&db, restaurant.id, created.id).await?;
        let result = get_restaurant_table(&db, restaurant.id, created.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }
}
