//! Order business logic - pricing carts and placing dine-in orders.
//!
//! Prices always come from the menu, never from the client. Lines for the
//! same dish are merged before pricing. Money is rounded to 2 decimals at
//! each step: line total, subtotal, tax and total.

use crate::{
    core::{table, text},
    entities::{
        Dish, Order, OrderItem, OrderStatus, Restaurant, RestaurantStatus, dish, order, order_item,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Largest quantity accepted for a single dish.
pub const MAX_QUANTITY: i32 = 99;

/// One cart line as sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CartLine {
    /// Dish being ordered
    pub dish_id: i64,
    /// Units, 1 to 99
    pub quantity: i32,
}

/// Checkout form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceOrder {
    /// Table the guest is sitting at
    #[serde(default)]
    pub table_id: Option<i64>,
    /// Name for the kitchen ticket
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Cart contents
    pub items: Vec<CartLine>,
}

/// A cart line priced from the menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedLine {
    /// Dish being ordered
    pub dish_id: i64,
    /// Name at pricing time
    pub dish_name: String,
    /// Price at pricing time
    pub unit_price: f64,
    /// Units, 1 to 99
    pub quantity: i32,
    /// `unit_price * quantity`, rounded
    pub line_total: f64,
}

/// Subtotal, tax and total of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CartTotals {
    /// Sum of line totals
    pub subtotal: f64,
    /// `subtotal * tax_rate`, rounded
    pub tax: f64,
    /// `subtotal + tax`
    pub total: f64,
}

/// Priced cart returned by the preview endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartPreview {
    /// Merged, priced lines
    pub lines: Vec<PricedLine>,
    /// Cart totals
    #[serde(flatten)]
    pub totals: CartTotals,
}

/// An order together with its lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWithItems {
    /// Order header
    #[serde(flatten)]
    pub order: order::Model,
    /// Order lines
    pub items: Vec<order_item::Model>,
}

/// Rounds to cents, halves away from zero.
#[must_use]
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Totals for already priced lines.
#[must_use]
pub fn cart_totals(lines: &[PricedLine], tax_rate: f64) -> CartTotals {
    let subtotal = round_money(lines.iter().map(|l| l.line_total).sum());
    let tax = round_money(subtotal * tax_rate);
    CartTotals {
        subtotal,
        tax,
        total: round_money(subtotal + tax),
    }
}

/// Validates quantities and merges lines for the same dish, keeping the
/// position of the first occurrence.
fn merge_lines(lines: &[CartLine]) -> Result<Vec<CartLine>> {
    if lines.is_empty() {
        return Err(Error::validation("items", "السلة فارغة"));
    }
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if !(1..=MAX_QUANTITY).contains(&line.quantity) {
            return Err(Error::validation(
                "quantity",
                format!("الكمية يجب أن تكون بين 1 و {MAX_QUANTITY}"),
            ));
        }
        match merged.iter_mut().find(|m| m.dish_id == line.dish_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(*line),
        }
    }
    if merged.iter().any(|l| l.quantity > MAX_QUANTITY) {
        return Err(Error::validation(
            "quantity",
            format!("الكمية يجب أن تكون بين 1 و {MAX_QUANTITY}"),
        ));
    }
    Ok(merged)
}

/// Prices cart lines against the restaurant's current menu.
///
/// # Errors
/// - [`Error::NotFound`] for a dish that is missing or belongs elsewhere
/// - [`Error::Validation`] for a sold-out dish or a bad quantity
async fn price_lines<C>(conn: &C, restaurant_id: i64, lines: &[CartLine]) -> Result<Vec<PricedLine>>
where
    C: ConnectionTrait,
{
    let merged = merge_lines(lines)?;
    let ids: Vec<i64> = merged.iter().map(|l| l.dish_id).collect();
    let dishes: HashMap<i64, dish::Model> = Dish::find()
        .filter(dish::Column::RestaurantId.eq(restaurant_id))
        .filter(dish::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();

    merged
        .into_iter()
        .map(|line| {
            let dish = dishes
                .get(&line.dish_id)
                .ok_or_else(|| Error::not_found("dish", line.dish_id))?;
            if !dish.is_available {
                return Err(Error::validation(
                    "items",
                    format!("الطبق \"{}\" غير متوفر حالياً", dish.name),
                ));
            }
            Ok(PricedLine {
                dish_id: dish.id,
                dish_name: dish.name.clone(),
                unit_price: dish.price,
                quantity: line.quantity,
                line_total: round_money(dish.price * f64::from(line.quantity)),
            })
        })
        .collect()
}

/// Prices a cart without placing it.
pub async fn preview_cart(
    db: &DatabaseConnection,
    restaurant_id: i64,
    lines: &[CartLine],
    tax_rate: f64,
) -> Result<CartPreview> {
    let lines = price_lines(db, restaurant_id, lines).await?;
    let totals = cart_totals(&lines, tax_rate);
    Ok(CartPreview { lines, totals })
}

/// Places a dine-in order.
///
/// Everything is checked and written inside one transaction: the restaurant
/// must be `ACTIVE`, the table (when given) must be one of its active tables,
/// and every dish must be an available dish of the restaurant.
#[instrument(skip(db, input), fields(lines = input.items.len()))]
pub async fn place_order(
    db: &DatabaseConnection,
    restaurant_id: i64,
    user_id: Option<&str>,
    input: PlaceOrder,
    tax_rate: f64,
) -> Result<OrderWithItems> {
    let customer_name = text::optional("customer_name", input.customer_name.as_deref(), 80)?;
    let notes = text::optional("notes", input.notes.as_deref(), 500)?;

    let txn = db.begin().await?;

    let restaurant = Restaurant::find_by_id(restaurant_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("restaurant", restaurant_id))?;
    if restaurant.status != RestaurantStatus::Active.as_str() {
        return Err(Error::validation("restaurant", "المطعم لا يستقبل الطلبات حالياً"));
    }

    if let Some(table_id) = input.table_id {
        let table = table::get_restaurant_table(&txn, restaurant_id, table_id).await?;
        if !table.is_active {
            return Err(Error::validation("table_id", "الطاولة غير متاحة حالياً"));
        }
    }

    let lines = price_lines(&txn, restaurant_id, &input.items).await?;
    let totals = cart_totals(&lines, tax_rate);
    let now = chrono::Utc::now();

    let order = order::ActiveModel {
        restaurant_id: Set(restaurant_id),
        table_id: Set(input.table_id),
        user_id: Set(user_id.map(str::to_string)),
        customer_name: Set(customer_name),
        notes: Set(notes),
        status: Set(OrderStatus::New.as_str().to_string()),
        subtotal: Set(totals.subtotal),
        tax: Set(totals.tax),
        total: Set(totals.total),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = order_item::ActiveModel {
            order_id: Set(order.id),
            dish_id: Set(line.dish_id),
            dish_name: Set(line.dish_name),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            line_total: Set(line.line_total),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    txn.commit().await?;
    info!(order_id = order.id, restaurant_id, total = order.total, "order placed");
    Ok(OrderWithItems { order, items })
}

/// Loads an order of a restaurant with its lines.
pub async fn get_order(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
) -> Result<OrderWithItems> {
    let order = Order::find_by_id(order_id)
        .filter(order::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?;
    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;
    Ok(OrderWithItems { order, items })
}

/// Orders of a restaurant, newest first, optionally filtered by status.
pub async fn list_orders(
    db: &DatabaseConnection,
    restaurant_id: i64,
    status: Option<OrderStatus>,
) -> Result<Vec<order::Model>> {
    let mut query = Order::find().filter(order::Column::RestaurantId.eq(restaurant_id));
    if let Some(status) = status {
        query = query.filter(order::Column::Status.eq(status.as_str()));
    }
    query
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets an order's status. Any status may follow any other.
#[instrument(skip(db))]
pub async fn set_order_status(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
    status: OrderStatus,
) -> Result<order::Model> {
    let mut order: order::ActiveModel = Order::find_by_id(order_id)
        .filter(order::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?
        .into();
    order.status = Set(status.as_str().to_string());
    order.updated_at = Set(chrono::Utc::now());
    let updated = order.update(db).await?;
    info!(order_id, %status, "order status changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{dish as dish_core, restaurant as restaurant_core, table::TableInput};
    use crate::test_utils::*;

    fn line(dish_id: i64, quantity: i32) -> CartLine {
        CartLine { dish_id, quantity }
    }

    fn cart(items: Vec<CartLine>) -> PlaceOrder {
        PlaceOrder {
            items,
            ..Default::default()
        }
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(1.005_000_1), 1.01);
        assert_eq!(round_money(2.344), 2.34);
        assert_eq!(round_money(0.0), 0.0);
    }

    #[test]
    fn test_cart_totals() {
        let lines = vec![
            PricedLine {
                dish_id: 1,
                dish_name: "Shawarma".into(),
                unit_price: 10.0,
                quantity: 2,
                line_total: 20.0,
            },
            PricedLine {
                dish_id: 2,
                dish_name: "Tea".into(),
                unit_price: 1.37,
                quantity: 3,
                line_total: 4.11,
            },
        ];
        let totals = cart_totals(&lines, 0.15);
        assert_eq!(totals.subtotal, 24.11);
        assert_eq!(totals.tax, 3.62);
        assert_eq!(totals.total, 27.73);

        let empty = cart_totals(&[], 0.15);
        assert_eq!((empty.subtotal, empty.tax, empty.total), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_merge_lines() {
        let merged = merge_lines(&[line(1, 2), line(2, 1), line(1, 3)]).unwrap();
        assert_eq!(merged, vec![line(1, 5), line(2, 1)]);

        assert!(merge_lines(&[]).is_err());
        assert!(merge_lines(&[line(1, 0)]).is_err());
        assert!(merge_lines(&[line(1, 100)]).is_err());
        assert!(merge_lines(&[line(1, 60), line(1, 40)]).is_err());

        // Merged totals past the cap are rejected, however many lines
        let many = vec![line(1, MAX_QUANTITY); 100_000];
        assert!(matches!(
            merge_lines(&many).unwrap_err(),
            Error::Validation { field: "quantity", .. }
        ));
    }

    #[tokio::test]
    async fn test_place_order_prices_server_side() -> Result<()> {
        let (db, restaurant, shawarma) = setup_with_dish().await?;
        let tea = create_test_dish(&db, restaurant.id, "Tea", 2.0).await?;

        let placed = place_order(
            &db,
            restaurant.id,
            Some("u1"),
            cart(vec![line(shawarma.id, 2), line(tea.id, 1), line(shawarma.id, 1)]),
            0.15,
        )
        .await?;

        assert_eq!(placed.order.status, "NEW");
        assert_eq!(placed.order.user_id.as_deref(), Some("u1"));
        assert_eq!(placed.items.len(), 2);
        assert_eq!(placed.items[0].quantity, 3);
        assert_eq!(placed.items[0].line_total, 30.0);
        assert_eq!(placed.order.subtotal, 32.0);
        assert_eq!(placed.order.tax, 4.8);
        assert_eq!(placed.order.total, 36.8);

        let loaded = get_order(&db, restaurant.id, placed.order.id).await?;
        assert_eq!(loaded, placed);
        Ok(())
    }

    #[tokio::test]
    async fn test_order_rejects_unavailable_and_foreign_dishes() -> Result<()> {
        let (db, restaurant, shawarma) = setup_with_dish().await?;
        dish_core::set_availability(&db, restaurant.id, shawarma.id, false).await?;

        let result = place_order(&db, restaurant.id, None, cart(vec![line(shawarma.id, 1)]), 0.15).await;
        assert!(matches!(result, Err(Error::Validation { field: "items", .. })));

        let other = create_test_restaurant(&db, "Aleppo House", restaurant.country_id).await?;
        let foreign = create_test_dish(&db, other.id, "Kebab", 12.0).await?;
        let result = place_order(&db, restaurant.id, None, cart(vec![line(foreign.id, 1)]), 0.15).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "dish", .. })));

        assert!(list_orders(&db, restaurant.id, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_order_requires_active_restaurant_and_table() -> Result<()> {
        let (db, restaurant, dish) = setup_with_dish().await?;

        let inactive = table::create_dining_table(
            &db,
            restaurant.id,
            TableInput {
                number: 1,
                seats: 2,
                label: None,
                is_active: Some(false),
            },
        )
        .await?;
        let mut input = cart(vec![line(dish.id, 1)]);
        input.table_id = Some(inactive.id);
        let result = place_order(&db, restaurant.id, None, input, 0.15).await;
        assert!(matches!(result, Err(Error::Validation { field: "table_id", .. })));

        restaurant_core::set_status(&db, restaurant.id, RestaurantStatus::Suspended).await?;
        let result = place_order(&db, restaurant.id, None, cart(vec![line(dish.id, 1)]), 0.15).await;
        assert!(matches!(result, Err(Error::Validation { field: "restaurant", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_set_status() -> Result<()> {
        let (db, restaurant, dish) = setup_with_dish().await?;
        let first = place_order(&db, restaurant.id, None, cart(vec![line(dish.id, 1)]), 0.15).await?;
        let second = place_order(&db, restaurant.id, None, cart(vec![line(dish.id, 2)]), 0.15).await?;

        let all = list_orders(&db, restaurant.id, None).await?;
        assert_eq!(all[0].id, second.order.id);

        let ready = set_order_status(&db, restaurant.id, first.order.id, OrderStatus::Ready).await?;
        assert_eq!(ready.status, "READY");

        let filtered = list_orders(&db, restaurant.id, Some(OrderStatus::Ready)).await?;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, first.order.id);

        // Set directly, no transition rules
        let back = set_order_status(&db, restaurant.id, first.order.id, OrderStatus::New).await?;
        assert_eq!(back.status, "NEW");
        Ok(())
    }

    #[tokio::test]
    async fn test_preview_cart() -> Result<()> {
        let (db, restaurant, dish) = setup_with_dish().await?;
        let preview = preview_cart(&db, restaurant.id, &[line(dish.id, 3)], 0.1).await?;
        assert_eq!(preview.lines[0].line_total, 30.0);
        assert_eq!(preview.totals.tax, 3.0);
        assert_eq!(preview.totals.total, 33.0);
        Ok(())
    }
}
