//! Order repository.
//!
//! Orders are written once at placement, inside a single transaction that
//! also clears the cart. Line items snapshot the bike so later catalog edits
//! cannot change what an order says was bought.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use torque_core::{BikeId, OrderId, OrderItemId, OrderStatus, ShippingMethod, UserId};

use super::RepositoryError;
use crate::models::{Cart, Order, OrderItem};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    order_date: NaiveDate,
    ship_date: NaiveDate,
    payment_method: String,
    shipping_method: String,
    total: Decimal,
    status: String,
    address: String,
    phone: String,
}

impl OrderRow {
    fn into_order(self, order_items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let shipping_method: ShippingMethod = self.shipping_method.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid shipping method in database: {e}"))
        })?;
        let status: OrderStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            order_items,
            order_date: self.order_date,
            ship_date: self.ship_date,
            payment_method: self.payment_method,
            shipping_method,
            total: self.total,
            status,
            address: self.address,
            phone: self.phone,
        })
    }
}

/// Internal row type for `PostgreSQL` order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    bike_id: Option<i32>,
    name: String,
    unit_price: Decimal,
    photo: Option<String>,
    quantity: i32,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative quantity for order item {}", row.id))
        })?;

        Ok(Self {
            id: OrderItemId::new(row.id),
            bike_id: row.bike_id.map(BikeId::new),
            name: row.name,
            unit_price: row.unit_price,
            photo: row.photo,
            quantity,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, order_date, ship_date, payment_method, \
                             shipping_method, total, status, address, phone";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, bike_id, name, unit_price, photo, quantity";

// =============================================================================
// Input Types
// =============================================================================

/// Everything the checkout path decided about a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub order_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub payment_method: String,
    pub shipping_method: ShippingMethod,
    pub total: Decimal,
    pub address: String,
    pub phone: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order from the given cart and clear the cart, in one
    /// transaction. The cart must belong to `new.user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction rolls back and the cart is left untouched.
    pub async fn place(&self, new: &NewOrder, cart: &Cart) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders \
               (user_id, order_date, ship_date, payment_method, shipping_method, total, status, address, phone) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new.user_id.as_i32())
        .bind(new.order_date)
        .bind(new.ship_date)
        .bind(&new.payment_method)
        .bind(new.shipping_method.to_string())
        .bind(new.total)
        .bind(OrderStatus::Ordered.to_string())
        .bind(&new.address)
        .bind(&new.phone)
        .fetch_one(&mut *tx)
        .await?;

        let mut order_items = Vec::with_capacity(cart.cart_items.len());
        for item in &cart.cart_items {
            let item_row = sqlx::query_as::<_, OrderItemRow>(&format!(
                "INSERT INTO order_items (order_id, bike_id, name, unit_price, photo, quantity) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING {ORDER_ITEM_COLUMNS}"
            ))
            .bind(order_row.id)
            .bind(item.bike.id.as_i32())
            .bind(&item.bike.name)
            .bind(item.bike.price)
            .bind(&item.bike.photo)
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .fetch_one(&mut *tx)
            .await?;

            order_items.push(item_row.try_into()?);
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(new.user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        order_row.into_order(order_items)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY id DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// List every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Set an order's status.
    ///
    /// No lifecycle validation beyond the route-level admin check: the two
    /// statuses are flipped on demand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $1 WHERE id = $2 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(status.to_string())
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        let items = self.items_for(&[row.id]).await?;
        let order_items = items.into_values().next().unwrap_or_default();
        row.into_order(order_items)
    }

    /// Delete an order at any status. Immediate and irreversible.
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch the items of a batch of orders in one query, grouped by order.
    async fn items_for(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderItem>>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            grouped.entry(order_id).or_default().push(row.try_into()?);
        }

        Ok(grouped)
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }
}
