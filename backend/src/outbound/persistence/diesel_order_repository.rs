//! PostgreSQL-backed [`OrderRepository`].
//!
//! Placement runs in one transaction: the order row, its item rows and a
//! conditional stock decrement per line. A decrement that matches no row
//! (stock below the requested quantity) rolls the whole transaction back.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{OrderPersistenceError, OrderRepository};
use crate::domain::{
    Order, OrderDraft, OrderId, OrderItem, OrderItemDraft, OrderItemId, OrderStatus, ProductId,
    ShippingAddress, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{OrderChangeset, OrderItemRow, OrderRow};
use super::pool::DbPool;
use super::schema::{order_items, orders, products};

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, AsyncPgConnection>,
        OrderPersistenceError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, OrderPersistenceError::connection))
    }
}

/// Ways a placement transaction can abort.
#[derive(Debug)]
enum PlacementError {
    Database(diesel::result::Error),
    InsufficientStock(ProductId),
}

impl From<diesel::result::Error> for PlacementError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

fn query_error(error: diesel::result::Error) -> OrderPersistenceError {
    map_diesel_error(
        error,
        OrderPersistenceError::query,
        OrderPersistenceError::connection,
    )
}

fn invalid_row(order_id: Uuid, err: &dyn std::fmt::Display) -> OrderPersistenceError {
    warn!(order_id = %order_id, error = %err, "stored order row is invalid");
    OrderPersistenceError::query("stored order row is invalid")
}

fn order_to_rows(order: &Order) -> Result<(OrderRow, Vec<OrderItemRow>), OrderPersistenceError> {
    let items = order
        .items()
        .iter()
        .map(|item| {
            Ok(OrderItemRow {
                id: *item.id().as_uuid(),
                order_id: *order.id().as_uuid(),
                product_id: *item.product_id().as_uuid(),
                product_name: item.product_name().to_owned(),
                quantity: i32::try_from(item.quantity())
                    .map_err(|_| OrderPersistenceError::query("quantity out of range"))?,
                price: item.price(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let row = OrderRow {
        id: *order.id().as_uuid(),
        user_id: *order.user_id().as_uuid(),
        total_amount: order.total_amount(),
        status: order.status().as_str().to_owned(),
        shipping_address: order.shipping_address().to_string(),
        notes: order.notes().map(str::to_owned),
        created_at: order.created_at(),
        updated_at: order.updated_at(),
    };
    Ok((row, items))
}

fn rows_to_order(row: OrderRow, items: Vec<OrderItemRow>) -> Result<Order, OrderPersistenceError> {
    let order_id = row.id;
    let items = items
        .into_iter()
        .map(|item| {
            OrderItem::new(OrderItemDraft {
                id: OrderItemId::from_uuid(item.id),
                order_id: OrderId::from_uuid(item.order_id),
                product_id: ProductId::from_uuid(item.product_id),
                product_name: item.product_name,
                quantity: i64::from(item.quantity),
                price: item.price,
            })
            .map_err(|err| invalid_row(order_id, &err))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let status: OrderStatus = row.status.parse().map_err(|err| invalid_row(order_id, &err))?;
    let shipping_address =
        ShippingAddress::parse(&row.shipping_address).map_err(|err| invalid_row(order_id, &err))?;
    Order::new(OrderDraft {
        id: OrderId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        items,
        total_amount: row.total_amount,
        status,
        shipping_address,
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| invalid_row(order_id, &err))
}

/// Attach item rows to their orders, preserving the order of `rows`.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, OrderPersistenceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let item_rows: Vec<OrderItemRow> = order_items::table
        .filter(order_items::order_id.eq_any(ids))
        .order(order_items::id.asc())
        .select(OrderItemRow::as_select())
        .load(conn)
        .await
        .map_err(query_error)?;
    let mut by_order: HashMap<Uuid, Vec<OrderItemRow>> = HashMap::new();
    for item in item_rows {
        by_order.entry(item.order_id).or_default().push(item);
    }
    rows.into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            rows_to_order(row, items)
        })
        .collect()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place(&self, order: &Order) -> Result<(), OrderPersistenceError> {
        let (order_row, item_rows) = order_to_rows(order)?;
        let placed_at = order.created_at();
        let mut conn = self.connection().await?;

        let outcome = conn
            .transaction::<_, PlacementError, _>(|conn| {
                async move {
                    for item in &item_rows {
                        let updated = diesel::update(
                            products::table
                                .filter(products::id.eq(item.product_id))
                                .filter(products::stock.ge(item.quantity)),
                        )
                        .set((
                            products::stock.eq(products::stock - item.quantity),
                            products::updated_at.eq(placed_at),
                        ))
                        .execute(conn)
                        .await?;
                        if updated == 0 {
                            return Err(PlacementError::InsufficientStock(ProductId::from_uuid(
                                item.product_id,
                            )));
                        }
                    }

                    diesel::insert_into(orders::table)
                        .values(&order_row)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(order_items::table)
                        .values(&item_rows)
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(PlacementError::InsufficientStock(product_id)) => {
                debug!(order_id = %order.id(), %product_id, "stock decrement matched no row");
                Err(OrderPersistenceError::insufficient_stock(product_id))
            }
            Err(PlacementError::Database(error)) => Err(query_error(error)),
        }
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderPersistenceError> {
        let mut conn = self.connection().await?;
        let row = orders::table
            .find(*id.as_uuid())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error)?;
        match row {
            Some(row) => Ok(hydrate(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.connection().await?;
        let rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(*user_id.as_uuid()))
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.connection().await?;
        let rows: Vec<OrderRow> = orders::table
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn update(&self, order: &Order) -> Result<bool, OrderPersistenceError> {
        let changes = OrderChangeset {
            status: order.status().as_str(),
            shipping_address: order.shipping_address().to_string(),
            notes: order.notes(),
            updated_at: order.updated_at(),
        };
        let mut conn = self.connection().await?;
        let updated = diesel::update(orders::table.find(*order.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(query_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, OrderPersistenceError> {
        let mut conn = self.connection().await?;
        let deleted = diesel::delete(orders::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(query_error)?;
        Ok(deleted > 0)
    }
}
