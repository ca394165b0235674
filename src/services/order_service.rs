use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderDetail, PlaceOrderRequest},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        shipping_addresses::{
            ActiveModel as AddressActive, Column as AddressCol, Entity as ShippingAddresses,
            Model as AddressModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderItem, ShippingAddress},
    state::AppState,
};

struct ValidatedLine {
    product: ProductModel,
    qty: i32,
    price: Decimal,
}

/// Place an order: validate every cart line, then create the order, its
/// shipping address and line-item snapshots, and decrement stock, all in
/// one transaction. Rows are locked while validating so a concurrent
/// checkout of the same product cannot oversell; the conditional decrement
/// backstops the invariant that stock never goes negative.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<OrderDetail> {
    if payload.order_items.is_empty() {
        return Err(AppError::BadRequest("No order items".into()));
    }
    if payload.tax_price < Decimal::ZERO
        || payload.shipping_price < Decimal::ZERO
        || payload.total_price < Decimal::ZERO
    {
        return Err(AppError::BadRequest("Prices must not be negative".into()));
    }

    let txn = state.orm.begin().await?;

    // Validate every line before touching anything. A failure on line N
    // must not leave lines 1..N-1 decremented.
    let mut lines: Vec<ValidatedLine> = Vec::with_capacity(payload.order_items.len());
    for item in &payload.order_items {
        let product = Products::find_by_id(item.product_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        if item.qty <= 0 {
            return Err(AppError::BadRequest(
                "Quantity must be greater than zero".into(),
            ));
        }
        if let Some(price) = item.price {
            if price < Decimal::ZERO {
                return Err(AppError::BadRequest("Prices must not be negative".into()));
            }
        }
        if product.count_in_stock < item.qty {
            return Err(AppError::BadRequest(format!(
                "{} does not have enough stock",
                product.name
            )));
        }

        let price = item.price.unwrap_or(product.price);
        lines.push(ValidatedLine {
            product,
            qty: item.qty,
            price,
        });
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        payment_method: Set(payload.payment_method),
        tax_price: Set(payload.tax_price),
        shipping_price: Set(payload.shipping_price),
        total_price: Set(payload.total_price),
        is_paid: Set(false),
        paid_at: Set(None),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        address: Set(payload.shipping_address.address),
        city: Set(payload.shipping_address.city),
        postal_code: Set(payload.shipping_address.postal_code),
        country: Set(payload.shipping_address.country),
        shipping_price: Set(payload.shipping_price),
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            position: Set(position as i32),
            product_id: Set(Some(line.product.id)),
            name: Set(line.product.name.clone()),
            qty: Set(line.qty),
            price: Set(line.price),
            image: Set(line.product.image.clone()),
        }
        .insert(&txn)
        .await?;

        order_items.push(order_item_from_entity(item));

        let decremented = Products::update_many()
            .col_expr(
                ProdCol::CountInStock,
                Expr::col(ProdCol::CountInStock).sub(line.qty),
            )
            .filter(ProdCol::Id.eq(line.product.id))
            .filter(ProdCol::CountInStock.gte(line.qty))
            .exec(&txn)
            .await?;
        if decremented.rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "{} is out of stock",
                line.product.name
            )));
        }
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_placed",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(OrderDetail {
        order: order_from_entity(order),
        shipping_address: address_from_entity(address),
        order_items,
    })
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<OrderDetail> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.user_id != user.user_id && !user.is_admin {
        return Err(AppError::Forbidden(
            "Not authorized to view this order".into(),
        ));
    }

    load_detail(&state.orm, order).await
}

pub async fn list_my_orders(state: &AppState, user: &AuthUser) -> AppResult<Vec<Order>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();
    Ok(orders)
}

pub async fn list_all_orders(state: &AppState, user: &AuthUser) -> AppResult<Vec<Order>> {
    ensure_admin(user)?;
    let orders = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();
    Ok(orders)
}

/// Mark an order as paid. Re-paying an already-paid order is rejected
/// rather than silently refreshing `paid_at`.
pub async fn pay_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<OrderDetail> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.user_id != user.user_id && !user.is_admin {
        return Err(AppError::Forbidden(
            "Not authorized to update this order".into(),
        ));
    }
    if order.is_paid {
        return Err(AppError::Conflict("Order already paid".into()));
    }

    let mut active: OrderActive = order.into();
    active.is_paid = Set(true);
    active.paid_at = Set(Some(Utc::now().into()));
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_paid",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    load_detail(&state.orm, order).await
}

async fn load_detail<C: ConnectionTrait>(conn: &C, order: OrderModel) -> AppResult<OrderDetail> {
    let address = ShippingAddresses::find()
        .filter(AddressCol::OrderId.eq(order.id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order has no shipping address")))?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(OrderDetail {
        order: order_from_entity(order),
        shipping_address: address_from_entity(address),
        order_items: items,
    })
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        payment_method: model.payment_method,
        tax_price: model.tax_price,
        shipping_price: model.shipping_price,
        total_price: model.total_price,
        is_paid: model.is_paid,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        name: model.name,
        qty: model.qty,
        price: model.price,
        image: model.image,
    }
}

fn address_from_entity(model: AddressModel) -> ShippingAddress {
    ShippingAddress {
        id: model.id,
        order_id: model.order_id,
        address: model.address,
        city: model.city,
        postal_code: model.postal_code,
        country: model.country,
        shipping_price: model.shipping_price,
    }
}
