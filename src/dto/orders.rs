use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, ShippingAddress};

/// Checkout payload. Unknown keys are rejected at the boundary instead of
/// being silently dropped, so a misspelled field fails loudly.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub order_items: Vec<OrderItemRequest>,
    pub payment_method: String,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    pub shipping_address: ShippingAddressRequest,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub qty: i32,
    /// Line price at checkout; falls back to the product's current price.
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShippingAddressRequest {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// The full order aggregate: the order row, its shipping address, and the
/// line items in the order they were submitted.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub shipping_address: ShippingAddress,
    pub order_items: Vec<OrderItem>,
}
