use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::{Order, OrderItem};

/// Payload posted by the checkout wizard.
///
/// Fields are kept loosely typed so that each one can be rejected with its own
/// message; `order_service` turns this into a [`NewOrder`].
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[schema(value_type = Option<Vec<OrderLine>>)]
    pub items: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub total: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub shipping_address: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub payment_method: Option<Value>,
}

/// A cart line as sent by the client. Extra product fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct OrderLine {
    /// Product id.
    pub id: i32,
    pub price: Decimal,
    pub quantity: i32,
}

/// A validated line, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub product_id: i32,
    pub quantity: i32,
    pub sub_total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub lines: Vec<NewOrderLine>,
    pub total: Decimal,
    pub shipping_address: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}
