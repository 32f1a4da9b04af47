use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{
    order_items::Model as OrderItemModel,
    orders::{Model as OrderModel, OrderStatus},
    products::Model as ProductModel,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    #[serde(rename = "userID")]
    pub user_id: Option<i32>,
    pub date: DateTime<Utc>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i32,
    pub quantity: i32,
    pub sub_total: Decimal,
    pub order_id: i32,
    pub product_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Money columns are DECIMAL(10,2); SQLite stores them as REAL, so normalize
/// the scale on the way out.
fn money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

impl From<ProductModel> for Product {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: money(model.price),
            description: model.description,
            image_url: model.image_url,
            stock: model.stock,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<OrderModel> for Order {
    fn from(model: OrderModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            date: model.date,
            total: money(model.total),
            status: model.status,
            shipping_address: model.shipping_address,
            payment_method: model.payment_method,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        Self {
            id: model.id,
            quantity: model.quantity,
            sub_total: money(model.sub_total),
            order_id: model.order_id,
            product_id: model.product_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
