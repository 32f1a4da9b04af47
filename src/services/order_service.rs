use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use serde_json::Value;

use crate::{
    dto::orders::{CreateOrderRequest, CreatedOrder, NewOrder, NewOrderLine, OrderLine},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders, OrderStatus},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem},
    state::AppState,
};

/// The only payment method checkout accepts.
pub const CREDIT_CARD: &str = "credit_card";

pub const ITEMS_REQUIRED: &str = "Items are required and should be an array.";
pub const TOTAL_REQUIRED: &str = "Total amount is required and should be a number.";
pub const ADDRESS_REQUIRED: &str = "Shipping address is required and should be a string.";
pub const PAYMENT_METHOD_REQUIRED: &str =
    "Payment method is required and should be 'credit_card'.";
pub const NEGATIVE_QUANTITY: &str = "Quantity must not be negative.";
pub const TOTAL_OUT_OF_RANGE: &str = "Total amount is out of range.";
pub const SUB_TOTAL_OUT_OF_RANGE: &str = "Invalid order item: sub-total is out of range.";

/// Largest amount a DECIMAL(10,2) column holds.
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

pub async fn create_order(state: &AppState, payload: CreateOrderRequest) -> AppResult<CreatedOrder> {
    let new_order = validate_request(payload)?;
    tracing::debug!(
        lines = new_order.lines.len(),
        total = %new_order.total,
        "received order"
    );

    let txn = state.orm.begin().await?;

    let product_ids: BTreeSet<i32> = new_order.lines.iter().map(|line| line.product_id).collect();
    let known: BTreeSet<i32> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids.iter().copied()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| product.id)
        .collect();
    if let Some(missing) = product_ids.difference(&known).next() {
        return Err(AppError::BadRequest(format!("Product {missing} not found")));
    }

    let now = Utc::now();
    let order = OrderActive {
        id: NotSet,
        user_id: Set(None),
        date: Set(now),
        total: Set(new_order.total),
        status: Set(OrderStatus::Pending),
        shipping_address: Set(new_order.shipping_address),
        payment_method: Set(new_order.payment_method),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut order_items = Vec::with_capacity(new_order.lines.len());
    for line in &new_order.lines {
        let item = OrderItemActive {
            id: NotSet,
            quantity: Set(line.quantity),
            sub_total: Set(line.sub_total),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        order_items.push(OrderItem::from(item));
    }

    txn.commit().await?;

    tracing::info!(order_id = order.id, items = order_items.len(), "order created");

    Ok(CreatedOrder {
        order: Order::from(order),
        order_items,
    })
}

pub async fn get_order(state: &AppState, id: i32) -> AppResult<CreatedOrder> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Order not found"))?;

    let order_items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(CreatedOrder {
        order: Order::from(order),
        order_items,
    })
}

/// Check the checkout payload field by field, in the order the client
/// reports errors.
pub fn validate_request(payload: CreateOrderRequest) -> AppResult<NewOrder> {
    let items = match payload.items {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(AppError::BadRequest(ITEMS_REQUIRED.into())),
    };

    let total = match payload.total {
        Some(Value::Number(number)) => parse_amount(&number.to_string())
            .filter(|total| !total.is_zero())
            .ok_or_else(|| AppError::BadRequest(TOTAL_REQUIRED.into()))?
            .round_dp(2),
        _ => return Err(AppError::BadRequest(TOTAL_REQUIRED.into())),
    };

    let shipping_address = match payload.shipping_address {
        Some(Value::String(address)) if !address.is_empty() => address,
        _ => return Err(AppError::BadRequest(ADDRESS_REQUIRED.into())),
    };

    let payment_method = match payload.payment_method {
        Some(Value::String(method)) if method == CREDIT_CARD => method,
        _ => return Err(AppError::BadRequest(PAYMENT_METHOD_REQUIRED.into())),
    };

    let lines = items
        .into_iter()
        .map(serde_json::from_value::<OrderLine>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| AppError::BadRequest(format!("Invalid order item: {err}")))?;

    if lines.iter().any(|line| line.quantity < 0) {
        return Err(AppError::BadRequest(NEGATIVE_QUANTITY.into()));
    }

    if !fits_money_column(total) {
        return Err(AppError::BadRequest(TOTAL_OUT_OF_RANGE.into()));
    }

    let lines = lines
        .iter()
        .map(|line| {
            let sub_total = line_sub_total(line)
                .filter(|sub_total| fits_money_column(*sub_total))
                .ok_or_else(|| AppError::BadRequest(SUB_TOTAL_OUT_OF_RANGE.into()))?;
            Ok(NewOrderLine {
                product_id: line.id,
                quantity: line.quantity,
                sub_total,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(NewOrder {
        lines,
        total,
        shipping_address,
        payment_method,
    })
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn line_sub_total(line: &OrderLine) -> Option<Decimal> {
    line.price
        .checked_mul(Decimal::from(line.quantity))
        .map(|sub_total| sub_total.round_dp(2))
}

fn fits_money_column(amount: Decimal) -> bool {
    amount.abs() <= MAX_AMOUNT
}
