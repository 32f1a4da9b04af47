mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use storefront::{
    dto::orders::CreatedOrder,
    entity::{OrderItems, Orders, orders::OrderStatus},
    state::AppState,
};

fn cart_payload() -> Value {
    json!({
        "items": [
            {
                "id": 1,
                "name": "Wireless Headphones",
                "price": "99.99",
                "stock": 50,
                "imageUrl": "https://images.unsplash.com/photo-1505740420928-5e560c06d30e",
                "quantity": 2
            },
            { "id": 3, "name": "Laptop", "price": "999.99", "stock": 20, "quantity": 1 }
        ],
        "total": 1319.97,
        "shippingAddress": "12 Analytical Way, London, N1 9GU, UK",
        "paymentMethod": "credit_card"
    })
}

async fn stored_rows(state: &AppState) -> anyhow::Result<(u64, u64)> {
    let orders = Orders::find().count(&state.orm).await?;
    let items = OrderItems::find().count(&state.orm).await?;
    Ok((orders, items))
}

// Cart payload -> order + line items persisted -> order readable back.
#[tokio::test]
async fn places_an_order_from_a_cart() -> anyhow::Result<()> {
    let (state, app) = common::setup_app().await?;

    let (status, body) = common::post_json(&app, "/api/orders", &cart_payload()).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["paymentMethod"], "credit_card");
    assert!(body["order"]["userID"].is_null());

    let created: CreatedOrder = serde_json::from_value(body)?;
    assert_eq!(created.order.status, OrderStatus::Pending);
    assert_eq!(created.order.total, Decimal::new(131997, 2));
    assert_eq!(
        created.order.shipping_address,
        "12 Analytical Way, London, N1 9GU, UK"
    );
    assert_eq!(created.order_items.len(), 2);

    let headphones = &created.order_items[0];
    assert_eq!(headphones.product_id, 1);
    assert_eq!(headphones.quantity, 2);
    assert_eq!(headphones.sub_total, Decimal::new(19998, 2));
    assert_eq!(headphones.order_id, created.order.id);

    let laptop = &created.order_items[1];
    assert_eq!(laptop.product_id, 3);
    assert_eq!(laptop.sub_total, Decimal::new(99999, 2));

    assert_eq!(stored_rows(&state).await?, (1, 2));

    let (status, body) =
        common::get(&app, &format!("/api/orders/{}", created.order.id)).await?;
    assert_eq!(status, StatusCode::OK);
    let fetched: CreatedOrder = serde_json::from_value(body)?;
    assert_eq!(fetched.order.id, created.order.id);
    assert_eq!(fetched.order_items, created.order_items);
    Ok(())
}

#[tokio::test]
async fn stock_is_not_decremented() -> anyhow::Result<()> {
    let (_, app) = common::setup_app().await?;

    let (status, _) = common::post_json(&app, "/api/orders", &cart_payload()).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = common::get(&app, "/api/products/1").await?;
    assert_eq!(body["stock"], 50);
    Ok(())
}

#[tokio::test]
async fn rejects_invalid_payloads_without_writing() -> anyhow::Result<()> {
    let (state, app) = common::setup_app().await?;

    let cases: [(&str, Value, &str); 5] = [
        ("items", json!([]), "Items are required and should be an array."),
        ("total", json!("1319.97"), "Total amount is required and should be a number."),
        (
            "shippingAddress",
            json!(""),
            "Shipping address is required and should be a string.",
        ),
        (
            "paymentMethod",
            json!("paypal"),
            "Payment method is required and should be 'credit_card'.",
        ),
        ("paymentMethod", Value::Null, "Payment method is required and should be 'credit_card'."),
    ];

    for (field, value, message) in cases {
        let mut payload = cart_payload();
        payload[field] = value;
        let (status, body) = common::post_json(&app, "/api/orders", &payload).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field {field}");
        assert_eq!(body["error"], message, "field {field}");
    }

    let mut payload = cart_payload();
    payload["items"][0]["quantity"] = json!(-2);
    let (status, body) = common::post_json(&app, "/api/orders", &payload).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Quantity must not be negative.");

    let mut payload = cart_payload();
    payload["items"][0]["price"] = json!("79228162514264337593543950335");
    let (status, body) = common::post_json(&app, "/api/orders", &payload).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid order item: sub-total is out of range.");

    let mut payload = cart_payload();
    payload["total"] = json!(123_456_789.5);
    let (status, body) = common::post_json(&app, "/api/orders", &payload).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Total amount is out of range.");

    assert_eq!(stored_rows(&state).await?, (0, 0));
    Ok(())
}

#[tokio::test]
async fn unknown_product_rolls_back_the_order() -> anyhow::Result<()> {
    let (state, app) = common::setup_app().await?;

    let mut payload = cart_payload();
    payload["items"][1]["id"] = json!(42);
    let (status, body) = common::post_json(&app, "/api/orders", &payload).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product 42 not found");

    assert_eq!(stored_rows(&state).await?, (0, 0));

    // the connection is usable again after the rollback
    let (status, _) = common::post_json(&app, "/api/orders", &cart_payload()).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> anyhow::Result<()> {
    let (_, app) = common::setup_app().await?;

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header("content-type", "application/json")
        .body(Body::from("{\"items\": ["))?;
    let (status, body) = common::send(&app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn missing_order_is_404() -> anyhow::Result<()> {
    let (_, app) = common::setup_app().await?;

    let (status, body) = common::get(&app, "/api/orders/77").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order not found");
    Ok(())
}
