mod common;

use axum::http::StatusCode;
use storefront::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.status, "ok");
}

#[tokio::test]
async fn health_route_and_fallback() -> anyhow::Result<()> {
    let (_, app) = common::setup_app().await?;

    let (status, body) = common::get(&app, "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = common::get(&app, "/api/nope").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No route for /api/nope");

    Ok(())
}
