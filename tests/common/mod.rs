#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use storefront::{db, routes::create_app, state::AppState};
use tower::ServiceExt;

/// Fresh in-memory database with the schema and sample products.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let orm = db::connect("sqlite::memory:", 1).await?;
    db::prepare(&orm, true).await?;
    Ok(AppState::new(orm))
}

pub async fn setup_app() -> anyhow::Result<(AppState, Router)> {
    let state = setup_state().await?;
    let app = create_app(state.clone());
    Ok((state, app))
}

pub async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

pub async fn get(app: &Router, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder().uri(uri).body(Body::empty())?;
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?;
    send(app, request).await
}
