use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    dto::{orders::CreatedOrder, products::ProductPage},
    error::ErrorBody,
    models::Product,
    shop::{ClientError, ClientResult, checkout::OrderRequest},
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Page size the catalog view asks for.
pub const CATALOG_PAGE_SIZE: u64 = 2;

/// Thin JSON client for the storefront API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_products(&self, page: u64, limit: u64) -> ClientResult<ProductPage> {
        let response = self
            .http
            .get(self.url("/api/products"))
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn get_product(&self, id: i32) -> ClientResult<Product> {
        let response = self
            .http
            .get(self.url(&format!("/api/products/{id}")))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn create_order(&self, request: &OrderRequest) -> ClientResult<CreatedOrder> {
        let response = self
            .http
            .post(self.url("/api/orders"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn get_order(&self, id: i32) -> ClientResult<CreatedOrder> {
        let response = self
            .http
            .get(self.url(&format!("/api/orders/{id}")))
            .send()
            .await?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    tracing::debug!(status = status.as_u16(), %message, "api request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::ApiClient;

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/api/products"), "http://localhost:5000/api/products");
    }
}
