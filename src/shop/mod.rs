//! Shopper-side half of the storefront: the HTTP client for the API, the
//! persisted cart, the three-step checkout wizard and the text views used by
//! the `shop` binary.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod views;

use thiserror::Error;

pub use api::ApiClient;
pub use cart::{Cart, CartItem, CartStore, CartTotals, StockError};
pub use checkout::{Checkout, CheckoutError, CheckoutForm, Field, Step};

pub const FETCH_PRODUCTS_FAILED: &str = "Failed to fetch products. Please try again later.";
pub const FETCH_PRODUCT_FAILED: &str =
    "Failed to fetch product details. Please try again later.";
pub const ORDER_FAILED: &str = "Failed to process order. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {message}")]
    Api { status: u16, message: String },

    #[error("cart file error: {0}")]
    CartIo(#[from] std::io::Error),

    #[error("cart file is not valid JSON: {0}")]
    CartFormat(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status returned by the server, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
