use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

/// One page of the catalog.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_pages: u64,
    pub current_page: u64,
}
