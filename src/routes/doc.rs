use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        orders::{CreateOrderRequest, CreatedOrder, OrderLine},
        products::ProductPage,
    },
    entity::orders::OrderStatus,
    error::ErrorBody,
    models::{Order, OrderItem, Product},
    routes::{health, orders, params, products},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        orders::create_order,
        orders::get_order
    ),
    components(
        schemas(
            Product,
            Order,
            OrderItem,
            OrderStatus,
            OrderLine,
            ProductPage,
            CreateOrderRequest,
            CreatedOrder,
            ErrorBody,
            health::HealthData,
            params::Pagination
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
