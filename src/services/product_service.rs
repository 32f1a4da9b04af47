use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};

use crate::{
    dto::products::ProductPage,
    entity::products::{Column, Entity as Products},
    error::{AppError, AppResult},
    models::Product,
    routes::params::{Pagination, total_pages},
    state::AppState,
};

pub async fn list_products(state: &AppState, query: Pagination) -> AppResult<ProductPage> {
    let (page, limit, offset) = query.normalize()?;
    let finder = Products::find().order_by_asc(Column::Id);

    let count = finder.clone().count(&state.orm).await?;

    let products = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ProductPage {
        products,
        total_pages: total_pages(count, limit),
        current_page: page,
    })
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<Product> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Product::from)
        .ok_or(AppError::NotFound("Product not found"))
}
