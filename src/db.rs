use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::NotSet, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    EntityName, EntityTrait, PaginatorTrait, Schema, Set,
    sea_query::{Alias, Table},
};

use crate::entity::{OrderItems, Orders, Products, products};

struct SampleProduct {
    name: &'static str,
    price_cents: i64,
    description: &'static str,
    image_url: &'static str,
    stock: i32,
}

const SAMPLE_PRODUCTS: [SampleProduct; 3] = [
    SampleProduct {
        name: "Wireless Headphones",
        price_cents: 9999,
        description: "High-quality wireless headphones with noise cancellation",
        image_url: "https://images.unsplash.com/photo-1505740420928-5e560c06d30e",
        stock: 50,
    },
    SampleProduct {
        name: "Smart Watch",
        price_cents: 19999,
        description: "Feature-rich smartwatch with health tracking",
        image_url: "https://images.unsplash.com/photo-1523275335684-37898b6baf30",
        stock: 30,
    },
    SampleProduct {
        name: "Laptop",
        price_cents: 99999,
        description: "Powerful laptop for work and entertainment",
        image_url: "https://images.unsplash.com/photo-1496181133206-80ce9b88a853",
        stock: 20,
    },
];

/// Open a SeaORM connection pool.
///
/// In-memory SQLite databases live inside a single connection, so the pool
/// is pinned to exactly one for those URLs.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    if is_in_memory(database_url) {
        options.max_connections(1).min_connections(1);
    } else {
        options.max_connections(max_connections);
    }
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite:") && database_url.contains(":memory:")
}

/// Create the storefront tables from the entity definitions.
///
/// With `reset` every table is dropped first (children before parents), which
/// wipes all data.
pub async fn sync_schema(conn: &DatabaseConnection, reset: bool) -> Result<()> {
    let backend = conn.get_database_backend();

    if reset {
        for table in [
            OrderItems.table_name(),
            Orders.table_name(),
            Products.table_name(),
        ] {
            let stmt = Table::drop().table(Alias::new(table)).if_exists().to_owned();
            conn.execute(backend.build(&stmt)).await?;
        }
        tracing::info!("dropped storefront tables");
    }

    let schema = Schema::new(backend);
    let statements = [
        schema.create_table_from_entity(Products).if_not_exists().to_owned(),
        schema.create_table_from_entity(Orders).if_not_exists().to_owned(),
        schema.create_table_from_entity(OrderItems).if_not_exists().to_owned(),
    ];
    for stmt in &statements {
        conn.execute(backend.build(stmt)).await?;
    }

    Ok(())
}

/// Insert the sample catalog when the products table is empty.
///
/// Returns how many products were inserted.
pub async fn seed_products(conn: &DatabaseConnection) -> Result<u64> {
    if Products::find().count(conn).await? > 0 {
        return Ok(0);
    }

    let now = Utc::now();
    let rows = SAMPLE_PRODUCTS.iter().map(|sample| products::ActiveModel {
        id: NotSet,
        name: Set(sample.name.to_string()),
        price: Set(Decimal::new(sample.price_cents, 2)),
        description: Set(Some(sample.description.to_string())),
        image_url: Set(Some(sample.image_url.to_string())),
        stock: Set(sample.stock),
        created_at: Set(now),
        updated_at: Set(now),
    });
    Products::insert_many(rows).exec(conn).await?;

    let inserted = SAMPLE_PRODUCTS.len() as u64;
    tracing::info!(count = inserted, "seeded sample products");
    Ok(inserted)
}

/// Schema sync followed by seeding, as done on server start.
pub async fn prepare(conn: &DatabaseConnection, reset: bool) -> Result<()> {
    sync_schema(conn, reset).await?;
    seed_products(conn).await?;
    Ok(())
}
