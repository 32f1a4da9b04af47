use storefront::{config::AppConfig, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = db::connect(&config.database_url, config.max_connections).await?;
    db::sync_schema(&orm, true).await?;
    let seeded = db::seed_products(&orm).await?;
    println!("Schema recreated, {seeded} products seeded");
    Ok(())
}
