//! Catalog seed tool
//!
//! Usage: `seed [DIR]` (defaults to `SEED_DIR`, then `./seed`). Requires
//! `DATABASE_URL`; runs migrations first.

use std::path::PathBuf;

use ecocart_server::BoxError;
use ecocart_server::seed::seed_from_dir;
use ecocart_server::store::PgStore;
use sqlx::PgPool;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecocart_server=info,seed=info".into()),
        )
        .init();

    let dir: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SEED_DIR").ok())
        .unwrap_or_else(|| "seed".into())
        .into();
    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = PgStore::new(pool);
    let report = seed_from_dir(&store, &dir).await?;

    tracing::info!(
        dir = %dir.display(),
        categories_created = report.categories_created,
        categories_skipped = report.categories_skipped,
        products_created = report.products_created,
        products_skipped = report.products_skipped,
        "Seeding finished"
    );
    Ok(())
}
