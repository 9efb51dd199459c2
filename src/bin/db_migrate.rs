//! Standalone migration runner. The server can also migrate at startup with
//! AUTO_MIGRATE=1; this binary exists for deployments that manage the schema
//! as a separate step.

use anyhow::{Context, Result};
use mandi_api::store::Db;
use mandi_api::telemetry::init_tracing;
use mandi_api::util::env::{db_url, preflight_check};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info,sqlx=warn")?;

    preflight_check("db-migrate", &["DATABASE_URL"], &["DATABASE_URL"])?;

    let url = db_url().context("no database URL env vars set (DATABASE_URL | DB_URL)")?;

    // One connection is plenty; migrations run serially anyway.
    let db = Db::connect(&url, 1).await?;

    info!("running migrations");
    db.migrate().await?;
    info!("migrations completed successfully");

    Ok(())
}
