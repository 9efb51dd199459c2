use anyhow::Result;
use mandi_api::api::ApiServer;
use mandi_api::store::{Db, Stores};
use mandi_api::telemetry::init_tracing;
use mandi_api::util::env::{db_url, env_parse, init_env, preflight_check};

#[actix_web::main]
async fn main() -> Result<()> {
    init_tracing("info,sqlx=warn")?;
    init_env();

    preflight_check(
        "api-server",
        &["API_SECRET"],
        &[
            "API_HOST",
            "API_PORT",
            "API_SECRET",
            "ALLOWED_ORIGINS",
            "DATABASE_URL",
            "DB_MAX_CONNS",
            "AUTO_MIGRATE",
        ],
    )?;

    let server = ApiServer::from_env()?;

    let url = db_url()?;
    let max_conns: u32 = env_parse("DB_MAX_CONNS", 10u32);
    let db = Db::connect(&url, max_conns).await?;

    let stores = Stores::postgres(db);
    server.run(stores).await
}
