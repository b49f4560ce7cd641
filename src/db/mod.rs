// src/db/mod.rs

use anyhow::Context;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::config::Config;

mod pg_store;

pub use pg_store::{PgStore, SHIFT_COLUMNS};

pub async fn connect(config: &Config) -> anyhow::Result<Pool<Postgres>> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to PostgreSQL")?;

    info!(max_connections = config.max_connections, "connected to PostgreSQL");
    Ok(pool)
}

pub async fn migrate(pool: &Pool<Postgres>) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("running migrations")?;
    info!("migrations applied");
    Ok(())
}
