// src/main.rs

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

mod config;
mod db;
mod logging;
mod models;
mod routes;
mod services;

use services::run_guard::RunGuard;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    pub runs: RunGuard,
}

fn router(state: AppState) -> Router {
    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // health
        .route("/health", get(routes::health::health))
        // staffs
        .route(
            "/api/v1/staffs",
            post(routes::staffs::create_staff).get(routes::staffs::list_staffs),
        )
        .route(
            "/api/v1/staffs/:id",
            patch(routes::staffs::patch_staff).delete(routes::staffs::archive_staff),
        )
        // rooms
        .route(
            "/api/v1/rooms",
            post(routes::rooms::create_room).get(routes::rooms::list_rooms),
        )
        .route("/api/v1/rooms/bulk", put(routes::rooms::bulk_upsert_rooms))
        .route(
            "/api/v1/rooms/:id",
            patch(routes::rooms::patch_room).delete(routes::rooms::delete_room),
        )
        // shifts
        .route(
            "/api/v1/shifts",
            post(routes::shifts::create_shift).get(routes::shifts::list_shifts),
        )
        .route(
            "/api/v1/shifts/:id",
            patch(routes::shifts::patch_shift).delete(routes::shifts::delete_shift),
        )
        // auto-assignment
        .route("/api/v1/auto-assignments", post(routes::auto_assignments::run))
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;
    logging::init(&config);

    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let state = AppState { pool, runs: RunGuard::default() };
    let app = router(state);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "API listening");

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
