// src/routes/health.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResp { pub status: &'static str, pub version: &'static str, pub database: &'static str }

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResp>) {
    let db_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let status = if db_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (
        status,
        Json(HealthResp {
            status: if db_ok { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            database: if db_ok { "up" } else { "down" },
        }),
    )
}
