// src/routes/auto_assignments.rs

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use crate::{
    AppState,
    db::PgStore,
    models::{AutoAssignmentConfig, AutoAssignmentResult},
    routes::internal_error,
    services::auto_assign::spawn_auto_assignment,
};

#[derive(Serialize)]
pub struct AutoAssignmentResponse {
    #[serde(flatten)]
    pub result: AutoAssignmentResult,
    /// Tells the client its cached shift list is stale.
    pub refresh: bool,
}

/// POST /api/v1/auto-assignments
///
/// Always 200 once the run starts; success or failure is in the body.
pub async fn run(
    State(state): State<AppState>,
    Json(config): Json<AutoAssignmentConfig>,
) -> Result<Json<AutoAssignmentResponse>, (StatusCode, String)> {
    let config = config.normalized();
    if config.shift_type.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "shift must not be empty".into()));
    }
    if config.max_assignments_per_staff == Some(0) {
        return Err((StatusCode::BAD_REQUEST, "max_assignments_per_staff must be at least 1".into()));
    }

    let permit = state
        .runs
        .try_acquire(config.date, &config.shift_type)
        .ok_or_else(|| {
            (
                StatusCode::CONFLICT,
                format!(
                    "auto-assignment for {} {} is already running",
                    config.date, config.shift_type
                ),
            )
        })?;

    let store = Arc::new(PgStore::new(state.pool.clone()));
    let result = spawn_auto_assignment(store, config, permit)
        .await
        .map_err(internal_error)?;
    let refresh = result.should_refresh();
    Ok(Json(AutoAssignmentResponse { result, refresh }))
}
