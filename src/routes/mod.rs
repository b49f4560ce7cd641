use axum::http::StatusCode;

pub mod health;
pub mod staffs;
pub mod rooms;
pub mod shifts;
pub mod auto_assignments;

// Common error mapper
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    tracing::error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

pub fn not_found_or_internal(e: sqlx::Error) -> (StatusCode, String) {
    match e {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "not found".into()),
        other => internal_error(other),
    }
}
