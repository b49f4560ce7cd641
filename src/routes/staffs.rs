// src/routes/staffs.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use sqlx::query_as;
use crate::{AppState, models::{Availability, Staff, StaffRole, StaffRow}};
use super::{internal_error, not_found_or_internal};

const STAFF_COLUMNS: &str = "staff_id, name, availability, role, archived";

fn to_staff(row: StaffRow) -> Result<Staff, (axum::http::StatusCode, String)> {
    Staff::try_from(row).map_err(internal_error)
}

#[derive(Deserialize)]
pub struct CreateStaffBody {
    pub name: String,
    pub availability: Option<Availability>,
    pub role: Option<StaffRole>,
}

pub async fn create_staff(
    State(state): State<AppState>,
    Json(b): Json<CreateStaffBody>,
) -> Result<Json<Staff>, (axum::http::StatusCode, String)> {
    let availability = b.availability.unwrap_or(Availability::Available);
    let role = b.role.unwrap_or(StaffRole::Housekeeper);
    let row = query_as::<_, StaffRow>(&format!(
        r#"
        INSERT INTO public.staffs(name, availability, role)
        VALUES ($1,$2,$3)
        RETURNING {STAFF_COLUMNS}
        "#
    ))
    .bind(b.name).bind(availability.as_str()).bind(role.as_str())
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(to_staff(row)?))
}

#[derive(Deserialize)]
pub struct ListQ {
    #[serde(default)]
    pub include_archived: bool,
}

pub async fn list_staffs(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Staff>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, StaffRow>(&format!(
        r#"SELECT {STAFF_COLUMNS} FROM public.staffs
           WHERE ($1 OR archived = FALSE) ORDER BY name, staff_id"#
    ))
    .bind(q.include_archived)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    let staff = rows.into_iter().map(to_staff).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(staff))
}

#[derive(Deserialize)]
pub struct PatchStaffBody {
    pub name: Option<String>,
    pub availability: Option<Availability>,
    pub role: Option<StaffRole>,
}

pub async fn patch_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchStaffBody>,
) -> Result<Json<Staff>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, StaffRow>(&format!(
        r#"
        UPDATE public.staffs SET
          name = COALESCE($2, name),
          availability = COALESCE($3, availability),
          role = COALESCE($4, role)
        WHERE staff_id = $1 AND archived = FALSE
        RETURNING {STAFF_COLUMNS}
        "#
    ))
    .bind(id).bind(b.name)
    .bind(b.availability.map(|a| a.as_str()))
    .bind(b.role.map(|r| r.as_str()))
    .fetch_one(&state.pool).await.map_err(not_found_or_internal)?;
    Ok(Json(to_staff(row)?))
}

/// Staff are archived, never removed: their shifts keep pointing at them.
pub async fn archive_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = sqlx::query(r#"UPDATE public.staffs SET archived = TRUE WHERE staff_id=$1 AND archived = FALSE"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"archived": res.rows_affected() > 0})))
}
