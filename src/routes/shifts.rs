// src/routes/shifts.rs

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{query, query_as};
use std::collections::HashMap;
use crate::{
    AppState,
    db::{PgStore, SHIFT_COLUMNS},
    models::{NewShift, Room, Shift, ShiftRow},
    services::store::ShiftStore,
};
use super::{internal_error, not_found_or_internal};

fn to_shift(row: ShiftRow) -> Result<Shift, (StatusCode, String)> {
    Shift::try_from(row).map_err(internal_error)
}

#[derive(Deserialize)]
pub struct CreateShiftBody {
    pub date: NaiveDate,
    pub shift: String,
    pub staff_id: i64,
    #[serde(default)]
    pub room_ids: Vec<i64>,
    pub notes: Option<String>,
}

/// Manual shift. Staff name and room numbers are copied in at write time.
pub async fn create_shift(
    State(state): State<AppState>,
    Json(b): Json<CreateShiftBody>,
) -> Result<Json<Shift>, (StatusCode, String)> {
    if b.shift.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "shift must not be empty".into()));
    }

    let (staff_name,): (String,) = query_as(
        r#"SELECT name FROM public.staffs WHERE staff_id=$1 AND archived = FALSE"#)
        .bind(b.staff_id).fetch_one(&state.pool).await.map_err(not_found_or_internal)?;

    let found = query_as::<_, Room>(
        r#"SELECT room_id, number, room_type, status FROM public.rooms WHERE room_id = ANY($1)"#)
        .bind(&b.room_ids).fetch_all(&state.pool).await.map_err(internal_error)?;
    let by_id: HashMap<i64, Room> = found.into_iter().map(|r| (r.room_id, r)).collect();

    let rooms = b
        .room_ids
        .iter()
        .map(|id| {
            by_id
                .get(id)
                .map(Room::to_ref)
                .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown room id {id}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let shift = PgStore::new(state.pool.clone())
        .create_shift(NewShift {
            day: b.date,
            shift: b.shift.trim().to_string(),
            staff_id: b.staff_id,
            staff_name,
            rooms,
            notes: b.notes.unwrap_or_default(),
            created_at: Utc::now(),
        })
        .await
        .map_err(internal_error)?;
    Ok(Json(shift))
}

#[derive(Deserialize)]
pub struct ListQ {
    pub date: Option<NaiveDate>,
    pub shift: Option<String>,
    pub staff_id: Option<i64>,
}

pub async fn list_shifts(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Shift>>, (StatusCode, String)> {
    let rows = query_as::<_, ShiftRow>(&format!(
        r#"SELECT {SHIFT_COLUMNS} FROM public.shifts
           WHERE ($1::date IS NULL OR day = $1)
             AND ($2::text IS NULL OR shift = $2)
             AND ($3::bigint IS NULL OR staff_id = $3)
           ORDER BY day, shift, shift_id"#
    ))
    .bind(q.date).bind(q.shift).bind(q.staff_id)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    let shifts = rows.into_iter().map(to_shift).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(shifts))
}

#[derive(Deserialize)]
pub struct PatchShiftBody {
    pub shift: Option<String>,
    pub notes: Option<String>,
}

pub async fn patch_shift(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchShiftBody>,
) -> Result<Json<Shift>, (StatusCode, String)> {
    let row = query_as::<_, ShiftRow>(&format!(
        r#"
        UPDATE public.shifts SET
          shift = COALESCE($2, shift),
          notes = COALESCE($3, notes)
        WHERE shift_id = $1
        RETURNING {SHIFT_COLUMNS}
        "#
    ))
    .bind(id).bind(b.shift.as_deref().map(str::trim)).bind(b.notes)
    .fetch_one(&state.pool).await.map_err(not_found_or_internal)?;
    Ok(Json(to_shift(row)?))
}

pub async fn delete_shift(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let res = query(r#"DELETE FROM public.shifts WHERE shift_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
