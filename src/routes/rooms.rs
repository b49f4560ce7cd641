// src/routes/rooms.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use sqlx::{query, query_as};
use crate::{AppState, models::{Room, Shift, ShiftRow}, db::SHIFT_COLUMNS};
use super::{internal_error, not_found_or_internal};

#[derive(Deserialize)]
pub struct RoomBody {
    pub number: String,
    pub room_type: Option<String>,
    pub status: Option<String>,
}

pub async fn create_room(
    State(state): State<AppState>,
    Json(b): Json<RoomBody>,
) -> Result<Json<Room>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Room>(
        r#"
        INSERT INTO public.rooms(number, room_type, status)
        VALUES ($1,$2,$3)
        RETURNING room_id, number, room_type, status
        "#
    )
    .bind(b.number.trim()).bind(b.room_type).bind(b.status)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct ListQ {
    pub status: Option<String>,
    pub assignable: Option<bool>,
}

pub async fn list_rooms(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Room>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Room>(
        r#"SELECT room_id, number, room_type, status FROM public.rooms
           WHERE ($1::text IS NULL OR lower(status) = lower($1))
           ORDER BY number"#)
        .bind(q.status)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    let rows = match q.assignable {
        Some(wanted) => rows.into_iter().filter(|r| r.is_assignable() == wanted).collect(),
        None => rows,
    };
    Ok(Json(rows))
}

/// Upserts by room number.
pub async fn bulk_upsert_rooms(
    State(state): State<AppState>,
    Json(items): Json<Vec<RoomBody>>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let mut tx = state.pool.begin().await.map_err(internal_error)?;
    for it in &items {
        query(
            r#"
            INSERT INTO public.rooms(number, room_type, status)
            VALUES ($1,$2,$3)
            ON CONFLICT (number)
            DO UPDATE SET room_type = EXCLUDED.room_type,
                          status = EXCLUDED.status
            "#
        )
        .bind(it.number.trim()).bind(&it.room_type).bind(&it.status)
        .execute(&mut *tx).await.map_err(internal_error)?;
    }
    tx.commit().await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"upserted": true, "count": items.len()})))
}

#[derive(Deserialize)]
pub struct PatchRoomBody {
    pub number: Option<String>,
    pub room_type: Option<String>,
    pub status: Option<String>,
}

/// A renumbered room is renamed in every shift that lists it, in place.
pub async fn patch_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchRoomBody>,
) -> Result<Json<Room>, (axum::http::StatusCode, String)> {
    let mut tx = state.pool.begin().await.map_err(internal_error)?;

    let before = query_as::<_, Room>(
        r#"SELECT room_id, number, room_type, status FROM public.rooms WHERE room_id=$1 FOR UPDATE"#)
        .bind(id).fetch_one(&mut *tx).await.map_err(not_found_or_internal)?;

    let row = query_as::<_, Room>(
        r#"
        UPDATE public.rooms SET
          number = COALESCE($2, number),
          room_type = COALESCE($3, room_type),
          status = COALESCE($4, status)
        WHERE room_id = $1
        RETURNING room_id, number, room_type, status
        "#
    )
    .bind(id).bind(b.number.as_deref().map(str::trim)).bind(b.room_type).bind(b.status)
    .fetch_one(&mut *tx).await.map_err(internal_error)?;

    if row.number != before.number {
        query(
            r#"UPDATE public.shifts SET rooms = array_replace(rooms, $2, $3)
               WHERE $1 = ANY(room_ids)"#)
            .bind(id).bind(&before.number).bind(&row.number)
            .execute(&mut *tx).await.map_err(internal_error)?;
    }

    tx.commit().await.map_err(internal_error)?;
    Ok(Json(row))
}

/// Removes the room from every shift that lists it, then deletes it.
pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let mut tx = state.pool.begin().await.map_err(internal_error)?;

    let rows = query_as::<_, ShiftRow>(&format!(
        "SELECT {SHIFT_COLUMNS} FROM public.shifts WHERE $1 = ANY(room_ids) FOR UPDATE"
    ))
    .bind(id).fetch_all(&mut *tx).await.map_err(internal_error)?;

    let mut shifts_updated = 0usize;
    for row in rows {
        let mut shift = Shift::try_from(row).map_err(internal_error)?;
        if !shift.remove_room(id) {
            continue;
        }
        query(r#"UPDATE public.shifts SET room_ids = $2, rooms = $3 WHERE shift_id = $1"#)
            .bind(shift.shift_id).bind(shift.room_ids()).bind(shift.room_numbers())
            .execute(&mut *tx).await.map_err(internal_error)?;
        shifts_updated += 1;
    }

    let res = query(r#"DELETE FROM public.rooms WHERE room_id=$1"#)
        .bind(id).execute(&mut *tx).await.map_err(internal_error)?;
    tx.commit().await.map_err(internal_error)?;

    Ok(Json(serde_json::json!({
        "deleted": res.rows_affected() > 0,
        "shifts_updated": shifts_updated
    })))
}
