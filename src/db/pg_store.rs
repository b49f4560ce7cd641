// src/db/pg_store.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{query_as, PgPool};

use crate::models::{NewShift, Room, Shift, ShiftRow, Staff, StaffRow};
use crate::services::store::{ShiftStore, StoreError};

pub const SHIFT_COLUMNS: &str =
    "shift_id, day, shift, staff_id, staff_name, room_ids, rooms, notes, created_at";

/// [`ShiftStore`] over the application's connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftStore for PgStore {
    async fn list_staff(&self) -> Result<Vec<Staff>, StoreError> {
        let rows = query_as::<_, StaffRow>(
            r#"SELECT staff_id, name, availability, role, archived
               FROM public.staffs WHERE archived = FALSE
               ORDER BY staff_id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| Staff::try_from(r).map_err(StoreError::from))
            .collect()
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let rows = query_as::<_, Room>(
            r#"SELECT room_id, number, room_type, status FROM public.rooms ORDER BY room_id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_shifts(&self, day: NaiveDate, shift: &str) -> Result<Vec<Shift>, StoreError> {
        let rows = query_as::<_, ShiftRow>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM public.shifts WHERE day = $1 AND shift = $2 ORDER BY shift_id"
        ))
        .bind(day)
        .bind(shift)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| Shift::try_from(r).map_err(StoreError::from))
            .collect()
    }

    async fn create_shift(&self, shift: NewShift) -> Result<Shift, StoreError> {
        let (room_ids, rooms) = shift.flatten_rooms();

        let row = query_as::<_, ShiftRow>(&format!(
            r#"
            INSERT INTO public.shifts (day, shift, staff_id, staff_name, room_ids, rooms, notes, created_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(shift.day)
        .bind(&shift.shift)
        .bind(shift.staff_id)
        .bind(&shift.staff_name)
        .bind(&room_ids)
        .bind(&rooms)
        .bind(&shift.notes)
        .bind(shift.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(Shift::try_from(row)?)
    }
}
