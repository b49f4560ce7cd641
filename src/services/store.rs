// src/services/store.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{MisalignedRooms, NewShift, Room, Shift, Staff, UnknownValue};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("invalid stored value: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

impl From<UnknownValue> for StoreError {
    fn from(err: UnknownValue) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

impl From<MisalignedRooms> for StoreError {
    fn from(err: MisalignedRooms) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

#[async_trait]
pub trait ShiftStore: Send + Sync {
    /// Every staff member that has not been archived.
    async fn list_staff(&self) -> Result<Vec<Staff>, StoreError>;

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// Shifts whose date and shift type match exactly.
    async fn list_shifts(&self, day: NaiveDate, shift: &str) -> Result<Vec<Shift>, StoreError>;

    async fn create_shift(&self, shift: NewShift) -> Result<Shift, StoreError>;
}
