// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A text column held a value none of our enums recognise.
#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

// Lowercase, trimmed, spaces and dashes folded to '_'
fn norm(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '-'], "_")
}

// ───────────────────────────────────────
// Staff
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    OnBreak,
    Busy,
    OffDuty,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnBreak => "on_break",
            Self::Busy => "busy",
            Self::OffDuty => "off_duty",
        }
    }
}

impl FromStr for Availability {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "available" => Ok(Self::Available),
            "on_break" => Ok(Self::OnBreak),
            "busy" => Ok(Self::Busy),
            "off_duty" => Ok(Self::OffDuty),
            _ => Err(UnknownValue { kind: "availability", value: s.to_string() }),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Housekeeper,
    Supervisor,
    Admin,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Housekeeper => "housekeeper",
            Self::Supervisor => "supervisor",
            Self::Admin => "admin",
        }
    }

    /// Only front-line staff clean rooms.
    pub fn is_front_line(&self) -> bool {
        matches!(self, Self::Housekeeper)
    }
}

impl FromStr for StaffRole {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match norm(s).as_str() {
            "housekeeper" => Ok(Self::Housekeeper),
            "supervisor" => Ok(Self::Supervisor),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownValue { kind: "staff role", value: s.to_string() }),
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, FromRow)]
pub struct StaffRow {
    pub staff_id: i64,
    pub name: String,
    pub availability: String,
    pub role: String,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub staff_id: i64,
    pub name: String,
    pub availability: Availability,
    pub role: StaffRole,
    pub archived: bool,
}

impl Staff {
    /// Available, front-line and not archived.
    pub fn is_eligible(&self) -> bool {
        !self.archived && self.availability == Availability::Available && self.role.is_front_line()
    }
}

impl TryFrom<StaffRow> for Staff {
    type Error = UnknownValue;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(Staff {
            staff_id: row.staff_id,
            name: row.name,
            availability: row.availability.parse()?,
            role: row.role.parse()?,
            archived: row.archived,
        })
    }
}

// ───────────────────────────────────────
// Rooms
// ───────────────────────────────────────
pub const ASSIGNABLE_ROOM_STATUSES: [&str; 3] = ["maintenance", "available", "cleaning"];

/// Unset, blank, or one of [`ASSIGNABLE_ROOM_STATUSES`] (case-insensitive).
pub fn is_assignable_status(status: Option<&str>) -> bool {
    match status.map(str::trim) {
        None | Some("") => true,
        Some(s) => ASSIGNABLE_ROOM_STATUSES.iter().any(|a| a.eq_ignore_ascii_case(s)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub room_id: i64,
    pub number: String,
    pub room_type: Option<String>,
    pub status: Option<String>,
}

impl Room {
    pub fn is_assignable(&self) -> bool {
        is_assignable_status(self.status.as_deref())
    }

    pub fn to_ref(&self) -> RoomRef {
        RoomRef { room_id: self.room_id, room_number: self.number.clone() }
    }
}

/// A room id with its display number, kept together so the two never drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRef {
    pub room_id: i64,
    pub room_number: String,
}

// ───────────────────────────────────────
// Shifts
// ───────────────────────────────────────

/// Storage shape: rooms as two index-aligned arrays.
#[derive(Debug, FromRow)]
pub struct ShiftRow {
    pub shift_id: i64,
    pub day: NaiveDate,
    pub shift: String,
    pub staff_id: i64,
    pub staff_name: String,
    pub room_ids: Vec<i64>,
    pub rooms: Vec<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
#[error("shift {shift_id} has {ids} room ids but {numbers} room numbers")]
pub struct MisalignedRooms {
    pub shift_id: i64,
    pub ids: usize,
    pub numbers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shift {
    pub shift_id: i64,
    pub day: NaiveDate,
    pub shift: String,
    pub staff_id: i64,
    pub staff_name: String,
    pub rooms: Vec<RoomRef>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Shift {
    /// Load this shift puts on its staff member; an empty shift still counts once.
    pub fn workload_units(&self) -> u32 {
        self.rooms.len().max(1) as u32
    }

    pub fn room_ids(&self) -> Vec<i64> {
        self.rooms.iter().map(|r| r.room_id).collect()
    }

    pub fn room_numbers(&self) -> Vec<String> {
        self.rooms.iter().map(|r| r.room_number.clone()).collect()
    }

    /// Drops every reference to `room_id`. Returns whether anything was removed.
    pub fn remove_room(&mut self, room_id: i64) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|r| r.room_id != room_id);
        self.rooms.len() != before
    }
}

impl TryFrom<ShiftRow> for Shift {
    type Error = MisalignedRooms;

    fn try_from(row: ShiftRow) -> Result<Self, Self::Error> {
        if row.room_ids.len() != row.rooms.len() {
            return Err(MisalignedRooms {
                shift_id: row.shift_id,
                ids: row.room_ids.len(),
                numbers: row.rooms.len(),
            });
        }
        let rooms = row
            .room_ids
            .into_iter()
            .zip(row.rooms)
            .map(|(room_id, room_number)| RoomRef { room_id, room_number })
            .collect();
        Ok(Shift {
            shift_id: row.shift_id,
            day: row.day,
            shift: row.shift,
            staff_id: row.staff_id,
            staff_name: row.staff_name,
            rooms,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

/// A shift that has not been written yet.
#[derive(Debug, Clone)]
pub struct NewShift {
    pub day: NaiveDate,
    pub shift: String,
    pub staff_id: i64,
    pub staff_name: String,
    pub rooms: Vec<RoomRef>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl NewShift {
    /// The room list as the two parallel arrays storage expects.
    pub fn flatten_rooms(&self) -> (Vec<i64>, Vec<String>) {
        self.rooms
            .iter()
            .map(|r| (r.room_id, r.room_number.clone()))
            .unzip()
    }
}

// ───────────────────────────────────────
// Auto-assignment
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoAssignmentConfig {
    pub date: NaiveDate,
    #[serde(alias = "shift")]
    pub shift_type: String,
    #[serde(default)]
    pub max_assignments_per_staff: Option<u32>,
}

impl AutoAssignmentConfig {
    /// Shift labels are stored trimmed; a run must address the same slot.
    pub fn normalized(mut self) -> Self {
        self.shift_type = self.shift_type.trim().to_string();
        self
    }
}

/// Rooms handed to one staff member by a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub staff_id: i64,
    pub staff_name: String,
    pub rooms: Vec<RoomRef>,
}

impl ShiftAssignment {
    pub fn new(staff_id: i64, staff_name: impl Into<String>) -> Self {
        Self { staff_id, staff_name: staff_name.into(), rooms: Vec::new() }
    }

    pub fn room_numbers(&self) -> Vec<String> {
        self.rooms.iter().map(|r| r.room_number.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoAssignmentResult {
    pub success: bool,
    pub success_count: usize,
    pub failure_count: usize,
    pub assignments: Vec<ShiftAssignment>,
    pub errors: Vec<String>,
}

impl AutoAssignmentResult {
    /// A run that stopped before anything was written.
    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, errors: vec![message.into()], ..Default::default() }
    }

    /// Whether the caller's cached shift list is stale.
    pub fn should_refresh(&self) -> bool {
        self.success_count > 0
    }
}
