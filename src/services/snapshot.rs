// src/services/snapshot.rs

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use super::store::{ShiftStore, StoreError};
use crate::models::{Room, Shift, Staff};

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub staff: Vec<Staff>,
    /// Assignable rooms by ascending `room_id`.
    pub rooms: Vec<Room>,
    pub shifts: Vec<Shift>,
}

impl Snapshot {
    pub fn unassigned_rooms(&self) -> Vec<Room> {
        let taken: HashSet<i64> = self
            .shifts
            .iter()
            .flat_map(|s| s.rooms.iter().map(|r| r.room_id))
            .collect();
        self.rooms
            .iter()
            .filter(|r| !taken.contains(&r.room_id))
            .cloned()
            .collect()
    }
}

pub async fn fetch_snapshot(
    store: &dyn ShiftStore,
    day: NaiveDate,
    shift: &str,
) -> Result<Snapshot, StoreError> {
    let (staff, rooms, shifts) = tokio::try_join!(
        store.list_staff(),
        store.list_rooms(),
        store.list_shifts(day, shift),
    )?;

    let staff: Vec<Staff> = staff.into_iter().filter(Staff::is_eligible).collect();
    let mut rooms: Vec<Room> = rooms.into_iter().filter(Room::is_assignable).collect();
    rooms.sort_by_key(|r| r.room_id);
    let shifts: Vec<Shift> = shifts
        .into_iter()
        .filter(|s| s.day == day && s.shift == shift)
        .collect();

    debug!(
        staff = staff.len(),
        rooms = rooms.len(),
        shifts = shifts.len(),
        "snapshot loaded"
    );

    Ok(Snapshot { staff, rooms, shifts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, RoomRef, StaffRole};
    use crate::services::store::memory::{FailOn, MemoryStore};
    use chrono::Utc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn staff(id: i64, availability: Availability, role: StaffRole, archived: bool) -> Staff {
        Staff { staff_id: id, name: format!("S{id}"), availability, role, archived }
    }

    fn room(id: i64, status: Option<&str>) -> Room {
        Room {
            room_id: id,
            number: format!("{}", 100 + id),
            room_type: None,
            status: status.map(str::to_string),
        }
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new(
            vec![
                staff(1, Availability::Available, StaffRole::Housekeeper, false),
                staff(2, Availability::OnBreak, StaffRole::Housekeeper, false),
                staff(3, Availability::Available, StaffRole::Supervisor, false),
                staff(4, Availability::Available, StaffRole::Housekeeper, true),
                staff(5, Availability::Available, StaffRole::Housekeeper, false),
            ],
            vec![
                room(1, None),
                room(2, Some("occupied")),
                room(3, Some("Cleaning")),
                room(4, Some("maintenance")),
            ],
        );
        store.shifts.lock().unwrap().extend([
            Shift {
                shift_id: 1,
                day: day(),
                shift: "Morning".into(),
                staff_id: 1,
                staff_name: "S1".into(),
                rooms: vec![RoomRef { room_id: 4, room_number: "104".into() }],
                notes: String::new(),
                created_at: Utc::now(),
            },
            Shift {
                shift_id: 2,
                day: day(),
                shift: "Evening".into(),
                staff_id: 1,
                staff_name: "S1".into(),
                rooms: vec![RoomRef { room_id: 1, room_number: "101".into() }],
                notes: String::new(),
                created_at: Utc::now(),
            },
        ]);
        store
    }

    #[tokio::test]
    async fn filters_staff_rooms_and_shifts() {
        let snap = fetch_snapshot(&store(), day(), "Morning").await.unwrap();

        let ids: Vec<i64> = snap.staff.iter().map(|s| s.staff_id).collect();
        assert_eq!(ids, vec![1, 5]);

        let rooms: Vec<i64> = snap.rooms.iter().map(|r| r.room_id).collect();
        assert_eq!(rooms, vec![1, 3, 4]);

        assert_eq!(snap.shifts.len(), 1);
        assert_eq!(snap.shifts[0].shift_id, 1);
    }

    #[tokio::test]
    async fn rooms_already_on_a_shift_for_the_slot_are_not_unassigned() {
        let snap = fetch_snapshot(&store(), day(), "Morning").await.unwrap();
        let open: Vec<i64> = snap.unassigned_rooms().iter().map(|r| r.room_id).collect();
        assert_eq!(open, vec![1, 3]);
    }

    #[tokio::test]
    async fn any_failed_query_fails_the_fetch() {
        for on in [FailOn::Staff, FailOn::Rooms, FailOn::Shifts] {
            let mut s = store();
            s.fail_fetch = Some(on);
            assert!(fetch_snapshot(&s, day(), "Morning").await.is_err(), "{on:?}");
        }
    }

    #[tokio::test]
    async fn rooms_come_back_in_id_order_not_label_order() {
        let mut s = MemoryStore::new(
            vec![staff(1, Availability::Available, StaffRole::Housekeeper, false)],
            vec![],
        );
        s.rooms = [10, 2, 1]
            .into_iter()
            .map(|id| Room { room_id: id, number: format!("R{id}"), room_type: None, status: None })
            .collect();

        let snap = fetch_snapshot(&s, day(), "Morning").await.unwrap();
        let numbers: Vec<&str> = snap.rooms.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(numbers, vec!["R1", "R2", "R10"]);
    }
}
