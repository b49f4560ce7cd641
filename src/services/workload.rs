// src/services/workload.rs

use std::collections::HashMap;

use crate::models::{Shift, Staff};

pub type Workload = HashMap<i64, u32>;

pub fn calculate_workload(staff: &[Staff], existing_shifts: &[Shift]) -> Workload {
    let mut load: Workload = staff.iter().map(|s| (s.staff_id, 0)).collect();
    for shift in existing_shifts {
        if let Some(count) = load.get_mut(&shift.staff_id) {
            *count += shift.workload_units();
        }
    }
    load
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, RoomRef, StaffRole};
    use chrono::{NaiveDate, Utc};

    fn staff(id: i64) -> Staff {
        Staff {
            staff_id: id,
            name: format!("S{id}"),
            availability: Availability::Available,
            role: StaffRole::Housekeeper,
            archived: false,
        }
    }

    fn shift(id: i64, staff_id: i64, rooms: usize) -> Shift {
        Shift {
            shift_id: id,
            day: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            shift: "Morning".into(),
            staff_id,
            staff_name: format!("S{staff_id}"),
            rooms: (0..rooms)
                .map(|i| RoomRef { room_id: id * 10 + i as i64, room_number: format!("{id}{i}") })
                .collect(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn three_two_room_shifts_seed_six() {
        let load = calculate_workload(
            &[staff(1), staff(2)],
            &[shift(1, 1, 2), shift(2, 1, 2), shift(3, 1, 2)],
        );
        assert_eq!(load[&1], 6);
        assert_eq!(load[&2], 0);
    }

    #[test]
    fn empty_shift_counts_once() {
        let load = calculate_workload(&[staff(1)], &[shift(1, 1, 0)]);
        assert_eq!(load[&1], 1);
    }

    #[test]
    fn unknown_staff_are_not_tracked() {
        let load = calculate_workload(&[staff(1)], &[shift(1, 99, 3)]);
        assert_eq!(load.len(), 1);
        assert_eq!(load[&1], 0);
        assert!(!load.contains_key(&99));
    }
}
