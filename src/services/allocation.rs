// src/services/allocation.rs

use std::collections::HashMap;

use thiserror::Error;

use super::workload::{calculate_workload, Workload};
use crate::models::{Room, Shift, ShiftAssignment, Staff};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("no available staff")]
    NoAvailableStaff,

    #[error("no rooms requiring assignment")]
    NoRoomsToAssign,

    #[error("cannot assign room {room_number}: every staff member is at the capacity of {cap} rooms")]
    CapacityExceeded { room_number: String, cap: u32 },
}

pub fn default_capacity(rooms_to_assign: usize, workload: &Workload, staff_count: usize) -> u32 {
    let existing: u32 = workload.values().sum();
    let total = rooms_to_assign as u32 + existing;
    total.div_ceil(staff_count.max(1) as u32)
}

/// Assignments come back in order of each member's first room.
pub fn compute_assignments(
    staff: &[Staff],
    rooms: &[Room],
    existing_shifts: &[Shift],
    capacity_cap: Option<u32>,
) -> Result<Vec<ShiftAssignment>, AllocationError> {
    if staff.is_empty() {
        return Err(AllocationError::NoAvailableStaff);
    }
    if rooms.is_empty() {
        return Err(AllocationError::NoRoomsToAssign);
    }

    let mut workload = calculate_workload(staff, existing_shifts);
    let cap = capacity_cap.unwrap_or_else(|| default_capacity(rooms.len(), &workload, staff.len()));

    let mut cursors: HashMap<u32, usize> = HashMap::new();
    let mut assignments: Vec<ShiftAssignment> = Vec::new();
    let mut slot_of: HashMap<i64, usize> = HashMap::new();
    let mut level = min_load(staff, &workload);

    for room in rooms {
        let pick = next_candidate(staff, &workload, cap, &mut level, &mut cursors).ok_or_else(|| {
            AllocationError::CapacityExceeded { room_number: room.number.clone(), cap }
        })?;
        let member = &staff[pick];

        let slot = *slot_of.entry(member.staff_id).or_insert_with(|| {
            assignments.push(ShiftAssignment::new(member.staff_id, member.name.clone()));
            assignments.len() - 1
        });
        assignments[slot].rooms.push(room.to_ref());
        *workload.entry(member.staff_id).or_insert(0) += 1;

        level = min_load(staff, &workload);
    }

    Ok(assignments)
}

fn load_of(workload: &Workload, staff_id: i64) -> u32 {
    workload.get(&staff_id).copied().unwrap_or(0)
}

fn min_load(staff: &[Staff], workload: &Workload) -> u32 {
    staff
        .iter()
        .map(|s| load_of(workload, s.staff_id))
        .min()
        .unwrap_or(0)
}

// The cursor for a level is a position in `staff`; the pick is the first
// tied member at or after it, wrapping to the front.
fn next_candidate(
    staff: &[Staff],
    workload: &Workload,
    cap: u32,
    level: &mut u32,
    cursors: &mut HashMap<u32, usize>,
) -> Option<usize> {
    for _ in 0..=staff.len() {
        let tied: Vec<usize> = staff
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                let load = load_of(workload, s.staff_id);
                load == *level && load < cap
            })
            .map(|(i, _)| i)
            .collect();

        let Some(&first) = tied.first() else {
            *level += 1;
            continue;
        };

        let cursor = cursors.entry(*level).or_insert(0);
        let pick = tied.iter().copied().find(|&i| i >= *cursor).unwrap_or(first);
        *cursor = pick + 1;
        return Some(pick);
    }
    None
}
