// src/services/persister.rs

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, warn};

use super::store::ShiftStore;
use crate::models::{AutoAssignmentConfig, AutoAssignmentResult, NewShift, ShiftAssignment};

pub fn assignment_notes(room_count: usize) -> String {
    match room_count {
        1 => "Auto-assigned 1 room".to_string(),
        n => format!("Auto-assigned {n} rooms"),
    }
}

fn new_shift(config: &AutoAssignmentConfig, assignment: &ShiftAssignment) -> NewShift {
    NewShift {
        day: config.date,
        shift: config.shift_type.clone(),
        staff_id: assignment.staff_id,
        staff_name: assignment.staff_name.clone(),
        rooms: assignment.rooms.clone(),
        notes: assignment_notes(assignment.rooms.len()),
        created_at: Utc::now(),
    }
}

pub async fn persist_assignments(
    store: &dyn ShiftStore,
    config: &AutoAssignmentConfig,
    assignments: Vec<ShiftAssignment>,
) -> AutoAssignmentResult {
    let outcomes = join_all(
        assignments
            .iter()
            .map(|a| store.create_shift(new_shift(config, a))),
    )
    .await;

    let mut result = AutoAssignmentResult::default();
    for (assignment, outcome) in assignments.iter().zip(outcomes) {
        match outcome {
            Ok(shift) => {
                debug!(
                    shift_id = shift.shift_id,
                    staff_id = assignment.staff_id,
                    rooms = ?assignment.room_numbers(),
                    "shift created"
                );
                result.success_count += 1;
            }
            Err(e) => {
                warn!(staff_id = assignment.staff_id, error = %e, "shift write failed");
                result.failure_count += 1;
                result
                    .errors
                    .push(format!("Failed to create shift for {}: {e}", assignment.staff_name));
            }
        }
    }
    result.success = result.failure_count == 0;
    result.assignments = assignments;
    result
}
