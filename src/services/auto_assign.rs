// src/services/auto_assign.rs

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::allocation::{compute_assignments, AllocationError};
use super::persister::persist_assignments;
use super::run_guard::RunPermit;
use super::snapshot::fetch_snapshot;
use super::store::{ShiftStore, StoreError};
use crate::models::{AutoAssignmentConfig, AutoAssignmentResult, ShiftAssignment};

#[derive(Debug, Error)]
pub enum AutoAssignError {
    #[error("failed to load scheduling data: {0}")]
    Fetch(#[from] StoreError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Never fails; every problem ends up in the returned result.
pub async fn run_auto_assignment(
    store: &dyn ShiftStore,
    config: &AutoAssignmentConfig,
) -> AutoAssignmentResult {
    let config = &config.clone().normalized();
    let run_id = Uuid::new_v4();
    let span = info_span!(
        "auto_assignment",
        %run_id,
        date = %config.date,
        shift = %config.shift_type
    );

    async move {
        info!(cap = ?config.max_assignments_per_staff, "auto-assignment started");

        let assignments = match plan(store, config).await {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "auto-assignment aborted before persisting");
                return AutoAssignmentResult::failed(e.to_string());
            }
        };

        let result = persist_assignments(store, config, assignments).await;
        info!(
            success = result.success,
            written = result.success_count,
            failed = result.failure_count,
            "auto-assignment finished"
        );
        result
    }
    .instrument(span)
    .await
}

/// Runs on its own task; the permit is held until the run ends.
pub fn spawn_auto_assignment(
    store: Arc<dyn ShiftStore>,
    config: AutoAssignmentConfig,
    permit: RunPermit,
) -> JoinHandle<AutoAssignmentResult> {
    tokio::spawn(async move {
        let result = run_auto_assignment(store.as_ref(), &config).await;
        drop(permit);
        result
    })
}

async fn plan(
    store: &dyn ShiftStore,
    config: &AutoAssignmentConfig,
) -> Result<Vec<ShiftAssignment>, AutoAssignError> {
    let snapshot = fetch_snapshot(store, config.date, &config.shift_type).await?;
    let rooms = snapshot.unassigned_rooms();

    let assignments = compute_assignments(
        &snapshot.staff,
        &rooms,
        &snapshot.shifts,
        config.max_assignments_per_staff,
    )?;
    info!(
        rooms = rooms.len(),
        staff = assignments.len(),
        "allocation computed"
    );
    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, Room, RoomRef, Shift, Staff, StaffRole};
    use crate::services::run_guard::RunGuard;
    use crate::services::store::memory::{FailOn, MemoryStore};
    use chrono::{NaiveDate, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn config(cap: Option<u32>) -> AutoAssignmentConfig {
        AutoAssignmentConfig { date: day(), shift_type: "Morning".into(), max_assignments_per_staff: cap }
    }

    fn housekeeper(id: i64, name: &str) -> Staff {
        Staff {
            staff_id: id,
            name: name.into(),
            availability: Availability::Available,
            role: StaffRole::Housekeeper,
            archived: false,
        }
    }

    fn rooms(n: i64) -> Vec<Room> {
        (1..=n)
            .map(|i| Room { room_id: i, number: format!("R{i}"), room_type: None, status: Some("cleaning".into()) })
            .collect()
    }

    fn abc_store(room_count: i64) -> MemoryStore {
        MemoryStore::new(
            vec![housekeeper(1, "A"), housekeeper(2, "B"), housekeeper(3, "C")],
            rooms(room_count),
        )
    }

    fn morning_shift(staff_id: i64, name: &str, room_id: i64) -> Shift {
        Shift {
            shift_id: 50,
            day: day(),
            shift: "Morning".into(),
            staff_id,
            staff_name: name.into(),
            rooms: vec![RoomRef { room_id, room_number: format!("R{room_id}") }],
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn end_to_end_round_robin() {
        let store = abc_store(5);
        let result = run_auto_assignment(&store, &config(None)).await;

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.success_count, 3);
        assert_eq!(result.failure_count, 0);
        assert!(result.should_refresh());

        let stored = store.stored_shifts();
        let rooms_of = |name: &str| {
            stored
                .iter()
                .find(|s| s.staff_name == name)
                .map(|s| s.room_numbers())
                .unwrap_or_default()
        };
        assert_eq!(rooms_of("A"), vec!["R1", "R4"]);
        assert_eq!(rooms_of("B"), vec!["R2", "R5"]);
        assert_eq!(rooms_of("C"), vec!["R3"]);
    }

    #[tokio::test]
    async fn capacity_exceeded_persists_nothing() {
        let store = MemoryStore::new(vec![housekeeper(1, "A"), housekeeper(2, "B")], rooms(3));
        let result = run_auto_assignment(&store, &config(Some(1))).await;

        assert!(!result.success);
        assert_eq!(result.success_count, 0);
        assert_eq!(result.failure_count, 0);
        assert!(result.assignments.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("R3"));
        assert!(!result.should_refresh());
        assert!(store.stored_shifts().is_empty());
    }

    #[tokio::test]
    async fn no_staff_is_reported() {
        let mut off = housekeeper(1, "A");
        off.availability = Availability::OffDuty;
        let store = MemoryStore::new(vec![off], rooms(2));

        let result = run_auto_assignment(&store, &config(None)).await;
        assert!(!result.success);
        assert_eq!(result.errors, vec!["no available staff".to_string()]);
    }

    #[tokio::test]
    async fn no_rooms_is_reported() {
        let mut store = abc_store(0);
        store.rooms.push(Room { room_id: 9, number: "R9".into(), room_type: None, status: Some("occupied".into()) });

        let result = run_auto_assignment(&store, &config(None)).await;
        assert!(!result.success);
        assert_eq!(result.errors, vec!["no rooms requiring assignment".to_string()]);
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let mut store = abc_store(3);
        store.fail_fetch = Some(FailOn::Shifts);

        let result = run_auto_assignment(&store, &config(None)).await;
        assert!(!result.success);
        assert_eq!(result.success_count, 0);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("failed to load scheduling data"));
    }

    #[tokio::test]
    async fn partial_persist_failure() {
        let mut store = abc_store(3);
        store.fail_create_for.insert(2);

        let result = run_auto_assignment(&store, &config(None)).await;
        assert!(!result.success);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 1);
        assert!(result.should_refresh());
        assert_eq!(store.stored_shifts().len(), 2);
    }

    #[tokio::test]
    async fn second_run_only_places_new_rooms() {
        let store = abc_store(3);
        store.shifts.lock().unwrap().push(morning_shift(1, "A", 1));

        let result = run_auto_assignment(&store, &config(None)).await;
        assert!(result.success, "{:?}", result.errors);

        let placed: Vec<i64> = result
            .assignments
            .iter()
            .flat_map(|a| a.rooms.iter().map(|r| r.room_id))
            .collect();
        assert_eq!(placed.len(), 2);
        assert!(!placed.contains(&1));
        // A already holds R1, so B and C take the rest.
        assert!(result.assignments.iter().all(|a| a.staff_id != 1));
    }

    #[tokio::test]
    async fn fully_covered_slot_has_nothing_to_assign() {
        let store = abc_store(1);
        store.shifts.lock().unwrap().push(morning_shift(1, "A", 1));

        let result = run_auto_assignment(&store, &config(None)).await;
        assert!(!result.success);
        assert_eq!(result.errors, vec!["no rooms requiring assignment".to_string()]);
    }

    #[tokio::test]
    async fn padded_shift_label_sees_existing_shifts() {
        let store = abc_store(3);
        store.shifts.lock().unwrap().push(morning_shift(1, "A", 1));

        let padded = AutoAssignmentConfig { shift_type: "Morning ".into(), ..config(None) };
        let result = run_auto_assignment(&store, &padded).await;
        assert!(result.success, "{:?}", result.errors);

        let stored = store.stored_shifts();
        assert!(stored.iter().all(|s| s.shift == "Morning"));
        let holders_of_r1 = stored.iter().filter(|s| s.room_ids().contains(&1)).count();
        assert_eq!(holders_of_r1, 1);
    }

    #[tokio::test]
    async fn spawned_run_finishes_after_caller_goes_away() {
        let guard = RunGuard::default();
        let permit = guard.try_acquire(day(), "Morning").unwrap();
        let store = Arc::new(abc_store(5));

        let handle = spawn_auto_assignment(store.clone(), config(None), permit);
        drop(handle);
        assert!(guard.try_acquire(day(), "Morning").is_none());

        for _ in 0..1000 {
            if store.stored_shifts().len() == 3 && guard.try_acquire(day(), "Morning").is_some() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("detached run did not complete: {:?}", store.stored_shifts());
    }

    #[tokio::test]
    async fn spawned_run_reports_through_its_handle() {
        let guard = RunGuard::default();
        let permit = guard.try_acquire(day(), "Morning").unwrap();

        let result = spawn_auto_assignment(Arc::new(abc_store(2)), config(None), permit)
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.success_count, 2);
        assert!(guard.try_acquire(day(), "Morning").is_some());
    }
}
