// src/services/run_guard.rs

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

type Slot = (NaiveDate, String);

#[derive(Clone, Default)]
pub struct RunGuard {
    active: Arc<Mutex<HashSet<Slot>>>,
}

pub struct RunPermit {
    slot: Slot,
    active: Arc<Mutex<HashSet<Slot>>>,
}

fn lock(active: &Mutex<HashSet<Slot>>) -> MutexGuard<'_, HashSet<Slot>> {
    // A panicked holder cannot leave the set half-updated.
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RunGuard {
    /// `None` when a run for the same date and shift type is already going.
    pub fn try_acquire(&self, day: NaiveDate, shift: &str) -> Option<RunPermit> {
        let slot = (day, shift.to_string());
        if !lock(&self.active).insert(slot.clone()) {
            return None;
        }
        Some(RunPermit { slot, active: Arc::clone(&self.active) })
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.slot);
    }
}
