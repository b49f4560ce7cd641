// src/services/mod.rs

pub mod allocation;
pub mod auto_assign;
pub mod persister;
pub mod run_guard;
pub mod snapshot;
pub mod store;
pub mod workload;
