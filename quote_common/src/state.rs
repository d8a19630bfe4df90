//! Run state of the sync scheduler.
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Whether a merge cycle is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SyncState {
    /// No cycle is running; the next trigger starts one.
    Idle,
    /// A cycle is running; further triggers are dropped.
    Running,
}

impl SyncState {
    /// Maps the scheduler's running flag to a state.
    pub fn from_running(running: bool) -> Self {
        if running { SyncState::Running } else { SyncState::Idle }
    }
}
