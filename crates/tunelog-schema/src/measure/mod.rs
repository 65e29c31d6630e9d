//! Identifying data of a tuning trial and its measured outcome.
//!
//! - [`Target`] - Device/backend descriptor (`"llvm -mcpu=..."`)
//! - [`SearchTask`] - Workload key, target and optional hardware parameters
//! - [`State`] - Ordered schedule transform steps
//! - [`MeasureInput`] - One trial: (task, state)
//! - [`MeasureResult`] - Per-repeat costs, error code and timings
//!
//! All types here are the *minimal* persisted form. See the crate docs for the
//! recovered form.

pub use self::{result::*, state::*, target::*, task::*};

mod result;
mod state;
mod target;
mod task;

use serde::{Deserialize, Serialize};

/// One tuning trial: the task being tuned and the schedule that was measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureInput {
    pub task: SearchTask,
    pub state: State,
}

impl MeasureInput {
    #[must_use]
    pub fn new(task: SearchTask, state: State) -> Self {
        Self { task, state }
    }
}
