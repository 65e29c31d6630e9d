//! Derived data rebuilt from a minimal record.
//!
//! - [`ComputeDag`] - Operations of a workload, produced by its constructor
//! - [`Stage`] - One operation after the schedule steps were applied
//! - [`BoundInference`] / [`StepReplay`] - Turns (graph, steps) into stages
//! - [`RecoveredInput`] - A measure input with the derived data attached
//!
//! # Example
//!
//! ```
//! use tunelog_schema::{Axis, ComputeDag, Operation, StepReplay, BoundInference, TransformStep};
//!
//! let dag = ComputeDag::new(vec![
//!     Operation::placeholder("A", vec![Axis::new("i", 64)]),
//!     Operation::compute("B", vec![Axis::new("i", 64)], vec![]),
//! ]);
//! let steps = [TransformStep::Split {
//!     stage_id: 1,
//!     iter_id: 0,
//!     lengths: vec![8],
//!     inner_to_outer: true,
//! }];
//!
//! let stages = StepReplay.infer_bound(&dag, &steps).unwrap();
//! let extents: Vec<u64> = stages[1].iters.iter().map(|it| it.extent).collect();
//! assert_eq!(extents, [8, 8]);
//! ```

pub use self::{dag::*, inference::*, recovered::*, stage::*};

mod dag;
mod inference;
mod recovered;
mod stage;
