//! Data model for auto-tuning measurement records.
//!
//! A tuning session measures many candidate schedules. Each trial pairs a
//! [`MeasureInput`] (which workload, on which target, with which schedule) with
//! the [`MeasureResult`] produced by running it. This crate defines those types
//! and their on-disk serde shape; reading and writing log files lives in
//! `tunelog-store`.
//!
//! # Minimal and Recovered Forms
//!
//! Records are persisted in a *minimal* form that carries only identifying
//! data. Two heavy fields are derived rather than stored:
//!
//! - The task's [`ComputeDag`], rebuilt from the workload key
//! - The state's expanded [`Stage`] list, rebuilt by replaying the transform
//!   steps over the compute graph ([`BoundInference`])
//!
//! The two forms are separate types:
//!
//! ```text
//! MeasureInput                      (decoded, minimal)
//!     ↓ workload constructor
//! RecoveredInput { Minimal(State) } (compute graph attached)
//!     ↓ BoundInference
//! RecoveredInput { Expanded(..) }   (stage list attached)
//! ```
//!
//! Promotion only goes forward and is always explicit; there is no conversion
//! back to a minimal value.
//!
//! # Example
//!
//! ```
//! use tunelog_schema::{
//!     MeasureErrorNo, MeasureInput, MeasureResult, SearchTask, State, Target, TransformStep,
//! };
//!
//! let target: Target = "llvm -mcpu=skylake-avx512".parse().unwrap();
//! let task = SearchTask::new("dense_1024", target);
//! let state = State::new(vec![TransformStep::ComputeRoot { stage_id: 1 }]);
//! let input = MeasureInput::new(task, state);
//!
//! let result = MeasureResult::new(vec![0.5, 1.5], MeasureErrorNo::NoError, None, 2.5);
//! assert_eq!(input.task.target.kind_name(), "llvm");
//! assert_eq!(result.mean_cost(), Some(1.0));
//! ```

pub use self::{graph::*, measure::*};

pub mod graph;
pub mod measure;
