//! Append-only storage for auto-tuning measurement records.
//!
//! A tuning log is a UTF-8 text file holding one JSON record per line. Each
//! line pairs a [`MeasureInput`](tunelog_schema::MeasureInput) with its
//! [`MeasureResult`](tunelog_schema::MeasureResult) and decodes on its own; the
//! file has no header, footer or index.
//!
//! # Components
//!
//! ```text
//! tuning loop ──▶ RecordToFile ──▶ RecordWriter ──▶ log file
//!                                                      │
//!                                  RecordReader ◀──────┘
//!                                      │
//!                 ┌────────────────────┼────────────────────┐
//!                 ▼                    ▼                    ▼
//!            find_best            Rehydrator          direct consumer
//! ```
//!
//! - [`codec`] - One record ⇄ one line
//! - [`writer`] - Appends records; every append is flushed to disk before returning
//! - [`reader`] - Batch and lazy reading, tolerant of a partially written last line
//! - [`best`] - Streaming minimum-mean-cost query
//! - [`registry`] - Workload key → compute graph constructor table
//! - [`rehydrate`] - Rebuilds the compute graph and stage list of a decoded input
//! - [`callback`] - Measure callback that logs every measured batch
//!
//! # Crash Tolerance
//!
//! A writer that dies mid-append leaves at most one unterminated fragment at
//! the end of the file. Readers treat that fragment as "not yet written": they
//! stop before it without error and pick it up later if the line gets
//! completed.
//!
//! # Example
//!
//! ```no_run
//! use tunelog_schema::{MeasureErrorNo, MeasureInput, MeasureResult, SearchTask, State, Target};
//! use tunelog_store::{RecordReader, RecordWriter, best};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let input = MeasureInput::new(
//!     SearchTask::new("dense_1024", Target::new("llvm")),
//!     State::default(),
//! );
//! let result = MeasureResult::new(vec![0.003], MeasureErrorNo::NoError, None, 1.2);
//!
//! let mut writer = RecordWriter::open("tuning.json")?;
//! writer.append(&input, &result)?;
//!
//! for record in RecordReader::open("tuning.json")? {
//!     let (input, result) = record?;
//!     println!("{} => {:?}", input.task.workload_key, result.mean_cost());
//! }
//!
//! let best = best::load_best("tuning.json", Some("dense_1024"), Some("llvm"))?;
//! assert!(best.is_some());
//! # Ok(())
//! # }
//! ```

pub use self::{
    best::{BestFilter, find_best, load_best},
    callback::{MeasureCallback, RecordToFile},
    error::{IoErrorKind, RecordError},
    reader::{MalformedLinePolicy, ReaderOptions, RecordReader, load_records},
    registry::{WorkloadConstructor, WorkloadRegistry, lookup_workload, register_workload},
    rehydrate::{RehydrateError, Rehydrator, rehydrate},
    writer::{RecordWriter, save_records},
};

pub mod best;
pub mod callback;
pub mod codec;
pub mod error;
pub mod reader;
pub mod registry;
pub mod rehydrate;
pub mod writer;

#[cfg(test)]
mod testing;
