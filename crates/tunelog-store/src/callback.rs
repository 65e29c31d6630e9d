//! Hooks invoked by a tuning loop after each measured batch.

use std::path::Path;

use tunelog_schema::{MeasureInput, MeasureResult};

use crate::{RecordError, RecordWriter};

/// Receives every batch of measurements, in the order they were taken.
pub trait MeasureCallback {
    fn callback(
        &mut self,
        inputs: &[MeasureInput],
        results: &[MeasureResult],
    ) -> Result<(), RecordError>;
}

/// Appends each measured batch to a tuning log.
#[derive(Debug)]
pub struct RecordToFile {
    writer: RecordWriter,
}

impl RecordToFile {
    pub const DEFAULT_FILE_NAME: &str = "tuning.json";

    pub fn open<P>(path: P) -> Result<Self, RecordError>
    where
        P: AsRef<Path>,
    {
        Ok(Self {
            writer: RecordWriter::open(path)?,
        })
    }

    #[must_use]
    pub fn writer(&self) -> &RecordWriter {
        &self.writer
    }
}

impl MeasureCallback for RecordToFile {
    fn callback(
        &mut self,
        inputs: &[MeasureInput],
        results: &[MeasureResult],
    ) -> Result<(), RecordError> {
        self.writer.append_all(inputs, results)?;
        tracing::debug!(
            path = %self.writer.path().display(),
            batch = inputs.len(),
            total = self.writer.appended(),
            "recorded measurements"
        );
        Ok(())
    }
}
