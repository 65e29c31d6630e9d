//! Streaming record reader.
//!
//! [`RecordReader`] decodes one line per step and never holds more than the
//! current line in memory. It can be used two ways:
//!
//! - As an [`Iterator`] of `Result<(MeasureInput, MeasureResult), RecordError>`
//! - Through [`read_batch`](RecordReader::read_batch), which collects a window
//!   of records into two parallel vectors
//!
//! # Line Handling
//!
//! | Line | Outcome |
//! |---|---|
//! | complete, decodes | yielded |
//! | complete, blank | skipped |
//! | complete, does not decode | [`RecordError::CorruptRecord`], or skipped under [`MalformedLinePolicy::Skip`] |
//! | unterminated at EOF, decodes | yielded |
//! | unterminated at EOF, does not decode | end of iteration, no error |
//!
//! An unterminated fragment is kept in the reader. If a concurrent writer
//! later completes the line, the next call to `next` picks it up.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    mem,
    path::{Path, PathBuf},
};

use tunelog_schema::{MeasureInput, MeasureResult};

use crate::{RecordError, codec};

/// What to do with a complete line that fails to decode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::FromStr, derive_more::Display)]
pub enum MalformedLinePolicy {
    /// Report the line as [`RecordError::CorruptRecord`].
    #[default]
    #[display("abort")]
    Abort,
    /// Log a warning and continue with the next line.
    #[display("skip")]
    Skip,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    pub malformed: MalformedLinePolicy,
}

type Item = Result<(MeasureInput, MeasureResult), RecordError>;

#[derive(Debug)]
pub struct RecordReader<R = BufReader<File>> {
    reader: R,
    path: PathBuf,
    options: ReaderOptions,
    /// Complete lines consumed so far.
    line_no: usize,
    /// Bytes of the line being read, possibly an unterminated fragment.
    pending: Vec<u8>,
}

impl RecordReader {
    /// Opens the log at `path` for reading.
    pub fn open<P>(path: P) -> Result<Self, RecordError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RecordError::io(path, e))?;
        tracing::debug!(path = %path.display(), "opened tuning log for read");
        Ok(Self::with_path(BufReader::new(file), path.to_owned()))
    }
}

impl<R> RecordReader<R>
where
    R: BufRead,
{
    /// Reads records from an arbitrary buffered stream.
    pub fn new(reader: R) -> Self {
        Self::with_path(reader, PathBuf::from("<stream>"))
    }

    fn with_path(reader: R, path: PathBuf) -> Self {
        Self {
            reader,
            path,
            options: ReaderOptions::default(),
            line_no: 0,
            pending: vec![],
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Number of complete lines consumed so far.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    /// Skips `skip_lines` lines, then decodes up to `max_lines` records.
    ///
    /// `None` or `Some(0)` reads to the end of the file. Skipped lines are not
    /// decoded, so they may be malformed. Reading resumes where the previous
    /// call stopped.
    pub fn read_batch(
        &mut self,
        max_lines: Option<usize>,
        skip_lines: usize,
    ) -> Result<(Vec<MeasureInput>, Vec<MeasureResult>), RecordError> {
        for _ in 0..skip_lines {
            if self.next_line()?.is_none() {
                break;
            }
        }

        let limit = max_lines.filter(|&n| n > 0);
        let mut inputs = vec![];
        let mut results = vec![];
        while limit.is_none_or(|limit| inputs.len() < limit) {
            let Some(record) = self.next() else {
                break;
            };
            let (input, result) = record?;
            inputs.push(input);
            results.push(result);
        }
        Ok((inputs, results))
    }

    /// Reads the next complete line into `pending`.
    ///
    /// Returns `Ok(None)` at end of file, leaving any unterminated fragment in
    /// `pending`. Returns `Ok(Some(false))` if the line is only whitespace.
    fn next_line(&mut self) -> Result<Option<bool>, RecordError> {
        if self.pending.ends_with(b"\n") {
            self.pending.clear();
        }
        self.reader
            .read_until(b'\n', &mut self.pending)
            .map_err(|e| RecordError::io(&self.path, e))?;
        if !self.pending.ends_with(b"\n") {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(!self.pending.iter().all(u8::is_ascii_whitespace)))
    }

    fn read_next(&mut self) -> Result<Option<(MeasureInput, MeasureResult)>, RecordError> {
        loop {
            match self.next_line()? {
                None => return Ok(self.take_trailing()),
                Some(false) => {}
                Some(true) => match codec::decode_record(&self.pending) {
                    Ok(record) => return Ok(Some(record)),
                    Err(source) => match self.options.malformed {
                        MalformedLinePolicy::Abort => {
                            return Err(RecordError::CorruptRecord {
                                line: self.line_no,
                                source,
                            });
                        }
                        MalformedLinePolicy::Skip => {
                            tracing::warn!(
                                path = %self.path.display(),
                                line = self.line_no,
                                error = %source,
                                "skipping malformed record"
                            );
                        }
                    },
                },
            }
        }
    }

    /// Decodes an unterminated fragment at end of file if it is a whole record.
    fn take_trailing(&mut self) -> Option<(MeasureInput, MeasureResult)> {
        if self.pending.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        match codec::decode_record(&self.pending) {
            Ok(record) => {
                // The newline may still arrive; it then reads as a blank line.
                mem::take(&mut self.pending);
                Some(record)
            }
            Err(e) => {
                tracing::debug!(
                    path = %self.path.display(),
                    bytes = self.pending.len(),
                    error = %e,
                    "stopping before incomplete trailing line"
                );
                None
            }
        }
    }
}

impl<R> Iterator for RecordReader<R>
where
    R: BufRead,
{
    type Item = Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Reads every record of the log at `path`.
///
/// Some expensive fields are not part of the decoded inputs; see
/// [`rehydrate`](crate::rehydrate()) to rebuild them.
pub fn load_records<P>(path: P) -> Result<Vec<(MeasureInput, MeasureResult)>, RecordError>
where
    P: AsRef<Path>,
{
    RecordReader::open(path)?.collect()
}
