//! Durable, append-only record writer.
//!
//! Each [`RecordWriter::append`] issues one `write_all` of the encoded line and
//! its newline, then `sync_data`, before returning. Nothing is buffered
//! between calls: once `append` returns `Ok`, the record survives a crash of
//! the tuning process.
//!
//! A crash in the middle of an append can leave an unterminated tail. Opening
//! a writer repairs it first: a tail that decodes as a record gets its
//! newline, anything else is cut back to the last complete line. New records
//! therefore always start on a fresh line.
//!
//! Exactly one writer per file is assumed. Appends from several processes to
//! the same file are not coordinated.

use std::{
    fs::{File, OpenOptions},
    io::{self, Read as _, Seek as _, SeekFrom, Write as _},
    path::{Path, PathBuf},
};

use tunelog_schema::{MeasureInput, MeasureResult};

use crate::{RecordError, codec};

#[derive(Debug)]
pub struct RecordWriter {
    file: File,
    path: PathBuf,
    appended: usize,
}

impl RecordWriter {
    /// Opens `path` for appending, creating it if absent.
    ///
    /// Complete lines are never touched. An unterminated tail left by an
    /// interrupted append is terminated if it holds a whole record and cut
    /// off otherwise.
    pub fn open<P>(path: P) -> Result<Self, RecordError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| RecordError::io(path, e))?;
        repair_tail(&mut file, path).map_err(|e| RecordError::io(path, e))?;
        tracing::debug!(path = %path.display(), "opened tuning log for append");
        Ok(Self {
            file,
            path: path.to_owned(),
            appended: 0,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records appended through this writer.
    #[must_use]
    pub fn appended(&self) -> usize {
        self.appended
    }

    /// Appends one record and syncs it to disk.
    pub fn append(
        &mut self,
        input: &MeasureInput,
        result: &MeasureResult,
    ) -> Result<(), RecordError> {
        let mut line =
            codec::encode_record(input, result).map_err(|source| RecordError::Encode { source })?;
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .map_err(|e| RecordError::io(&self.path, e))?;
        self.file
            .sync_data()
            .map_err(|e| RecordError::io(&self.path, e))?;

        self.appended += 1;
        tracing::trace!(
            path = %self.path.display(),
            workload_key = %input.task.workload_key,
            error_no = %result.error_no,
            "appended record"
        );
        Ok(())
    }

    /// Appends `inputs[i]`/`results[i]` pairs in order.
    ///
    /// Every pair is synced individually. Lengths are checked before anything
    /// is written.
    pub fn append_all(
        &mut self,
        inputs: &[MeasureInput],
        results: &[MeasureResult],
    ) -> Result<(), RecordError> {
        if inputs.len() != results.len() {
            return Err(RecordError::LengthMismatch {
                inputs: inputs.len(),
                results: results.len(),
            });
        }
        for (input, result) in inputs.iter().zip(results) {
            self.append(input, result)?;
        }
        Ok(())
    }
}

/// Makes sure the file ends with a newline, or is empty.
fn repair_tail(file: &mut File, path: &Path) -> io::Result<()> {
    let len = file.metadata()?.len();
    let complete = complete_len(file, len)?;
    if complete == len {
        return Ok(());
    }

    let mut tail = Vec::new();
    file.seek(SeekFrom::Start(complete))?;
    file.read_to_end(&mut tail)?;
    if codec::decode_record(&tail).is_ok() {
        tracing::warn!(
            path = %path.display(),
            offset = complete,
            "terminating unterminated trailing record"
        );
        file.write_all(b"\n")?;
    } else {
        tracing::warn!(
            path = %path.display(),
            offset = complete,
            discarded = len - complete,
            "discarding incomplete trailing line"
        );
        file.set_len(complete)?;
    }
    file.sync_data()
}

/// Length of the first `len` bytes of `file` up to and including the last
/// newline, 0 if there is none.
fn complete_len(file: &mut File, len: u64) -> io::Result<u64> {
    let mut buf = [0_u8; 4096];
    let mut end = len;
    while end > 0 {
        let n = usize::try_from(end).map_or(buf.len(), |end| end.min(buf.len()));
        let start = end - n as u64;
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut buf[..n])?;
        if let Some(pos) = buf[..n].iter().rposition(|&b| b == b'\n') {
            return Ok(start + pos as u64 + 1);
        }
        end = start;
    }
    Ok(0)
}

/// Appends measurement records to the log at `path`.
pub fn save_records<P>(
    path: P,
    inputs: &[MeasureInput],
    results: &[MeasureResult],
) -> Result<(), RecordError>
where
    P: AsRef<Path>,
{
    RecordWriter::open(path)?.append_all(inputs, results)
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use tempfile::TempDir;

    use super::*;
    use crate::testing;

    #[test]
    fn test_append_writes_one_line_per_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tuning.json");

        let mut writer = RecordWriter::open(&path).unwrap();
        writer
            .append(&testing::input("a", "llvm"), &testing::success(&[1.0]))
            .unwrap();
        writer
            .append(&testing::input("b", "cuda"), &testing::success(&[2.0]))
            .unwrap();
        assert_eq!(writer.appended(), 2);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""workload_key":"a""#));
        assert!(lines[1].contains(r#""workload_key":"b""#));
    }

    #[test]
    fn test_open_never_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tuning.json");
        fs::write(&path, "existing line\n").unwrap();

        let mut writer = RecordWriter::open(&path).unwrap();
        writer
            .append(&testing::input("a", "llvm"), &testing::success(&[1.0]))
            .unwrap();
        drop(writer);

        RecordWriter::open(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("existing line\n"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_append_after_torn_tail() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tuning.json");

        let mut writer = RecordWriter::open(&path).unwrap();
        writer
            .append(&testing::input("a", "llvm"), &testing::success(&[2.0]))
            .unwrap();
        drop(writer);

        let torn =
            codec::encode_record(&testing::input("b", "llvm"), &testing::success(&[1.0])).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&torn.as_bytes()[..torn.len() / 2]).unwrap();
        drop(file);

        let mut writer = RecordWriter::open(&path).unwrap();
        writer
            .append(&testing::input("c", "llvm"), &testing::success(&[0.5]))
            .unwrap();
        drop(writer);

        let keys: Vec<String> = crate::load_records(&path)
            .unwrap()
            .into_iter()
            .map(|(input, _)| input.task.workload_key)
            .collect();
        assert_eq!(keys, ["a", "c"]);

        let (input, result) = crate::load_best(&path, None, None).unwrap().unwrap();
        assert_eq!(input.task.workload_key, "c");
        assert_eq!(result.mean_cost(), Some(0.5));
    }

    #[test]
    fn test_open_discards_tail_without_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tuning.json");
        fs::write(&path, r#"{"input":{"task""#).unwrap();

        RecordWriter::open(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_open_terminates_complete_tail() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tuning.json");
        let line =
            codec::encode_record(&testing::input("a", "llvm"), &testing::success(&[1.0])).unwrap();
        fs::write(&path, &line).unwrap();

        let mut writer = RecordWriter::open(&path).unwrap();
        writer
            .append(&testing::input("b", "llvm"), &testing::success(&[2.0]))
            .unwrap();
        drop(writer);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&format!("{line}\n")));
        assert_eq!(crate::load_records(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_open_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = RecordWriter::open(dir.path().join("missing/tuning.json")).unwrap_err();
        assert_eq!(err.io_kind(), Some(crate::IoErrorKind::NotFound));
    }

    #[test]
    fn test_save_records_rejects_mismatched_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tuning.json");

        let inputs = [testing::input("a", "llvm"), testing::input("b", "llvm")];
        let results = [testing::success(&[1.0])];
        let err = save_records(&path, &inputs, &results).unwrap_err();
        assert!(err.is_length_mismatch());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
