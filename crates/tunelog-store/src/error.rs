use std::{io, path::PathBuf};

/// Coarse classification of I/O failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum IoErrorKind {
    #[display("not found")]
    NotFound,
    #[display("permission denied")]
    PermissionDenied,
    #[display("I/O failure")]
    Other,
}

impl From<io::ErrorKind> for IoErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Other,
        }
    }
}

/// Errors raised while reading or writing a tuning log.
///
/// A record whose `error_no` is not `NoError` is *not* an error here; it is a
/// valid record of a failed measurement.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum RecordError {
    #[display("{kind} on {}: {source}", path.display())]
    Io {
        kind: IoErrorKind,
        path: PathBuf,
        source: io::Error,
    },
    /// A complete line that does not decode as a record.
    #[display("corrupt record at line {line}: {source}")]
    CorruptRecord {
        line: usize,
        source: serde_json::Error,
    },
    #[display("failed to encode record: {source}")]
    Encode { source: serde_json::Error },
    #[display("mismatched batch: {inputs} inputs but {results} results")]
    LengthMismatch { inputs: usize, results: usize },
}

impl RecordError {
    pub(crate) fn io<P>(path: P, source: io::Error) -> Self
    where
        P: Into<PathBuf>,
    {
        Self::Io {
            kind: source.kind().into(),
            path: path.into(),
            source,
        }
    }

    /// Returns the I/O classification, if this is an I/O error.
    #[must_use]
    pub fn io_kind(&self) -> Option<IoErrorKind> {
        match self {
            Self::Io { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
