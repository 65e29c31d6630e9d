use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use tunelog_store::{ReaderOptions, RecordReader};

/// Where a command writes its report: stdout, or a file given by `--output`
pub struct Output {
    writer: Box<dyn Write>,
    name: String,
}

impl Output {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                writer: Box::new(io::stdout().lock()),
                name: "stdout".to_string(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            name: path.display().to_string(),
        })
    }

    pub fn write_pretty_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.name))?;
        self.write_line("")
    }

    pub fn write_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "{line}")
            .with_context(|| format!("Failed to write to {}", self.name))
    }

    pub fn finish(mut self) -> anyhow::Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush output to {}", self.name))
    }
}

/// Opens a tuning log for reading
pub fn open_log<P>(path: P, options: ReaderOptions) -> anyhow::Result<RecordReader>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let reader = RecordReader::open(path)
        .with_context(|| format!("Failed to open tuning log: {}", path.display()))?;
    Ok(reader.with_options(options))
}

/// Formats a cost for tabular output, `-` if there is none
pub fn format_cost(cost: Option<f64>) -> String {
    match cost {
        Some(cost) => format!("{cost:.6e}"),
        None => "-".to_string(),
    }
}
