use std::path::PathBuf;

use anyhow::Context;
use chrono::SecondsFormat;
use tunelog_schema::{MeasureInput, MeasureResult};
use tunelog_store::{MalformedLinePolicy, ReaderOptions};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DumpArg {
    /// Path to the tuning log
    log: PathBuf,
    /// Maximum number of records to print (0 for all)
    #[arg(long)]
    pub(super) max_lines: Option<usize>,
    /// Number of lines to skip before printing
    #[arg(long, default_value_t = 0)]
    pub(super) skip_lines: usize,
    /// What to do with lines that are not valid records (abort or skip)
    #[arg(long, default_value = "abort")]
    pub(super) on_malformed: MalformedLinePolicy,
}

pub(crate) fn run(arg: &DumpArg) -> anyhow::Result<()> {
    let DumpArg {
        log,
        max_lines,
        skip_lines,
        on_malformed,
    } = arg;

    let options = ReaderOptions {
        malformed: *on_malformed,
    };
    let mut reader = util::open_log(log, options)?;
    let (inputs, results) = reader
        .read_batch(*max_lines, *skip_lines)
        .with_context(|| format!("Failed to read tuning log: {}", log.display()))?;

    let mut out = Output::create(None)?;
    for (index, (input, result)) in inputs.iter().zip(&results).enumerate() {
        out.write_line(&format_record(index, input, result))?;
    }
    out.finish()
}

fn format_record(index: usize, input: &MeasureInput, result: &MeasureResult) -> String {
    let recorded_at = result.recorded_at().map_or_else(
        || "-".to_string(),
        |t| t.to_rfc3339_opts(SecondsFormat::Millis, true),
    );
    format!(
        "{index:>6}  {}  {}  {}  {}  {recorded_at}",
        input.task.workload_key,
        input.task.target,
        result.error_no,
        util::format_cost(result.mean_cost()),
    )
}
