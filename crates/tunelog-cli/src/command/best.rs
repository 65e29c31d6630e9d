use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tunelog_schema::{MeasureInput, MeasureResult};

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct BestArg {
    /// Path to the tuning log
    log: PathBuf,
    /// Only consider records of this workload
    #[arg(long)]
    workload_key: Option<String>,
    /// Only consider records whose target has this kind (e.g. `llvm`, `cuda`)
    #[arg(long)]
    target_kind: Option<String>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
struct BestRecord<'a> {
    input: &'a MeasureInput,
    result: &'a MeasureResult,
    mean_cost: Option<f64>,
    recorded_at: Option<DateTime<Utc>>,
}

pub(crate) fn run(arg: &BestArg) -> anyhow::Result<()> {
    let BestArg {
        log,
        workload_key,
        target_kind,
        output,
    } = arg;

    let best = tunelog_store::load_best(log, workload_key.as_deref(), target_kind.as_deref())
        .with_context(|| format!("Failed to search tuning log: {}", log.display()))?;
    let Some((input, result)) = best else {
        anyhow::bail!("No successful record matched in {}", log.display());
    };

    let record = BestRecord {
        input: &input,
        result: &result,
        mean_cost: result.mean_cost(),
        recorded_at: result.recorded_at(),
    };
    let mut out = Output::create(output.as_deref())?;
    out.write_pretty_json(&record)?;
    out.finish()
}
