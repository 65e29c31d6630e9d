use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use tunelog_schema::{MeasureInput, MeasureResult};
use tunelog_store::{MalformedLinePolicy, ReaderOptions};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SummaryArg {
    /// Path to the tuning log
    log: PathBuf,
    /// What to do with lines that are not valid records (abort or skip)
    #[arg(long, default_value = "abort")]
    on_malformed: MalformedLinePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct GroupStats {
    total: usize,
    succeeded: usize,
    best_mean_cost: Option<f64>,
}

impl GroupStats {
    fn add(&mut self, result: &MeasureResult) {
        self.total += 1;
        if !result.is_success() {
            return;
        }
        self.succeeded += 1;
        if let Some(cost) = result.mean_cost().filter(|c| c.is_finite())
            && self.best_mean_cost.is_none_or(|best| cost < best)
        {
            self.best_mean_cost = Some(cost);
        }
    }
}

/// Per (workload key, target kind) statistics, in key order
#[derive(Debug, Default)]
struct Summary {
    groups: BTreeMap<(String, String), GroupStats>,
}

impl Summary {
    fn add(&mut self, input: &MeasureInput, result: &MeasureResult) {
        let key = (
            input.task.workload_key.clone(),
            input.task.target.kind_name().to_owned(),
        );
        self.groups.entry(key).or_default().add(result);
    }
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let SummaryArg { log, on_malformed } = arg;

    let options = ReaderOptions {
        malformed: *on_malformed,
    };
    let mut summary = Summary::default();
    for record in util::open_log(log, options)? {
        let (input, result) =
            record.with_context(|| format!("Failed to read tuning log: {}", log.display()))?;
        summary.add(&input, &result);
    }
    tracing::debug!(
        path = %log.display(),
        groups = summary.groups.len(),
        "summarized tuning log"
    );

    println!(
        "  {:<32} {:<10} {:>8} {:>10} {:>14}",
        "Workload", "Target", "Records", "Succeeded", "Best(mean)"
    );
    println!("  {}", "-".repeat(78));
    for ((workload_key, target_kind), stats) in &summary.groups {
        println!(
            "  {:<32} {:<10} {:>8} {:>10} {:>14}",
            workload_key,
            target_kind,
            stats.total,
            stats.succeeded,
            util::format_cost(stats.best_mean_cost),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tunelog_schema::{MeasureErrorNo, SearchTask, State};

    use super::*;

    fn record(
        workload_key: &str,
        target: &str,
        error_no: MeasureErrorNo,
        costs: Vec<f64>,
    ) -> (MeasureInput, MeasureResult) {
        let task = SearchTask::new(workload_key, target.parse().unwrap());
        let result = MeasureResult::new(costs, error_no, None, 1.0);
        (MeasureInput::new(task, State::default()), result)
    }

    #[test]
    fn test_groups_by_workload_and_target_kind() {
        let records = [
            record("dense", "llvm", MeasureErrorNo::NoError, vec![3.0]),
            record("dense", "llvm -mcpu=skylake", MeasureErrorNo::NoError, vec![2.0]),
            record("dense", "cuda", MeasureErrorNo::CompileDeviceError, vec![1e10]),
            record("conv", "llvm", MeasureErrorNo::NoError, vec![f64::NAN]),
            record("dense", "llvm", MeasureErrorNo::RunTimeout, vec![0.1]),
        ];
        let mut summary = Summary::default();
        for (input, result) in &records {
            summary.add(input, result);
        }

        let groups: Vec<_> = summary
            .groups
            .iter()
            .map(|((key, kind), stats)| (key.as_str(), kind.as_str(), *stats))
            .collect();
        assert_eq!(
            groups,
            [
                (
                    "conv",
                    "llvm",
                    GroupStats {
                        total: 1,
                        succeeded: 1,
                        best_mean_cost: None,
                    }
                ),
                (
                    "dense",
                    "cuda",
                    GroupStats {
                        total: 1,
                        succeeded: 0,
                        best_mean_cost: None,
                    }
                ),
                (
                    "dense",
                    "llvm",
                    GroupStats {
                        total: 3,
                        succeeded: 2,
                        best_mean_cost: Some(2.0),
                    }
                ),
            ]
        );
    }
}
