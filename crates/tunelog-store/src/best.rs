//! Selection of the fastest successful measurement in a log.

use std::path::Path;

use tunelog_schema::{MeasureInput, MeasureResult};

use crate::{RecordError, RecordReader};

/// Restricts which records take part in best selection.
///
/// An unset field matches everything.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BestFilter {
    pub workload_key: Option<String>,
    /// Compared against [`Target::kind_name`](tunelog_schema::Target::kind_name).
    pub target_kind: Option<String>,
}

impl BestFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn workload_key<S>(mut self, workload_key: S) -> Self
    where
        S: Into<String>,
    {
        self.workload_key = Some(workload_key.into());
        self
    }

    #[must_use]
    pub fn target_kind<S>(mut self, target_kind: S) -> Self
    where
        S: Into<String>,
    {
        self.target_kind = Some(target_kind.into());
        self
    }

    #[must_use]
    pub fn accepts(&self, input: &MeasureInput) -> bool {
        self.workload_key
            .as_deref()
            .is_none_or(|key| input.task.workload_key == key)
            && self
                .target_kind
                .as_deref()
                .is_none_or(|kind| input.task.target.kind_name() == kind)
    }
}

/// Cost used to rank `result`, or `None` if it cannot be the best.
fn ranking_cost(result: &MeasureResult) -> Option<f64> {
    if !result.is_success() {
        return None;
    }
    result.mean_cost().filter(|cost| cost.is_finite())
}

/// Returns the successful record with the lowest mean cost.
///
/// Records are consumed one at a time. On equal cost the earliest record wins.
/// The first error from `records` is returned as is.
pub fn find_best<I>(
    records: I,
    filter: &BestFilter,
) -> Result<Option<(MeasureInput, MeasureResult)>, RecordError>
where
    I: IntoIterator<Item = Result<(MeasureInput, MeasureResult), RecordError>>,
{
    let mut best: Option<(f64, MeasureInput, MeasureResult)> = None;
    for record in records {
        let (input, result) = record?;
        if !filter.accepts(&input) {
            continue;
        }
        let Some(cost) = ranking_cost(&result) else {
            continue;
        };
        if best.as_ref().is_none_or(|(best_cost, ..)| cost < *best_cost) {
            best = Some((cost, input, result));
        }
    }
    Ok(best.map(|(_, input, result)| (input, result)))
}

/// Returns the best record in the log at `path`.
///
/// `workload_key` and `target_kind` narrow the search when given. `Ok(None)`
/// means no successful record matched.
pub fn load_best<P>(
    path: P,
    workload_key: Option<&str>,
    target_kind: Option<&str>,
) -> Result<Option<(MeasureInput, MeasureResult)>, RecordError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let filter = BestFilter {
        workload_key: workload_key.map(str::to_owned),
        target_kind: target_kind.map(str::to_owned),
    };
    let best = find_best(RecordReader::open(path)?, &filter)?;
    match &best {
        Some((input, result)) => tracing::debug!(
            path = %path.display(),
            workload_key = %input.task.workload_key,
            target = %input.task.target,
            mean_cost = result.mean_cost(),
            "found best record"
        ),
        None => tracing::debug!(path = %path.display(), "no successful record matched"),
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use tunelog_schema::MeasureErrorNo;

    use super::*;
    use crate::{IoErrorKind, save_records, testing};

    fn ok(
        input: MeasureInput,
        result: MeasureResult,
    ) -> Result<(MeasureInput, MeasureResult), RecordError> {
        Ok((input, result))
    }

    #[test]
    fn test_lowest_mean_wins() {
        let records = [5.0, 3.0, 7.0]
            .into_iter()
            .map(|cost| ok(testing::input("dense_1024", "llvm"), testing::success(&[cost])));
        let (_, result) = find_best(records, &BestFilter::new()).unwrap().unwrap();
        assert_eq!(result.costs, [3.0]);
    }

    #[test]
    fn test_mean_over_repeats() {
        let records = vec![
            ok(testing::input("a", "llvm"), testing::success(&[1.0, 9.0])),
            ok(testing::input("b", "llvm"), testing::success(&[4.0, 4.0])),
        ];
        let (input, _) = find_best(records, &BestFilter::new()).unwrap().unwrap();
        assert_eq!(input.task.workload_key, "b");
    }

    #[test]
    fn test_failed_records_never_win() {
        let mut failed = testing::failed(MeasureErrorNo::WrongAnswer);
        failed.costs = vec![0.001];
        let records = vec![
            ok(testing::input("a", "llvm"), testing::success(&[2.0])),
            ok(testing::input("b", "llvm"), failed),
        ];
        let (input, _) = find_best(records, &BestFilter::new()).unwrap().unwrap();
        assert_eq!(input.task.workload_key, "a");
    }

    #[test]
    fn test_unusable_costs_are_excluded() {
        let records = vec![
            ok(testing::input("empty", "llvm"), testing::success(&[])),
            ok(testing::input("nan", "llvm"), testing::success(&[f64::NAN])),
            ok(testing::input("inf", "llvm"), testing::success(&[f64::INFINITY])),
            ok(testing::input("fine", "llvm"), testing::success(&[100.0])),
        ];
        let (input, _) = find_best(records, &BestFilter::new()).unwrap().unwrap();
        assert_eq!(input.task.workload_key, "fine");
    }

    #[test]
    fn test_tie_keeps_earliest() {
        let records = ["first", "second", "third"]
            .into_iter()
            .map(|key| ok(testing::input(key, "llvm"), testing::success(&[1.0])));
        let (input, _) = find_best(records, &BestFilter::new()).unwrap().unwrap();
        assert_eq!(input.task.workload_key, "first");
    }

    #[test]
    fn test_nothing_qualifies() {
        let empty: Vec<Result<(MeasureInput, MeasureResult), RecordError>> = vec![];
        assert!(find_best(empty, &BestFilter::new()).unwrap().is_none());

        let records = vec![ok(
            testing::input("a", "llvm"),
            testing::failed(MeasureErrorNo::BuildTimeout),
        )];
        assert!(find_best(records, &BestFilter::new()).unwrap().is_none());
    }

    #[test]
    fn test_reader_error_propagates() {
        let records = vec![
            ok(testing::input("a", "llvm"), testing::success(&[1.0])),
            Err(RecordError::LengthMismatch {
                inputs: 0,
                results: 1,
            }),
        ];
        let err = find_best(records, &BestFilter::new()).unwrap_err();
        assert!(err.is_length_mismatch());
    }

    #[test]
    fn test_filter_by_workload_and_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tuning.json");

        let cases = [
            ("dense_1024", "llvm -mcpu=skylake", 4.0),
            ("dense_1024", "cuda", 1.0),
            ("conv_256", "llvm", 0.5),
            ("dense_1024", "llvm", 3.0),
            ("conv_256", "cuda", 2.0),
        ];
        let inputs: Vec<_> = cases
            .iter()
            .map(|(key, target, _)| testing::input(key, target))
            .collect();
        let results: Vec<_> = cases
            .iter()
            .map(|(.., cost)| testing::success(&[*cost]))
            .collect();
        save_records(&path, &inputs, &results).unwrap();

        let best_cost = |key, kind| {
            load_best(&path, key, kind)
                .unwrap()
                .map(|(_, result)| result.costs[0])
        };
        assert_eq!(best_cost(None, None), Some(0.5));
        assert_eq!(best_cost(Some("dense_1024"), None), Some(1.0));
        assert_eq!(best_cost(Some("dense_1024"), Some("llvm")), Some(3.0));
        assert_eq!(best_cost(Some("conv_256"), Some("cuda")), Some(2.0));
        assert_eq!(best_cost(None, Some("cuda")), Some(1.0));
        assert_eq!(best_cost(Some("softmax"), None), None);
        assert_eq!(best_cost(None, Some("opencl")), None);
    }

    #[test]
    fn test_load_best_empty_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tuning.json");
        fs::write(&path, "").unwrap();
        assert!(load_best(&path, None, None).unwrap().is_none());
    }

    #[test]
    fn test_load_best_missing_log() {
        let dir = TempDir::new().unwrap();
        let err = load_best(dir.path().join("missing.json"), None, None).unwrap_err();
        assert_eq!(err.io_kind(), Some(IoErrorKind::NotFound));
    }
}
