//! Record fixtures shared by the unit tests.

use tunelog_schema::{
    Axis, ComputeDag, IteratorAnnotation, MeasureErrorNo, MeasureInput, MeasureResult, Operation,
    SearchTask, State, TransformStep,
};

pub(crate) fn input(workload_key: &str, target: &str) -> MeasureInput {
    let task = SearchTask::new(workload_key, target.parse().unwrap());
    MeasureInput::new(task, State::new(schedule()))
}

pub(crate) fn success(costs: &[f64]) -> MeasureResult {
    MeasureResult {
        costs: costs.to_vec(),
        error_no: MeasureErrorNo::NoError,
        error_msg: None,
        all_cost: 1.5,
        timestamp: 1_700_000_000.5,
    }
}

pub(crate) fn failed(error_no: MeasureErrorNo) -> MeasureResult {
    MeasureResult {
        costs: vec![1e10],
        error_no,
        error_msg: Some(format!("{error_no}")),
        all_cost: 10.0,
        timestamp: 1_700_000_001.0,
    }
}

/// Schedule valid for [`matmul_dag`].
pub(crate) fn schedule() -> Vec<TransformStep> {
    vec![
        TransformStep::Split {
            stage_id: 2,
            iter_id: 0,
            lengths: vec![8, 4],
            inner_to_outer: true,
        },
        TransformStep::Reorder {
            stage_id: 2,
            after_ids: vec![0, 3, 1, 2, 4],
        },
        TransformStep::Fuse {
            stage_id: 2,
            fused_ids: vec![0, 1],
        },
        TransformStep::Annotation {
            stage_id: 2,
            iter_id: 0,
            annotation: IteratorAnnotation::Parallel,
        },
        TransformStep::ComputeInline { stage_id: 1 },
    ]
}

/// `C[i, j] = sum_k A[i, k] * B[k, j]`.
pub(crate) fn matmul_dag() -> ComputeDag {
    ComputeDag::new(vec![
        Operation::placeholder("A", vec![Axis::new("i", 512), Axis::new("k", 128)]),
        Operation::placeholder("B", vec![Axis::new("k", 128), Axis::new("j", 256)]),
        Operation::compute(
            "C",
            vec![Axis::new("i", 512), Axis::new("j", 256)],
            vec![Axis::new("k", 128)],
        ),
    ])
}
