use serde::{Deserialize, Serialize};

/// Ordered schedule transform steps applied to a task's compute graph.
///
/// This is the minimal form persisted in tuning logs. The stage list the steps
/// produce is derived data; see [`ExpandedState`](crate::ExpandedState).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub transform_steps: Vec<TransformStep>,
}

impl State {
    #[must_use]
    pub fn new(transform_steps: Vec<TransformStep>) -> Self {
        Self { transform_steps }
    }
}

/// A single schedule primitive.
///
/// Stages and iterators are addressed by index, as they exist at the time the
/// step is applied (earlier steps may have changed the iterator list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TransformStep {
    Annotation {
        stage_id: usize,
        iter_id: usize,
        annotation: IteratorAnnotation,
    },
    /// Fuses consecutive iterators into one.
    Fuse {
        stage_id: usize,
        fused_ids: Vec<usize>,
    },
    Pragma {
        stage_id: usize,
        iter_id: usize,
        pragma: String,
    },
    /// Permutes all iterators of a stage; `after_ids[i]` is the old index of
    /// the iterator placed at position `i`.
    Reorder {
        stage_id: usize,
        after_ids: Vec<usize>,
    },
    /// Splits an iterator into `lengths.len() + 1` iterators.
    ///
    /// The remainder extent goes outermost when `inner_to_outer` is set and
    /// innermost otherwise.
    Split {
        stage_id: usize,
        iter_id: usize,
        lengths: Vec<u64>,
        inner_to_outer: bool,
    },
    ComputeAt {
        stage_id: usize,
        target_stage_id: usize,
        target_iter_id: usize,
    },
    ComputeInline {
        stage_id: usize,
    },
    ComputeRoot {
        stage_id: usize,
    },
}

impl TransformStep {
    /// Index of the stage this step modifies.
    #[must_use]
    pub fn stage_id(&self) -> usize {
        match self {
            Self::Annotation { stage_id, .. }
            | Self::Fuse { stage_id, .. }
            | Self::Pragma { stage_id, .. }
            | Self::Reorder { stage_id, .. }
            | Self::Split { stage_id, .. }
            | Self::ComputeAt { stage_id, .. }
            | Self::ComputeInline { stage_id }
            | Self::ComputeRoot { stage_id } => *stage_id,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum IteratorAnnotation {
    #[default]
    #[display("none")]
    None,
    #[display("unroll")]
    Unroll,
    #[display("vectorize")]
    Vectorize,
    #[display("parallel")]
    Parallel,
    #[display("vthread")]
    VThread,
    #[serde(rename = "blockIdx.x")]
    #[display("blockIdx.x")]
    BlockX,
    #[serde(rename = "threadIdx.x")]
    #[display("threadIdx.x")]
    ThreadX,
    #[serde(rename = "blockIdx.y")]
    #[display("blockIdx.y")]
    BlockY,
    #[serde(rename = "threadIdx.y")]
    #[display("threadIdx.y")]
    ThreadY,
    #[serde(rename = "blockIdx.z")]
    #[display("blockIdx.z")]
    BlockZ,
    #[serde(rename = "threadIdx.z")]
    #[display("threadIdx.z")]
    ThreadZ,
    #[display("tensorize")]
    Tensorize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_serialization_format() {
        let step = TransformStep::Split {
            stage_id: 2,
            iter_id: 0,
            lengths: vec![8, 4],
            inner_to_outer: true,
        };
        let json = serde_json::to_string(&step).unwrap();
        assert_eq!(
            json,
            r#"{"step":"split","stage_id":2,"iter_id":0,"lengths":[8,4],"inner_to_outer":true}"#
        );
        assert_eq!(serde_json::from_str::<TransformStep>(&json).unwrap(), step);
    }

    #[test]
    fn test_annotation_names() {
        let step = TransformStep::Annotation {
            stage_id: 1,
            iter_id: 0,
            annotation: IteratorAnnotation::BlockX,
        };
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains(r#""annotation":"blockIdx.x""#), "{json}");
        assert_eq!(IteratorAnnotation::ThreadY.to_string(), "threadIdx.y");
        assert_eq!(IteratorAnnotation::VThread.to_string(), "vthread");
    }

    #[test]
    fn test_unknown_step_rejected() {
        assert!(serde_json::from_str::<TransformStep>(r#"{"step":"rfactor","stage_id":0}"#).is_err());
        assert!(serde_json::from_str::<TransformStep>(r#"{"step":"compute_root"}"#).is_err());
    }

    #[test]
    fn test_stage_id() {
        let steps = [
            TransformStep::ComputeInline { stage_id: 3 },
            TransformStep::Fuse {
                stage_id: 3,
                fused_ids: vec![0, 1],
            },
            TransformStep::ComputeAt {
                stage_id: 3,
                target_stage_id: 4,
                target_iter_id: 1,
            },
        ];
        assert!(steps.iter().all(|s| s.stage_id() == 3));
    }

    #[test]
    fn test_state_defaults_to_no_steps() {
        let state: State = serde_json::from_str("{}").unwrap();
        assert_eq!(state, State::default());
    }
}
