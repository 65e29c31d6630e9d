use std::sync::Arc;

use crate::{
    BoundInference, ComputeDag, InferBoundError, MeasureInput, SearchTask, Stage, State,
    TransformStep,
};

/// A [`SearchTask`] with its compute graph rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredTask {
    task: SearchTask,
    compute_dag: Arc<ComputeDag>,
}

impl RecoveredTask {
    #[must_use]
    pub fn new(task: SearchTask, compute_dag: Arc<ComputeDag>) -> Self {
        Self { task, compute_dag }
    }

    #[must_use]
    pub fn task(&self) -> &SearchTask {
        &self.task
    }

    #[must_use]
    pub fn compute_dag(&self) -> &Arc<ComputeDag> {
        &self.compute_dag
    }
}

/// Transform steps together with the stages they produce.
///
/// Only [`RecoveredInput::expand_state`] creates values of this type, so the
/// stages always come from running bound inference over the steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedState {
    transform_steps: Vec<TransformStep>,
    stages: Vec<Stage>,
}

impl ExpandedState {
    #[must_use]
    pub fn transform_steps(&self) -> &[TransformStep] {
        &self.transform_steps
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum RecoveredState {
    Minimal(State),
    Expanded(ExpandedState),
}

/// A [`MeasureInput`] with derived heavy fields attached.
///
/// The compute graph is always present. The stage list is present once
/// [`expand_state`](Self::expand_state) has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredInput {
    task: RecoveredTask,
    state: RecoveredState,
}

impl RecoveredInput {
    /// Attaches a rebuilt compute graph to a decoded input.
    ///
    /// The input's task and state are cloned; `input` itself is left as is.
    #[must_use]
    pub fn from_minimal(input: &MeasureInput, compute_dag: Arc<ComputeDag>) -> Self {
        Self {
            task: RecoveredTask::new(input.task.clone(), compute_dag),
            state: RecoveredState::Minimal(input.state.clone()),
        }
    }

    #[must_use]
    pub fn task(&self) -> &RecoveredTask {
        &self.task
    }

    #[must_use]
    pub fn state(&self) -> &RecoveredState {
        &self.state
    }

    #[must_use]
    pub fn transform_steps(&self) -> &[TransformStep] {
        match &self.state {
            RecoveredState::Minimal(state) => &state.transform_steps,
            RecoveredState::Expanded(state) => &state.transform_steps,
        }
    }

    /// Returns the stage list, if the state has been expanded.
    #[must_use]
    pub fn stages(&self) -> Option<&[Stage]> {
        match &self.state {
            RecoveredState::Minimal(_) => None,
            RecoveredState::Expanded(state) => Some(&state.stages),
        }
    }

    /// Runs bound inference and attaches the resulting stages.
    ///
    /// An already expanded input is returned unchanged.
    pub fn expand_state(self, inference: &dyn BoundInference) -> Result<Self, InferBoundError> {
        let state = match self.state {
            RecoveredState::Minimal(state) => state,
            RecoveredState::Expanded(_) => return Ok(self),
        };
        let stages = inference.infer_bound(&self.task.compute_dag, &state.transform_steps)?;
        Ok(Self {
            task: self.task,
            state: RecoveredState::Expanded(ExpandedState {
                transform_steps: state.transform_steps,
                stages,
            }),
        })
    }
}
