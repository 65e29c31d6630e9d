//! Rebuilding the heavy fields a decoded record does not carry.

use std::sync::Arc;

use tunelog_schema::{BoundInference, InferBoundError, MeasureInput, RecoveredInput, StepReplay};

use crate::WorkloadRegistry;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum RehydrateError {
    #[display("no workload registered under key '{workload_key}'")]
    UnknownWorkload { workload_key: String },
    #[display("failed to replay schedule: {_0}")]
    InferBound(InferBoundError),
}

/// Turns decoded [`MeasureInput`]s into [`RecoveredInput`]s.
#[derive(Debug, Clone, Copy)]
pub struct Rehydrator<'a> {
    registry: &'a WorkloadRegistry,
    inference: &'a dyn BoundInference,
}

impl Default for Rehydrator<'static> {
    /// Uses the global registry and [`StepReplay`].
    fn default() -> Self {
        Self::new(WorkloadRegistry::global(), &StepReplay)
    }
}

impl<'a> Rehydrator<'a> {
    #[must_use]
    pub fn new(registry: &'a WorkloadRegistry, inference: &'a dyn BoundInference) -> Self {
        Self {
            registry,
            inference,
        }
    }

    /// Rebuilds the compute graph of `input`, and its stages if `expand_state`.
    ///
    /// The transform steps are carried over unchanged. The input itself is not
    /// modified.
    pub fn rehydrate(
        &self,
        input: &MeasureInput,
        expand_state: bool,
    ) -> Result<RecoveredInput, RehydrateError> {
        let workload_key = &input.task.workload_key;
        let constructor = self.registry.lookup(workload_key)?;
        let compute_dag = Arc::new(constructor());
        let recovered = RecoveredInput::from_minimal(input, compute_dag);
        if !expand_state {
            return Ok(recovered);
        }
        let recovered = recovered
            .expand_state(self.inference)
            .map_err(RehydrateError::InferBound)?;
        tracing::trace!(
            workload_key = %workload_key,
            stages = recovered.stages().map_or(0, <[_]>::len),
            "expanded state"
        );
        Ok(recovered)
    }
}

/// Rehydrates `input` against the global registry.
pub fn rehydrate(input: &MeasureInput, expand_state: bool) -> Result<RecoveredInput, RehydrateError> {
    Rehydrator::default().rehydrate(input, expand_state)
}
