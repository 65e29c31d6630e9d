use std::fmt;

use crate::{ComputeAttach, ComputeDag, IteratorKind, Stage, StageIterator, TransformStep};

/// Rebuilds the stage list a schedule produces on a compute graph.
///
/// Implementations must be deterministic: the same graph and steps always
/// yield the same stages. Rehydration relies on this to reproduce the stages
/// that existed when a trial was measured.
pub trait BoundInference: fmt::Debug + Send + Sync {
    fn infer_bound(
        &self,
        dag: &ComputeDag,
        steps: &[TransformStep],
    ) -> Result<Vec<Stage>, InferBoundError>;
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InferBoundError {
    #[display("step #{step}: stage {stage_id} out of range ({num_stages} stages)")]
    StageOutOfRange {
        step: usize,
        stage_id: usize,
        num_stages: usize,
    },
    #[display("step #{step}: iterator {iter_id} out of range for stage '{stage}' ({num_iters} iterators)")]
    IterOutOfRange {
        step: usize,
        stage: String,
        iter_id: usize,
        num_iters: usize,
    },
    #[display("step #{step}: split lengths must be non-empty and positive, got {lengths:?}")]
    InvalidSplit { step: usize, lengths: Vec<u64> },
    #[display("step #{step}: fused iterators must be non-empty and consecutive, got {fused_ids:?}")]
    InvalidFuse { step: usize, fused_ids: Vec<usize> },
    #[display("step #{step}: cannot fuse spatial and reduction iterators")]
    MixedFuse { step: usize },
    #[display("step #{step}: reorder {after_ids:?} is not a permutation of {num_iters} iterators")]
    InvalidReorder {
        step: usize,
        after_ids: Vec<usize>,
        num_iters: usize,
    },
    #[display("step #{step}: stage {stage_id} cannot be computed at itself")]
    SelfAttach { step: usize, stage_id: usize },
}

/// Reference [`BoundInference`]: replays steps over one stage per operation.
///
/// | Step | Effect on the stage |
/// |---|---|
/// | `split` | iterator `x` of extent `E` becomes `x.0 .. x.k`; the remainder `ceil(E / prod(lengths))` is outermost if `inner_to_outer`, innermost otherwise |
/// | `fuse` | consecutive iterators become one named `a@b`, extent = product |
/// | `reorder` | iterators permuted by `after_ids` |
/// | `annotation` | iterator annotation set |
/// | `pragma` | pragma appended to the iterator |
/// | `compute_at` / `compute_inline` / `compute_root` | stage attachment set |
///
/// Extents are computed with saturating arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepReplay;

impl BoundInference for StepReplay {
    fn infer_bound(
        &self,
        dag: &ComputeDag,
        steps: &[TransformStep],
    ) -> Result<Vec<Stage>, InferBoundError> {
        let mut stages: Vec<Stage> = dag.ops().iter().map(Stage::from_operation).collect();
        for (step_idx, step) in steps.iter().enumerate() {
            apply_step(&mut stages, step_idx, step)?;
        }
        Ok(stages)
    }
}

fn apply_step(
    stages: &mut [Stage],
    step_idx: usize,
    step: &TransformStep,
) -> Result<(), InferBoundError> {
    let num_stages = stages.len();
    let stage_id = step.stage_id();
    if stage_id >= num_stages {
        return Err(InferBoundError::StageOutOfRange {
            step: step_idx,
            stage_id,
            num_stages,
        });
    }

    match step {
        TransformStep::Annotation {
            iter_id,
            annotation,
            ..
        } => {
            let iter = iter_mut(&mut stages[stage_id], step_idx, *iter_id)?;
            iter.annotation = *annotation;
        }
        TransformStep::Pragma {
            iter_id, pragma, ..
        } => {
            let iter = iter_mut(&mut stages[stage_id], step_idx, *iter_id)?;
            iter.pragmas.push(pragma.clone());
        }
        TransformStep::Split {
            iter_id,
            lengths,
            inner_to_outer,
            ..
        } => split(
            &mut stages[stage_id],
            step_idx,
            *iter_id,
            lengths,
            *inner_to_outer,
        )?,
        TransformStep::Fuse { fused_ids, .. } => fuse(&mut stages[stage_id], step_idx, fused_ids)?,
        TransformStep::Reorder { after_ids, .. } => {
            reorder(&mut stages[stage_id], step_idx, after_ids)?;
        }
        TransformStep::ComputeAt {
            target_stage_id,
            target_iter_id,
            ..
        } => {
            if *target_stage_id >= num_stages {
                return Err(InferBoundError::StageOutOfRange {
                    step: step_idx,
                    stage_id: *target_stage_id,
                    num_stages,
                });
            }
            if *target_stage_id == stage_id {
                return Err(InferBoundError::SelfAttach {
                    step: step_idx,
                    stage_id,
                });
            }
            iter_mut(&mut stages[*target_stage_id], step_idx, *target_iter_id)?;
            stages[stage_id].attach = ComputeAttach::At {
                stage_id: *target_stage_id,
                iter_id: *target_iter_id,
            };
        }
        TransformStep::ComputeInline { .. } => stages[stage_id].attach = ComputeAttach::Inlined,
        TransformStep::ComputeRoot { .. } => stages[stage_id].attach = ComputeAttach::Root,
    }
    Ok(())
}

fn iter_mut(
    stage: &mut Stage,
    step_idx: usize,
    iter_id: usize,
) -> Result<&mut StageIterator, InferBoundError> {
    let num_iters = stage.iters.len();
    stage
        .iters
        .get_mut(iter_id)
        .ok_or_else(|| InferBoundError::IterOutOfRange {
            step: step_idx,
            stage: stage.op_name.clone(),
            iter_id,
            num_iters,
        })
}

fn split(
    stage: &mut Stage,
    step_idx: usize,
    iter_id: usize,
    lengths: &[u64],
    inner_to_outer: bool,
) -> Result<(), InferBoundError> {
    if lengths.is_empty() || lengths.contains(&0) {
        return Err(InferBoundError::InvalidSplit {
            step: step_idx,
            lengths: lengths.to_vec(),
        });
    }
    let original = iter_mut(stage, step_idx, iter_id)?.clone();

    let product = lengths.iter().fold(1_u64, |acc, l| acc.saturating_mul(*l));
    let remainder = original.extent.div_ceil(product);
    let extents: Vec<u64> = if inner_to_outer {
        std::iter::once(remainder).chain(lengths.iter().copied()).collect()
    } else {
        lengths.iter().copied().chain(std::iter::once(remainder)).collect()
    };

    let new_iters = extents.into_iter().enumerate().map(|(i, extent)| {
        StageIterator::new(format!("{}.{i}", original.name), extent, original.kind)
    });
    stage.iters.splice(iter_id..=iter_id, new_iters);
    Ok(())
}

fn fuse(stage: &mut Stage, step_idx: usize, fused_ids: &[usize]) -> Result<(), InferBoundError> {
    let invalid = || InferBoundError::InvalidFuse {
        step: step_idx,
        fused_ids: fused_ids.to_vec(),
    };
    let (&first, &last) = fused_ids.first().zip(fused_ids.last()).ok_or_else(invalid)?;
    if fused_ids.windows(2).any(|w| w[0].checked_add(1) != Some(w[1])) {
        return Err(invalid());
    }
    iter_mut(stage, step_idx, last)?;

    let fused = &stage.iters[first..=last];
    let kind = fused[0].kind;
    if fused.iter().any(|it| it.kind != kind) {
        return Err(InferBoundError::MixedFuse { step: step_idx });
    }
    let name = fused
        .iter()
        .map(|it| it.name.as_str())
        .collect::<Vec<_>>()
        .join("@");
    let extent = fused
        .iter()
        .fold(1_u64, |acc, it| acc.saturating_mul(it.extent));

    stage
        .iters
        .splice(first..=last, [StageIterator::new(name, extent, kind)]);
    Ok(())
}

fn reorder(stage: &mut Stage, step_idx: usize, after_ids: &[usize]) -> Result<(), InferBoundError> {
    let num_iters = stage.iters.len();
    let mut seen = vec![false; num_iters];
    let is_permutation = after_ids.len() == num_iters
        && after_ids
            .iter()
            .all(|&id| id < num_iters && !std::mem::replace(&mut seen[id], true));
    if !is_permutation {
        return Err(InferBoundError::InvalidReorder {
            step: step_idx,
            after_ids: after_ids.to_vec(),
            num_iters,
        });
    }
    stage.iters = after_ids.iter().map(|&id| stage.iters[id].clone()).collect();
    Ok(())
}
