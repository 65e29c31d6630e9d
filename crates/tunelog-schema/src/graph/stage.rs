use crate::{IteratorAnnotation, OpKind, Operation};

/// One operation of a compute graph with its loop nest after scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub op_name: String,
    pub op_kind: OpKind,
    pub iters: Vec<StageIterator>,
    pub attach: ComputeAttach,
}

impl Stage {
    /// Creates the unscheduled stage of `op`: spatial axes, then reduction axes.
    #[must_use]
    pub fn from_operation(op: &Operation) -> Self {
        let spatial = op
            .axes
            .iter()
            .map(|axis| StageIterator::new(&axis.name, axis.extent, IteratorKind::Spatial));
        let reduction = op
            .reduce_axes
            .iter()
            .map(|axis| StageIterator::new(&axis.name, axis.extent, IteratorKind::Reduction));
        Self {
            op_name: op.name.clone(),
            op_kind: op.kind,
            iters: spatial.chain(reduction).collect(),
            attach: ComputeAttach::Root,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageIterator {
    pub name: String,
    pub extent: u64,
    pub kind: IteratorKind,
    pub annotation: IteratorAnnotation,
    pub pragmas: Vec<String>,
}

impl StageIterator {
    #[must_use]
    pub fn new<S>(name: S, extent: u64, kind: IteratorKind) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            extent,
            kind,
            annotation: IteratorAnnotation::None,
            pragmas: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum IteratorKind {
    Spatial,
    Reduction,
}

/// Where a stage is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum ComputeAttach {
    #[default]
    Root,
    Inlined,
    At { stage_id: usize, iter_id: usize },
}
