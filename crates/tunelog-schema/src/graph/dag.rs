/// Compute graph of a workload: its operations in topological order.
///
/// A `ComputeDag` is never stored in a tuning log. It is rebuilt from the
/// workload key by the registered constructor, which must be deterministic for
/// a given key so that replayed schedules match the measured ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeDag {
    ops: Vec<Operation>,
}

impl ComputeDag {
    #[must_use]
    pub fn new(ops: Vec<Operation>) -> Self {
        Self { ops }
    }

    #[must_use]
    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum OpKind {
    Placeholder,
    Compute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub kind: OpKind,
    pub axes: Vec<Axis>,
    pub reduce_axes: Vec<Axis>,
}

impl Operation {
    /// An input tensor with the given shape.
    #[must_use]
    pub fn placeholder<S>(name: S, axes: Vec<Axis>) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: OpKind::Placeholder,
            axes,
            reduce_axes: vec![],
        }
    }

    #[must_use]
    pub fn compute<S>(name: S, axes: Vec<Axis>, reduce_axes: Vec<Axis>) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: OpKind::Compute,
            axes,
            reduce_axes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Axis {
    pub name: String,
    pub extent: u64,
}

impl Axis {
    #[must_use]
    pub fn new<S>(name: S, extent: u64) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            extent,
        }
    }
}
