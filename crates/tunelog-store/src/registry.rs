//! Process-wide table of workload constructors.
//!
//! The log stores only a workload key. To rebuild the compute graph of a
//! record, the constructor registered for that key is called again. Keys must
//! be registered before any record naming them is rehydrated.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

use tunelog_schema::ComputeDag;

use crate::RehydrateError;

/// Builds the compute graph of one workload.
pub type WorkloadConstructor = Arc<dyn Fn() -> ComputeDag + Send + Sync>;

static GLOBAL: LazyLock<WorkloadRegistry> = LazyLock::new(WorkloadRegistry::new);

#[derive(Default)]
pub struct WorkloadRegistry {
    table: RwLock<HashMap<String, WorkloadConstructor>>,
}

impl fmt::Debug for WorkloadRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<&str> = table.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("WorkloadRegistry")
            .field("keys", &keys)
            .finish()
    }
}

impl WorkloadRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used by [`register_workload`] and [`rehydrate`](crate::rehydrate()).
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers `constructor` under `key`, replacing any previous entry.
    pub fn register<S, F>(&self, key: S, constructor: F)
    where
        S: Into<String>,
        F: Fn() -> ComputeDag + Send + Sync + 'static,
    {
        let key = key.into();
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if table.contains_key(&key) {
            tracing::warn!(workload_key = %key, "replacing registered workload");
        } else {
            tracing::debug!(workload_key = %key, "registered workload");
        }
        table.insert(key, Arc::new(constructor));
    }

    /// Returns the constructor registered under `key`.
    ///
    /// The returned handle is independent of the table lock, so calling it
    /// may register further workloads.
    pub fn lookup(&self, key: &str) -> Result<WorkloadConstructor, RehydrateError> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table
            .get(key)
            .cloned()
            .ok_or_else(|| RehydrateError::UnknownWorkload {
                workload_key: key.to_owned(),
            })
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registers a workload in the global registry.
pub fn register_workload<S, F>(key: S, constructor: F)
where
    S: Into<String>,
    F: Fn() -> ComputeDag + Send + Sync + 'static,
{
    WorkloadRegistry::global().register(key, constructor);
}

/// Looks up a workload in the global registry.
pub fn lookup_workload(key: &str) -> Result<WorkloadConstructor, RehydrateError> {
    WorkloadRegistry::global().lookup(key)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use tunelog_schema::{Axis, Operation};

    use super::*;
    use crate::testing;

    fn vector_add() -> ComputeDag {
        ComputeDag::new(vec![
            Operation::placeholder("X", vec![Axis::new("i", 1024)]),
            Operation::compute("Y", vec![Axis::new("i", 1024)], vec![]),
        ])
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = WorkloadRegistry::new();
        assert!(registry.is_empty());

        registry.register("matmul", testing::matmul_dag);
        assert!(registry.contains("matmul"));
        assert_eq!(registry.len(), 1);

        let dag = registry.lookup("matmul").unwrap()();
        assert_eq!(dag, testing::matmul_dag());
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = WorkloadRegistry::new();
        let Err(err) = registry.lookup("missing") else {
            panic!("lookup of unregistered key succeeded");
        };
        assert!(matches!(
            &err,
            RehydrateError::UnknownWorkload { workload_key } if workload_key == "missing"
        ));
    }

    #[test]
    fn test_reregister_replaces() {
        let registry = WorkloadRegistry::new();
        registry.register("w", testing::matmul_dag);
        registry.register("w", vector_add);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("w").unwrap()(), vector_add());
    }

    #[test]
    fn test_constructor_may_register() {
        let registry = Arc::new(WorkloadRegistry::new());
        let inner = Arc::clone(&registry);
        registry.register("outer", move || {
            inner.register("inner", vector_add);
            vector_add()
        });

        let constructor = registry.lookup("outer").unwrap();
        constructor();
        assert!(registry.contains("inner"));
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = WorkloadRegistry::new();
        thread::scope(|s| {
            for i in 0..8 {
                let registry = &registry;
                s.spawn(move || {
                    registry.register(format!("w{i}"), vector_add);
                    assert!(registry.lookup(&format!("w{i}")).is_ok());
                });
            }
        });
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_global_registry() {
        register_workload("registry_test_global", vector_add);
        assert!(WorkloadRegistry::global().contains("registry_test_global"));
        assert_eq!(lookup_workload("registry_test_global").unwrap()(), vector_add());
    }

    #[test]
    fn test_debug_lists_keys() {
        let registry = WorkloadRegistry::new();
        registry.register("b", vector_add);
        registry.register("a", vector_add);
        assert_eq!(format!("{registry:?}"), r#"WorkloadRegistry { keys: ["a", "b"] }"#);
    }
}
