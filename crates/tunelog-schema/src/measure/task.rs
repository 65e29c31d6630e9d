use serde::{Deserialize, Serialize};

use super::Target;

/// Hardware limits the search was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareParams {
    pub num_cores: u32,
    pub vector_unit_bytes: u32,
    pub cache_line_bytes: u32,
    pub max_shared_memory_per_block: u32,
    pub max_local_memory_per_block: u32,
    pub max_threads_per_block: u32,
    pub max_vthread_extent: u32,
    pub warp_size: u32,
}

/// The tuning problem a trial belongs to.
///
/// Records with the same workload key and target kind are comparable. The
/// compute graph of the workload is not part of this type: it is derived from
/// `workload_key` on demand (see `tunelog-store`'s rehydrator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTask {
    pub workload_key: String,
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_host: Option<Target>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_params: Option<HardwareParams>,
}

impl SearchTask {
    #[must_use]
    pub fn new<S>(workload_key: S, target: Target) -> Self
    where
        S: Into<String>,
    {
        Self {
            workload_key: workload_key.into(),
            target,
            target_host: None,
            hardware_params: None,
        }
    }

    #[must_use]
    pub fn with_target_host(mut self, target_host: Target) -> Self {
        self.target_host = Some(target_host);
        self
    }

    #[must_use]
    pub fn with_hardware_params(mut self, hardware_params: HardwareParams) -> Self {
        self.hardware_params = Some(hardware_params);
        self
    }
}
