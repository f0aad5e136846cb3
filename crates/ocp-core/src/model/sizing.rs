// ── Compute sizing and memory units ──
//
// Memory is declared in GB and reported by the backend in MB.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MB_PER_GB: u64 = 1024;

/// MB → GB by integer division. Sizes that are not a whole number of GB
/// are truncated.
pub fn mb_to_gb(mb: u64) -> u32 {
    if mb % MB_PER_GB != 0 {
        debug!(memory_size_mb = mb, "memory size is not a whole number of GB, truncating");
    }
    u32::try_from(mb / MB_PER_GB).unwrap_or(u32::MAX)
}

pub(crate) fn default_cores_per_socket() -> u32 {
    1
}

pub(crate) fn default_true() -> bool {
    true
}

/// CPU and memory shape of a host: the fields `virtualHostResize` changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sizing {
    pub cpu_count: u32,
    pub cores_per_socket: u32,
    pub memory_size_gb: u32,
}
