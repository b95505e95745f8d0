use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Memory bounds for fragment reassembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReassemblySection {
    pub idle_timeout_secs: u64,
    pub max_pending_nodes: u64,
    pub max_buffered_bytes: u64,
}

impl ReassemblySection {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for ReassemblySection {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 300,
            max_pending_nodes: 4096,
            max_buffered_bytes: 64 * 1024 * 1024,
        }
    }
}
