//! Resource limits configuration for sandboxed execution

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wall-clock budget for a single process invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Default cap on captured bytes per output stream (1 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Resource limits for code execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    /// Wall-clock timeout for the run step, measured from spawn
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Wall-clock timeout for the compile step of compiled languages
    #[serde(with = "humantime_serde")]
    pub compile_timeout: Duration,

    /// Maximum bytes kept from each of stdout and stderr
    pub max_output_bytes: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            compile_timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl ResourceLimits {
    /// Tight limits for quick checks
    pub fn strict() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            compile_timeout: Duration::from_secs(5),
            max_output_bytes: 64 * 1024, // 64 KiB
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_compile_timeout(mut self, timeout: Duration) -> Self {
        self.compile_timeout = timeout;
        self
    }
}
