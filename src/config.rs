// src/config.rs
// =============================================================================
// Engine configuration.
//
// All limits live here so the rest of the engine never hard-codes them.
// The defaults are the production values; the CLI can override the probe
// timeout and batch size (see cli.rs).
// =============================================================================

use std::time::Duration;

/// Largest code blob accepted by `analyze`, in characters
pub const MAX_CODE_CHARS: usize = 100_000;

/// Largest URL list accepted by the standalone verify operation
pub const MAX_VERIFY_URLS: usize = 50;

/// How many probes run at the same time
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Per-probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum accepted code length in characters
    pub max_code_chars: usize,
    /// Maximum number of URLs for standalone verification
    pub max_verify_urls: usize,
    /// Number of probes in flight per batch
    pub batch_size: usize,
    /// Deadline for a single probe
    pub probe_timeout: Duration,
    /// Redirects followed before a probe gives up
    pub max_redirects: usize,
    /// User-Agent header sent with every probe
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_code_chars: MAX_CODE_CHARS,
            max_verify_urls: MAX_VERIFY_URLS,
            batch_size: DEFAULT_BATCH_SIZE,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            max_redirects: 5,
            user_agent: format!("code-health/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl EngineConfig {
    // Builder-style overrides used by the CLI.
    // A batch size or timeout of zero would stall verification, so both are
    // clamped to at least 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout.max(Duration::from_secs(1));
        self
    }
}
