use std::time::Duration;

use elecmate_core::report::DEFAULT_PAGE_SIZE;

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Tuning for [`BulkActionCoordinator`](crate::BulkActionCoordinator).
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Summaries requested per page, for both incremental loads and reloads.
    pub page_size: u32,
    /// Upper bound on each request to the remote store. A request that
    /// exceeds it is counted as a failure for its item.
    pub request_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
