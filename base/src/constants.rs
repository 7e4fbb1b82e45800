//! Timeouts, limits and process-level values shared by every bot

use std::time::Duration;

/// Process exit codes
pub mod exit {
    /// Clean shutdown
    pub const OK: u8 = 0;

    /// Option parsing failure, missing required settings or a failed run
    pub const CONFIGURATION_ERROR: u8 = 3;
}

/// Chat transport constants
pub mod chat {
    use super::Duration;

    /// Upper bound for a single `chat api` invocation
    pub const API_CALL_TIMEOUT: Duration = Duration::from_secs(30);

    /// Upper bound for delivering a report to the error-report conversation
    pub const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Body of the liveness announcement sent at startup
    pub const LIVENESS_MESSAGE: &str = "I live.";
}

/// Service group shutdown constants
pub mod shutdown {
    use super::Duration;

    /// Time siblings get to finish after the first failure before being aborted
    pub const GRACE_PERIOD: Duration = Duration::from_secs(10);
}

/// Remote log service constants
pub mod logs {
    use super::Duration;

    /// Streams requested when looking for the current one
    pub const LATEST_STREAM_LIMIT: i32 = 1;

    /// Maximum streams a single describe request may ask for
    pub const MAX_STREAM_LIMIT: i32 = 50;

    /// Maximum length of log group and stream names
    pub const MAX_NAME_LENGTH: usize = 512;

    /// Number of trailing log lines attached to failure reports
    pub const REPORT_TAIL_LINES: usize = 25;

    /// Upper bound on fetching those lines before a failure report goes out
    pub const REPORT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
}
