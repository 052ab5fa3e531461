//! Failure reporting towards the UI
//!
//! The controller hands each playback-start failure to a [`FailureReporter`]
//! exactly once. Reporting is fire-and-forget: nothing is returned and a
//! reporter must not block.

use tracing::warn;

/// Receives user-facing failure messages (toast, status line, log, ...)
pub trait FailureReporter: Send + Sync {
    fn report_failure(&self, message: &str);
}

/// Any `Fn(&str)` closure can act as a reporter
impl<F> FailureReporter for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report_failure(&self, message: &str) {
        self(message)
    }
}

/// Reporter that writes failures to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl FailureReporter for LogReporter {
    fn report_failure(&self, message: &str) {
        warn!(target: "preview_xfade::toast", "{}", message);
    }
}
