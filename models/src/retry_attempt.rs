use std::time::Duration;

/// Snapshot handed to retry observers before each wait.
///
/// Lives only for the duration of one retry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 1-based number of the attempt that just failed.
    pub attempt_number: u32,
    /// How long the policy will wait before the next attempt.
    pub delay: Duration,
    pub last_error: String,
}
