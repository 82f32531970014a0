use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// A transient message shown to the user.
///
/// Only one is visible at a time; raising a new one replaces the old one.
/// `seq` identifies the notification so that a late dismissal aimed at an
/// older message leaves a newer one alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub seq: u64,
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

impl Notification {
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
