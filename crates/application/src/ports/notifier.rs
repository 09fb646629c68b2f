//! Notification sink port

/// Fire-and-forget sink for user-facing notices.
pub trait Notifier: Send + Sync {
    /// Reports a warning.
    fn warn(&self, message: &str);

    /// Forwards a line printed by a script.
    fn print(&self, message: &str);
}
