//! User notifications emitted by mutations and subscriptions

use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info, title: title.into(), message: message.into() }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, title: title.into(), message: message.into() }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, title: title.into(), message: message.into() }
    }
}

/// Sink for notifications (toasts in the field application)
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => error!("{}: {}", notification.title, notification.message),
            _ => info!("{}: {}", notification.title, notification.message),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every notification for assertions
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn all(&self) -> Vec<Notification> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.lock().unwrap().push(notification);
        }
    }
}
