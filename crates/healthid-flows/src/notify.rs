//! User-visible notification sink.
//!
//! Every provider failure ends up here instead of crashing the wizard;
//! tests use the recording sink to assert what the user would have seen.

use std::sync::Mutex;

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn push(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.push(Notification {
            level: NotifyLevel::Success,
            message: message.to_string(),
        });
    }

    fn warning(&self, message: &str) {
        self.push(Notification {
            level: NotifyLevel::Warning,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.push(Notification {
            level: NotifyLevel::Error,
            message: message.to_string(),
        });
    }
}

/// Collects notifications for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    inner: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.message).collect()
    }

    pub fn has_level(&self, level: NotifyLevel) -> bool {
        self.notifications().iter().any(|n| n.level == level)
    }
}

impl Notifier for RecordingNotifier {
    fn push(&self, notification: Notification) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

/// Forwards notifications to the tracing pipeline (demo binary).
#[derive(Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn push(&self, notification: Notification) {
        match notification.level {
            NotifyLevel::Success => info!(message = %notification.message, "notification"),
            NotifyLevel::Warning => warn!(message = %notification.message, "notification"),
            NotifyLevel::Error => error!(message = %notification.message, "notification"),
        }
    }
}
