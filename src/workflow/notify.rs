//! HB-08: Notification seam.
//!
//! Sessions report outcomes through the `Notifier` trait instead of
//! talking to the window directly. Production wires this to a Tauri
//! event channel; tests capture into a buffer. Keeping the seam here
//! is what makes exactly-once delivery testable.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyKind {
    Success,
    Error,
    Info,
}

/// One operator-facing toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotifyKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: &str) -> Self {
        Self {
            kind: NotifyKind::Success,
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            kind: NotifyKind::Error,
            message: message.to_string(),
        }
    }

    pub fn info(message: &str) -> Self {
        Self {
            kind: NotifyKind::Info,
            message: message.to_string(),
        }
    }
}

/// Sink for operator notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Swallows everything. For paths where nobody is watching.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Captures notifications in order for assertions.
pub struct BufferNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl BufferNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for BufferNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for BufferNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
    }
}
