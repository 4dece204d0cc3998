//! User-facing notifications (toasts).
//!
//! Producers fire and forget; the terminal front end drains a channel and
//! shows the latest message until its auto-dismiss delay runs out.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use tracing::{error, info, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    /// How long the message stays visible.
    pub auto_dismiss: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, auto_dismiss: Duration) -> Self {
        Self {
            message: message.into(),
            severity,
            auto_dismiss,
        }
    }

    pub fn error(message: impl Into<String>, auto_dismiss: Duration) -> Self {
        Self::new(message, Severity::Error, auto_dismiss)
    }

    pub fn info(message: impl Into<String>, auto_dismiss: Duration) -> Self {
        Self::new(message, Severity::Info, auto_dismiss)
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to a channel owned by the UI.
pub struct ChannelSink {
    tx: Sender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<Notification>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // A dropped receiver means the UI is gone; nothing left to show it on.
        let _ = self.tx.send(notification);
    }
}

/// Writes notifications to the log instead of showing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => info!(text = %notification.message, "notification"),
            Severity::Warning => warn!(text = %notification.message, "notification"),
            Severity::Error => error!(text = %notification.message, "notification"),
        }
    }
}
