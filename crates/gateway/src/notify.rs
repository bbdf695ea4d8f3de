use std::fmt;

use parking_lot::Mutex;
use tracing::warn;

/// Transient user-facing messages raised by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Forbidden,
    NotFound,
    ServerError,
    Network,
}

impl Notice {
    pub const fn message(self) -> &'static str {
        match self {
            Notice::Forbidden => "You do not have permission for this action",
            Notice::NotFound => "Resource not found",
            Notice::ServerError => "Server error",
            Notice::Network => "Could not connect to the server",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        warn!(?notice, "{notice}");
    }
}

/// Keeps every notice for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
