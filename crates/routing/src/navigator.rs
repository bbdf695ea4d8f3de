use parking_lot::Mutex;
use tracing::debug;

/// Moves the client to another location.
///
/// Navigations replace the current entry; there is no "back" to a page the
/// guard turned away from.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only remembers where it has been.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    entries: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.entries.lock().last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        debug!(path, "navigate");
        self.entries.lock().push(path.to_string());
    }
}
