/// URL change detection for a single document

/// Remembers the last URL reported for a document and decides when a
/// new one is worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationWatcher {
    last_reported: String,
}

impl NavigationWatcher {
    /// Start watching a document; the initial URL is always reported.
    pub fn attach(current_url: &str) -> (NavigationWatcher, String) {
        let watcher = NavigationWatcher {
            last_reported: current_url.to_string(),
        };
        (watcher, current_url.to_string())
    }

    /// Returns the URL to report if it differs from the last one reported
    pub fn observe(&mut self, current_url: &str) -> Option<String> {
        if current_url == self.last_reported {
            return None;
        }

        self.last_reported = current_url.to_string();
        Some(self.last_reported.clone())
    }

    pub fn last_reported(&self) -> &str {
        &self.last_reported
    }
}
