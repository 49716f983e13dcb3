//! Notifier that writes to the log.

use std::sync::Mutex;

use homescene_app::ports::Notifier;

/// Logs notifications at error level and keeps them for inspection.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl TracingNotifier {
    /// `(title, message)` pairs sent so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, message: &str) {
        tracing::error!(title, "{message}");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((title.to_string(), message.to_string()));
        }
    }
}
