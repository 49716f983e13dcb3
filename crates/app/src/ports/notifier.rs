//! Notifier port — user-visible notifications.

/// Shows a notification to the user. Used once at startup when the
/// configuration cannot be activated.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn notify(&self, title: &str, message: &str) {
        (**self).notify(title, message);
    }
}
