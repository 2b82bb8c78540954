//! Outbound presentation seams: transient notices and navigation.

use crate::domain::notice::{Notice, NoticeLevel};

/// Listing page shown after a product was created.
pub const PRODUCTS_PATH: &str = "/products";

/// Displays transient success/error banners.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Moves the operator to another page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Notifier writing notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => log::error!("{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => {
                log::info!("[{}] {}", notice.level.as_str(), notice.message)
            }
        }
    }
}

/// Navigator recording the destination in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        log::info!("Navigating to {path}");
    }
}

#[cfg(test)]
pub mod test {
    use parking_lot::Mutex;

    use super::{Navigator, Notifier};
    use crate::domain::notice::{Notice, NoticeLevel};

    /// Notifier keeping every notice for later assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
            self.notices
                .lock()
                .iter()
                .filter(|n| n.level == level)
                .map(|n| n.message.clone())
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().push(notice);
        }
    }

    #[derive(Default)]
    pub struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        pub fn visited(&self) -> Vec<String> {
            self.visited.lock().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visited.lock().push(path.to_string());
        }
    }
}
