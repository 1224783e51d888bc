//! Notification sink that logs through tracing and keeps a record.

use std::sync::Mutex;

use crate::infrastructure::ports::{Notification, NotificationSink, NotifyLevel};

#[derive(Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<(NotifyLevel, Notification)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(NotifyLevel, Notification)> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, level: NotifyLevel, notification: Notification) {
        match level {
            NotifyLevel::Info => tracing::info!(%notification, "Notification"),
            NotifyLevel::Warn => tracing::warn!(%notification, "Notification"),
        }
        match self.entries.lock() {
            Ok(mut guard) => guard.push((level, notification)),
            Err(poisoned) => poisoned.into_inner().push((level, notification)),
        }
    }
}
