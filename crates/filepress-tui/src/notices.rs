use std::collections::VecDeque;
use std::sync::Mutex;

use filepress_core::{Notice, NotificationSink};

/// Collects notices raised by the file manager until the UI drains them on
/// the next tick.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    queue: Mutex<VecDeque<Notice>>,
}

impl NoticeQueue {
    pub fn drain(&self) -> Vec<Notice> {
        match self.queue.lock() {
            Ok(mut q) => q.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }
}

impl NotificationSink for NoticeQueue {
    fn notify(&self, notice: Notice) {
        tracing::debug!(?notice, "notice");
        match self.queue.lock() {
            Ok(mut q) => q.push_back(notice),
            Err(poisoned) => poisoned.into_inner().push_back(notice),
        }
    }
}
