//! Cancellable delayed actions.
//!
//! A [`DeferredTask`] sleeps for a delay and then runs its action, unless
//! [`cancel`](DeferredTask::cancel) wins first. A three-state latch decides the
//! race: exactly one of "fire" and "cancel" succeeds, so a successful cancel
//! guarantees the action never starts, and a fired action always runs to the
//! end.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Still waiting for the delay to elapse.
    Pending,
    /// The delay elapsed and the action started.
    Fired,
    /// Cancelled before firing.
    Cancelled,
}

/// Handle to a scheduled action. Dropping the handle does not cancel it.
#[derive(Debug)]
pub struct DeferredTask {
    cancel: CancellationToken,
    latch: Arc<AtomicU8>,
}

impl DeferredTask {
    /// Run `action` after `delay` on the current tokio runtime.
    pub fn spawn<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let latch = Arc::new(AtomicU8::new(PENDING));

        let task_cancel = cancel.clone();
        let task_latch = latch.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = task_cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if task_latch
                        .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        action().await;
                    }
                }
            }
        });

        Self { cancel, latch }
    }

    /// Cancel the action. Returns `true` if it will never run, `false` if it
    /// already fired (or was cancelled before).
    pub fn cancel(&self) -> bool {
        let won = self
            .latch
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.cancel.cancel();
        }
        won
    }

    #[cfg(test)]
    pub fn state(&self) -> TaskState {
        match self.latch.load(Ordering::Acquire) {
            PENDING => TaskState::Pending,
            FIRED => TaskState::Fired,
            _ => TaskState::Cancelled,
        }
    }
}
