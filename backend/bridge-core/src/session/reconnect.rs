//! Fixed-delay, unbounded retry of the open sequence.

use std::future::Future;
use std::time::Duration;

use log::{debug, trace};
use tokio::task::JoinHandle;
use tokio::time::sleep as TokioSleep;

/// Owns the session's single retry timer.
///
/// A timer counts as outstanding from `schedule` until the session reports it
/// with [`ReconnectPolicy::fired`] or drops it with [`ReconnectPolicy::cancel`].
pub(crate) struct ReconnectPolicy {
    delay: Duration,
    timer: Option<JoinHandle<()>>,
}

impl ReconnectPolicy {
    pub(crate) fn new(delay: Duration) -> Self {
        Self { delay, timer: None }
    }

    /// Run `on_fire` after the retry delay unless a timer is already outstanding.
    ///
    /// Returns `true` if a new timer was armed.
    pub(crate) fn schedule<F>(&mut self, on_fire: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.timer.is_some() {
            trace!("Retry already scheduled");
            return false;
        }

        let delay = self.delay;
        debug!("Retrying connection in {delay:?}");
        self.timer = Some(tokio::spawn(async move {
            TokioSleep(delay).await;
            on_fire.await;
        }));
        true
    }

    /// Mark the outstanding timer as consumed.
    pub(crate) fn fired(&mut self) {
        self.timer = None;
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!("Cancelled pending reconnect");
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.timer.is_some()
    }

    pub(crate) fn delay(&self) -> Duration {
        self.delay
    }
}
