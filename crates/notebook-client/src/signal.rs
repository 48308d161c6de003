//! One-shot "connection closed" notification.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Fires exactly once, when the underlying connection reports closed.
///
/// Any number of waiters may block on it; firing again is a no-op.
#[derive(Clone, Debug, Default)]
pub struct ClosedSignal {
    token: CancellationToken,
}

impl ClosedSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.token.cancel();
    }

    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired.
    pub async fn fired(&self) {
        self.token.cancelled().await;
    }

    /// Block on `handle` until the signal fires or `timeout` elapses.
    /// `None` waits indefinitely.  Returns whether the signal fired.
    pub fn wait(&self, handle: &Handle, timeout: Option<Duration>) -> bool {
        match timeout {
            Some(d) => handle.block_on(async { tokio::time::timeout(d, self.fired()).await.is_ok() }),
            None => {
                handle.block_on(self.fired());
                true
            }
        }
    }
}
