//! Bounded push-to-pull queue between the socket reader and blocking callers.

use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Create a connected sender/inbox pair holding at most `capacity` frames.
///
/// `handle` is the runtime the blocking reads park on.
///
/// # Panics
///
/// Panics if `capacity` is 0.
pub fn inbox(capacity: usize, handle: Handle) -> (InboxSender, Inbox) {
    let (tx, rx) = mpsc::channel(capacity);
    let weak_tx = tx.downgrade();
    (
        InboxSender { tx },
        Inbox {
            rx: Mutex::new(rx),
            weak_tx,
            closing: CancellationToken::new(),
            handle,
        },
    )
}

/// Producer side, owned by the socket reader task.
#[derive(Clone, Debug)]
pub struct InboxSender {
    tx: mpsc::Sender<Value>,
}

impl InboxSender {
    /// Enqueue a frame, waiting while the inbox is full.
    ///
    /// Fails with [`ClientError::Closed`] once the inbox has been closed.
    pub async fn deliver(&self, frame: Value) -> Result<(), ClientError> {
        self.tx.send(frame).await.map_err(|_| ClientError::Closed)
    }
}

/// Consumer side: blocking and timed FIFO reads.
///
/// The receiver lock is held for the whole of a blocking read, so readers
/// queue up behind each other.  [`close_and_drain`](Self::close_and_drain)
/// first cancels every waiting reader and only then takes the lock.
#[derive(Debug)]
pub struct Inbox {
    rx: Mutex<mpsc::Receiver<Value>>,
    // Weak handle on the producer side, used to count buffered frames
    // without contending with a blocked reader.
    weak_tx: mpsc::WeakSender<Value>,
    closing: CancellationToken,
    handle: Handle,
}

impl Inbox {
    /// Block until a frame is available and return the oldest one.
    ///
    /// Returns [`ClientError::Closed`] when every sender is gone and the
    /// queue is empty, or once the inbox has been closed.
    pub fn receive(&self) -> Result<Value, ClientError> {
        let mut rx = self.rx.lock();
        self.handle
            .block_on(async {
                tokio::select! {
                    biased;
                    _ = self.closing.cancelled() => None,
                    frame = rx.recv() => frame,
                }
            })
            .ok_or(ClientError::Closed)
    }

    /// Like [`receive`](Self::receive), but gives up after `timeout` and
    /// returns `Ok(None)`.  A zero timeout only checks what is buffered.
    pub fn receive_timeout(&self, timeout: Duration) -> Result<Option<Value>, ClientError> {
        let mut rx = self.rx.lock();
        self.handle.block_on(async {
            tokio::select! {
                biased;
                _ = self.closing.cancelled() => Err(ClientError::Closed),
                waited = tokio::time::timeout(timeout, rx.recv()) => match waited {
                    Ok(Some(frame)) => Ok(Some(frame)),
                    Ok(None) => Err(ClientError::Closed),
                    Err(_elapsed) => Ok(None),
                },
            }
        })
    }

    /// Frames currently buffered.  Never waits for a blocked reader.
    pub fn len(&self) -> usize {
        match self.weak_tx.upgrade() {
            Some(tx) => tx.max_capacity() - tx.capacity(),
            // Producer gone: a reader can only be parked here on an empty queue.
            None => self.rx.try_lock().map_or(0, |rx| rx.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.closing.is_cancelled()
    }

    /// Refuse further frames and discard the buffered ones.
    ///
    /// Readers blocked in [`receive`](Self::receive) return
    /// [`ClientError::Closed`], and a producer waiting for space is released
    /// with an error.  Returns the number of frames discarded.
    pub fn close_and_drain(&self) -> usize {
        self.closing.cancel();
        let mut rx = self.rx.lock();
        rx.close();
        let mut dropped = 0;
        while rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}
