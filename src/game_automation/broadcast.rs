//! Single-slot frame broadcast.
//!
//! Every `wait` call registers a delivery slot at call time. `publish` drains all
//! registered slots and hands each the same value; nothing is buffered, so a caller
//! that registers after a publish only ever sees the next one. `complete` closes the
//! channel for good and releases every queued waiter with [`WaitError::Completed`].

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("wait cancelled")]
    Cancelled,
    #[error("broadcast completed")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("publish on a completed broadcast")]
pub struct PublishError;

struct Slot<T> {
    waiters: Vec<oneshot::Sender<T>>,
    completed: bool,
}

/// Cloning yields another handle to the same channel.
pub struct Broadcast<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Broadcast<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                waiters: Vec::new(),
                completed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // Nothing panics while holding the lock, a poisoned slot is still consistent
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Deliver `value` to every waiter registered so far.
    pub fn publish(&self, value: T) -> Result<(), PublishError> {
        let waiters = {
            let mut slot = self.lock();
            if slot.completed {
                return Err(PublishError);
            }
            std::mem::take(&mut slot.waiters)
        };
        for waiter in waiters {
            // Receiver gone means the waiter was cancelled or dropped
            let _ = waiter.send(value.clone());
        }
        Ok(())
    }

    /// Register for the next publish. Registration happens when this is called,
    /// not when the returned future is first polled.
    pub fn wait(
        &self,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<T, WaitError>> + Send + 'static {
        let registered = {
            let mut slot = self.lock();
            if slot.completed {
                None
            } else {
                let (tx, rx) = oneshot::channel();
                slot.waiters.push(tx);
                Some(rx)
            }
        };
        let token = token.clone();

        async move {
            let Some(rx) = registered else {
                return Err(WaitError::Completed);
            };
            tokio::select! {
                biased;
                delivered = rx => delivered.map_err(|_| WaitError::Completed),
                _ = token.cancelled() => Err(WaitError::Cancelled),
            }
        }
    }

    /// Close the channel. Calling it again has no further effect.
    pub fn complete(&self) {
        let waiters = {
            let mut slot = self.lock();
            slot.completed = true;
            std::mem::take(&mut slot.waiters)
        };
        // Dropping the senders wakes each receiver with an error
        drop(waiters);
    }

    pub fn is_completed(&self) -> bool {
        self.lock().completed
    }

    #[cfg(test)]
    fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }
}
