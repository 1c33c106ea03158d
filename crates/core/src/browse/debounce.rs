//! Trailing-edge debouncer.
//!
//! Coalesces rapid `schedule` calls into one invocation of the wrapped
//! action, carrying the last input, once the input has been quiet for the
//! configured window.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

type Action<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

struct Pending {
    generation: u64,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    pending: Option<Pending>,
}

/// Debounced wrapper around an async action.
///
/// The action always runs on a spawned task, never inside `schedule`.
/// `schedule` must be called from within a Tokio runtime.
pub struct Debouncer<T> {
    wait: Duration,
    action: Action<T>,
    slot: Arc<Mutex<Slot>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(wait: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            wait,
            action: Arc::new(move |input: T| -> BoxFuture<'static, ()> {
                Box::pin(action(input))
            }),
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Schedule the action with `input`, replacing any pending invocation.
    pub fn schedule(&self, input: T) {
        let mut slot = self.slot.lock().unwrap();
        if let Some(pending) = slot.pending.take() {
            pending.timer.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;

        let wait = self.wait;
        let action = Arc::clone(&self.action);
        let shared = Arc::clone(&self.slot);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(wait).await;

            // Claim the slot; a newer schedule or a cancel wins.
            {
                let mut slot = shared.lock().unwrap();
                match &slot.pending {
                    Some(p) if p.generation == generation => slot.pending = None,
                    _ => return,
                }
            }

            // Detached so a later abort of this timer cannot cut the action short.
            tokio::spawn(action(input));
        });

        slot.pending = Some(Pending { generation, timer });
    }

    /// Whether an invocation is waiting for its quiet period to end.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().unwrap().pending.is_some()
    }

    /// Drop the pending invocation, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = self.slot.lock().unwrap();
        match slot.pending.take() {
            Some(pending) => {
                pending.timer.abort();
                true
            }
            None => false,
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            if let Some(pending) = slot.pending.take() {
                pending.timer.abort();
            }
        }
    }
}
