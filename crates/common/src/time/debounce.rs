//! Trailing-edge debouncer
//!
//! Collapses a burst of triggers into a single action: every call restarts
//! the window, and only the last call's action runs once the window elapses
//! with no further calls.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

/// Trailing-edge debouncer over the tokio timer.
///
/// Each [`call`](Self::call) bumps a generation counter and spawns a task
/// that sleeps for the window; the task only runs its action if no newer
/// call has bumped the counter in the meantime. Cheap to clone; clones share
/// the same window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, generation: Arc::new(AtomicU64::new(0)) }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `action` to run after the window, superseding any action
    /// scheduled by an earlier call that has not fired yet.
    pub fn call<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.generation);
        let window = self.window;

        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if latest.load(Ordering::SeqCst) == generation {
                action().await;
            } else {
                trace!(generation, "debounced action superseded");
            }
        });
    }

    /// Drop any action still waiting on its window.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
