//! One-shot debounce timer with generation-token cancellation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Callback invoked when the timer fires.
pub type FireCallback = Arc<dyn Fn() -> BoxFuture + Send + Sync>;

type BoxFuture = std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>;

struct TimerInner {
    /// Bumped on every cancel; a sleeping fire task re-checks its
    /// captured value before invoking the callback, so a fire that
    /// lost the race to a cancel has no effect.
    generation: u64,
    /// The currently armed sleep task, if any. At most one exists.
    pending: Option<JoinHandle<()>>,
}

/// A cancellable one-shot timer.
///
/// `start` arms a background sleep task; `cancel` disarms it. After a
/// fire the timer returns to idle so a later quiescence episode can
/// re-arm it. Clone to share across tasks.
#[derive(Clone)]
pub struct DebounceTimer {
    inner: Arc<Mutex<TimerInner>>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TimerInner {
                generation: 0,
                pending: None,
            })),
        }
    }

    /// Arm the timer. No-op (returns false) if already pending: an
    /// armed timer is never re-armed, its original deadline stands.
    pub async fn start(&self, duration: Duration, callback: FireCallback) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.pending.is_some() {
            debug!("timer already pending, not re-arming");
            return false;
        }

        let generation = inner.generation;
        let slot = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            {
                let mut inner = slot.lock().await;
                if inner.generation != generation {
                    debug!(generation, "stale fire suppressed");
                    return;
                }
                // Commit the fire: back to idle so a later episode
                // can arm a fresh timer.
                inner.pending = None;
            }
            // Invoke outside the lock; the callback may start a new timer.
            callback().await;
        });
        inner.pending = Some(handle);

        info!(
            duration_secs = duration.as_secs(),
            generation, "debounce timer started"
        );
        true
    }

    /// Disarm a pending timer. No-op (returns false) when idle.
    ///
    /// After this returns, the cancelled generation's fire is
    /// guaranteed not to invoke its callback, even if the sleep task
    /// had already woken: the generation bump fails its token check.
    pub async fn cancel(&self) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.pending.take() {
            Some(handle) => {
                inner.generation += 1;
                handle.abort();
                info!(generation = inner.generation, "debounce timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether a timer is currently armed.
    pub async fn is_pending(&self) -> bool {
        self.inner.lock().await.pending.is_some()
    }
}

impl Default for DebounceTimer {
    fn default() -> Self {
        Self::new()
    }
}
