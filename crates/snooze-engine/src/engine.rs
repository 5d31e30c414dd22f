//! Reconcile engine — drives timer transitions from aggregate changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use snooze_core::{WatchRef, WatchSet};
use snooze_timer::{DebounceTimer, FireCallback};
use snooze_tracker::{AggregateTracker, ReplicaLookup};

use crate::action::ActionTrigger;

/// Orchestrates notifications, the aggregate tracker, and the timer.
///
/// All tracker state is behind one mutex, so reconciliation cycles are
/// serialized even when notifications interleave; the timer's fire
/// task synchronizes through its own generation token and never blocks
/// a reconcile.
pub struct ReconcileEngine<L, A> {
    watch_set: WatchSet,
    tracker: Mutex<AggregateTracker>,
    timer: DebounceTimer,
    lookup: Arc<L>,
    action: Arc<A>,
    grace_period: Duration,
}

impl<L, A> ReconcileEngine<L, A>
where
    L: ReplicaLookup + 'static,
    A: ActionTrigger + 'static,
{
    pub fn new(
        watch_set: WatchSet,
        lookup: Arc<L>,
        action: Arc<A>,
        grace_period: Duration,
    ) -> Self {
        Self {
            tracker: Mutex::new(AggregateTracker::new(watch_set.clone())),
            watch_set,
            timer: DebounceTimer::new(),
            lookup,
            action,
            grace_period,
        }
    }

    /// Handle a change notification for a single object.
    ///
    /// Objects outside the watch set are ignored — the notification
    /// collaborator may deliver unrelated objects. A watched object
    /// triggers a refresh over the *entire* set, since the aggregate
    /// depends on every member.
    pub async fn on_change(&self, watch: &WatchRef) {
        if !self.watch_set.contains(watch) {
            debug!(watch = %watch, "ignoring notification for unwatched object");
            return;
        }
        debug!(watch = %watch, "change notification");
        self.reconcile().await;
    }

    /// Full refresh with no triggering identifier (periodic resync).
    pub async fn resync(&self) {
        self.reconcile().await;
    }

    async fn reconcile(&self) {
        // The tracker lock is held across the refresh AND the timer
        // transition: releasing it in between would let two direct
        // concurrent on_change calls interleave refresh → cancel →
        // start and leave a timer armed while a workload is active.
        let mut tracker = self.tracker.lock().await;
        let outcome = tracker.refresh(self.lookup.as_ref()).await;

        // Timer transitions happen only on aggregate edges; replaying
        // a notification with unchanged state is a no-op.
        if !outcome.changed {
            return;
        }

        if outcome.all_zero {
            info!(
                grace_secs = self.grace_period.as_secs(),
                "all watched workloads quiesced, starting grace timer"
            );
            self.timer.start(self.grace_period, self.fire_callback()).await;
        } else {
            info!("watched workload active again");
            if self.timer.cancel().await {
                info!("grace timer cancelled");
            }
        }
    }

    fn fire_callback(&self) -> FireCallback {
        let action = Arc::clone(&self.action);
        Arc::new(move || {
            let action = Arc::clone(&action);
            Box::pin(async move {
                info!("grace period elapsed, triggering quiesce action");
                if let Err(e) = action.execute().await {
                    error!(error = %e, "quiesce action failed");
                }
            })
        })
    }

    /// Whether the grace timer is currently armed.
    pub async fn timer_pending(&self) -> bool {
        self.timer.is_pending().await
    }

    /// The aggregate as of the last reconcile.
    pub async fn all_zero(&self) -> bool {
        self.tracker.lock().await.all_zero()
    }

    /// Serialized reconciliation loop.
    ///
    /// Consumes change notifications one at a time and performs a full
    /// resync on a fixed interval (the first tick fires immediately,
    /// giving the startup refresh). Returns on shutdown or when the
    /// notification stream closes; a pending timer is disarmed on the
    /// way out so no suspend fires mid-shutdown.
    pub async fn run(
        &self,
        mut notifications: mpsc::Receiver<WatchRef>,
        resync_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            watches = self.watch_set.len(),
            resync_secs = resync_interval.as_secs(),
            "reconcile engine started"
        );

        let mut resync = tokio::time::interval(resync_interval);
        resync.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                notification = notifications.recv() => {
                    match notification {
                        Some(watch) => self.on_change(&watch).await,
                        None => {
                            info!("notification stream closed");
                            break;
                        }
                    }
                }
                _ = resync.tick() => self.resync().await,
                _ = shutdown.changed() => {
                    info!("reconcile engine shutting down");
                    break;
                }
            }
        }

        self.timer.cancel().await;
    }
}
