//! Aggregate tracker — derives "all quiesced" from per-workload observations.

use std::collections::HashMap;

use tracing::{debug, warn};

use snooze_core::{WatchRef, WatchSet};

use crate::lookup::ReplicaLookup;

/// Last-known state of a single watched workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Desired replica count; `None` means unspecified, which counts
    /// toward quiescence.
    pub desired: Option<u32>,
    /// Whether the most recent lookup for this ref succeeded. A stale
    /// observation keeps its last good `desired` value.
    pub fresh: bool,
}

impl Observation {
    fn is_active(&self) -> bool {
        matches!(self.desired, Some(n) if n > 0)
    }
}

/// Result of a full refresh over the watch set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// True iff every watched workload's best-known desired count is
    /// absent or zero.
    pub all_zero: bool,
    /// True iff `all_zero` differs from the previous refresh. The
    /// engine drives timer transitions off this, not off raw
    /// notifications, since several notifications can report the same
    /// underlying transition.
    pub changed: bool,
}

/// Tracks per-workload observations and the aggregate all-zero flag.
///
/// Owned by the reconcile engine; all access is serialized behind the
/// engine's reconciliation lock.
pub struct AggregateTracker {
    watch_set: WatchSet,
    /// Lazily populated: a ref appears after its first successful
    /// lookup and is never removed while the process runs.
    observations: HashMap<WatchRef, Observation>,
    all_zero: bool,
}

impl AggregateTracker {
    pub fn new(watch_set: WatchSet) -> Self {
        Self {
            watch_set,
            observations: HashMap::new(),
            all_zero: false,
        }
    }

    /// Re-fetch every watched workload and recompute the aggregate.
    ///
    /// A failed lookup is logged and the previous observation retained
    /// (marked stale); the refresh always evaluates the full set — one
    /// failure never aborts the cycle or flips the aggregate.
    pub async fn refresh<L: ReplicaLookup>(&mut self, lookup: &L) -> RefreshOutcome {
        let mut all_zero = true;

        for watch in self.watch_set.iter() {
            match lookup.desired_replicas(watch).await {
                Ok(desired) => {
                    self.observations.insert(
                        watch.clone(),
                        Observation {
                            desired,
                            fresh: true,
                        },
                    );
                }
                Err(e) => {
                    warn!(watch = %watch, error = %e, "lookup failed, keeping previous observation");
                    if let Some(obs) = self.observations.get_mut(watch) {
                        obs.fresh = false;
                    }
                    // Never observed successfully: contributes "absent".
                }
            }

            if let Some(obs) = self.observations.get(watch)
                && obs.is_active()
            {
                all_zero = false;
            }
        }

        let changed = all_zero != self.all_zero;
        self.all_zero = all_zero;
        debug!(all_zero, changed, "aggregate refreshed");
        RefreshOutcome { all_zero, changed }
    }

    /// The aggregate as of the last refresh. Starts out `false`, so the
    /// first refresh of an already-quiesced watch set reports a change.
    pub fn all_zero(&self) -> bool {
        self.all_zero
    }

    pub fn observation(&self, watch: &WatchRef) -> Option<&Observation> {
        self.observations.get(watch)
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use snooze_core::{WatchRef, WatchSet};

    use super::*;
    use crate::lookup::LookupError;

    /// Scriptable lookup: `Ok` entries are observed counts, `Err(())`
    /// entries simulate transient failures, missing entries are absent
    /// desired counts.
    struct StubLookup {
        counts: Mutex<HashMap<WatchRef, Result<Option<u32>, ()>>>,
    }

    impl StubLookup {
        fn new() -> Self {
            Self {
                counts: Mutex::new(HashMap::new()),
            }
        }

        fn set(&self, watch: &WatchRef, desired: Option<u32>) {
            self.counts
                .lock()
                .unwrap()
                .insert(watch.clone(), Ok(desired));
        }

        fn fail(&self, watch: &WatchRef) {
            self.counts.lock().unwrap().insert(watch.clone(), Err(()));
        }
    }

    impl ReplicaLookup for StubLookup {
        async fn desired_replicas(
            &self,
            watch: &WatchRef,
        ) -> Result<Option<u32>, LookupError> {
            match self.counts.lock().unwrap().get(watch) {
                Some(Ok(desired)) => Ok(*desired),
                Some(Err(())) => Err(LookupError::Fetch {
                    watch: watch.clone(),
                    reason: "injected".to_string(),
                }),
                None => Ok(None),
            }
        }
    }

    fn test_set() -> (WatchSet, WatchRef, WatchRef) {
        let a = WatchRef::new("a", "b");
        let b = WatchRef::new("c", "d");
        let set = WatchSet::from_refs([a.clone(), b.clone()]).unwrap();
        (set, a, b)
    }

    #[tokio::test]
    async fn all_zero_when_every_count_is_zero_or_absent() {
        let (set, a, _b) = test_set();
        let lookup = StubLookup::new();
        lookup.set(&a, Some(0));
        // c/d left absent.

        let mut tracker = AggregateTracker::new(set);
        let outcome = tracker.refresh(&lookup).await;
        assert!(outcome.all_zero);
        assert!(outcome.changed);
    }

    #[tokio::test]
    async fn positive_count_makes_aggregate_false() {
        let (set, a, b) = test_set();
        let lookup = StubLookup::new();
        lookup.set(&a, Some(0));
        lookup.set(&b, Some(3));

        let mut tracker = AggregateTracker::new(set);
        let outcome = tracker.refresh(&lookup).await;
        assert!(!outcome.all_zero);
        // Initial aggregate is false, so this is not a change.
        assert!(!outcome.changed);
    }

    #[tokio::test]
    async fn changed_tracks_transitions_not_notifications() {
        let (set, a, b) = test_set();
        let lookup = StubLookup::new();
        lookup.set(&a, Some(0));
        lookup.set(&b, Some(0));

        let mut tracker = AggregateTracker::new(set);
        assert!(tracker.refresh(&lookup).await.changed);
        // Same underlying state replayed: no change.
        assert!(!tracker.refresh(&lookup).await.changed);

        lookup.set(&b, Some(2));
        let outcome = tracker.refresh(&lookup).await;
        assert!(!outcome.all_zero);
        assert!(outcome.changed);
    }

    #[tokio::test]
    async fn failed_lookup_retains_previous_observation() {
        let (set, a, b) = test_set();
        let lookup = StubLookup::new();
        lookup.set(&a, Some(0));
        lookup.set(&b, Some(0));

        let mut tracker = AggregateTracker::new(set);
        assert!(tracker.refresh(&lookup).await.all_zero);

        // a/b fails transiently; its last good value (zero) is kept.
        lookup.fail(&a);
        let outcome = tracker.refresh(&lookup).await;
        assert!(outcome.all_zero);
        assert!(!outcome.changed);

        let obs = tracker.observation(&a).unwrap();
        assert_eq!(obs.desired, Some(0));
        assert!(!obs.fresh);
    }

    #[tokio::test]
    async fn failed_lookup_retains_positive_observation() {
        let (set, a, b) = test_set();
        let lookup = StubLookup::new();
        lookup.set(&a, Some(4));
        lookup.set(&b, Some(0));

        let mut tracker = AggregateTracker::new(set);
        assert!(!tracker.refresh(&lookup).await.all_zero);

        // a/b fails while still believed active: aggregate stays false.
        lookup.fail(&a);
        assert!(!tracker.refresh(&lookup).await.all_zero);
    }

    #[tokio::test]
    async fn never_observed_ref_counts_toward_quiescence() {
        let (set, a, b) = test_set();
        let lookup = StubLookup::new();
        lookup.fail(&a);
        lookup.set(&b, Some(0));

        let mut tracker = AggregateTracker::new(set);
        let outcome = tracker.refresh(&lookup).await;
        assert!(outcome.all_zero);
        assert!(tracker.observation(&a).is_none());
    }

    #[tokio::test]
    async fn recovery_after_stale_observation() {
        let (set, a, b) = test_set();
        let lookup = StubLookup::new();
        lookup.set(&a, Some(0));
        lookup.set(&b, Some(0));

        let mut tracker = AggregateTracker::new(set);
        tracker.refresh(&lookup).await;

        lookup.fail(&a);
        tracker.refresh(&lookup).await;
        assert!(!tracker.observation(&a).unwrap().fresh);

        lookup.set(&a, Some(2));
        let outcome = tracker.refresh(&lookup).await;
        assert!(!outcome.all_zero);
        assert!(outcome.changed);
        assert!(tracker.observation(&a).unwrap().fresh);
    }
}
