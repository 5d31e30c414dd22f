//! snooze-tracker — aggregate quiescence tracking.
//!
//! Holds the last-known desired replica count for every watched
//! workload and derives the single "all quiesced" boolean the engine
//! drives its timer from.
//!
//! # Architecture
//!
//! ```text
//! AggregateTracker
//!   ├── Observation per WatchRef (desired count, freshness)
//!   ├── refresh() → point lookup via ReplicaLookup for every ref
//!   └── RefreshOutcome { all_zero, changed }
//! ```
//!
//! A failed lookup retains the previous observation rather than
//! flipping the aggregate: one transient fetch error never cancels or
//! starts the grace timer.

pub mod lookup;
pub mod tracker;

pub use lookup::{LookupError, ReplicaLookup};
pub use tracker::{AggregateTracker, Observation, RefreshOutcome};
