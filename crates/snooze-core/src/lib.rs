//! snooze-core — shared types for snoozd.
//!
//! Provides the watched-workload identifier (`WatchRef`), the immutable
//! `WatchSet` parsed once at startup, and the grace-period duration
//! grammar. Everything here is plain data: the reconcile machinery
//! lives in the tracker/timer/engine crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{DEFAULT_GRACE_PERIOD, grace_period, parse_duration};
pub use error::{ConfigError, ConfigResult};
pub use types::{WatchRef, WatchSet};
