//! snooze-timer — the debounce timer for snoozd.
//!
//! A cancellable one-shot delayed invocation with start/cancel/fire
//! semantics. A generation token invalidates stale fire callbacks
//! after a cancel/restart race: aborting the sleeping task alone
//! cannot guarantee a race-free cancel, the token check does.

pub mod timer;

pub use timer::{DebounceTimer, FireCallback};
