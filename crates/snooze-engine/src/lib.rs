//! snooze-engine — orchestrates the quiescence state machine.
//!
//! On every change notification the engine re-fetches the entire watch
//! set through the lookup collaborator, recomputes the aggregate, and
//! drives the debounce timer:
//!
//! ```text
//! notification → on_change(watch)
//!   ├── not in watch set → ignore
//!   └── tracker.refresh()
//!         ├── changed && all_zero  → timer.start(grace)
//!         ├── changed && !all_zero → timer.cancel()
//!         └── !changed             → no-op
//! (grace elapses) → timer fires → ActionTrigger::execute()
//! ```
//!
//! The action fires at most once per contiguous quiescence episode; a
//! later episode can fire it again.

pub mod action;
pub mod engine;

pub use action::{ActionTrigger, SuspendAction};
pub use engine::ReconcileEngine;
