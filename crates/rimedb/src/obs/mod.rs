//! Observability: ephemeral runtime counters behind an event sink.
//!
//! Core modules never touch counter state directly; every signal flows
//! through [`ObsEvent`] and [`record`]. Counters are thread-local and
//! in-memory only.

mod metrics;
mod sink;

pub use metrics::{EventState, report, reset};
pub use sink::{ObsEvent, record};
