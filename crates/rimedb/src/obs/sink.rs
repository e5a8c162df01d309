use crate::{db::view::ViewKind, obs::metrics};

///
/// ObsEvent
///
/// One observable runtime event. The variants mirror the operations the
/// runtime exposes, not the engine's internals.
///

#[derive(Clone, Copy, Debug)]
pub enum ObsEvent {
    ViewOpened { kind: ViewKind },
    IndexOpened,
    Write,
    Remove,
    Clear,
    IterationInvalidated,
    CleanupFailure,
}

/// Record one runtime event into the thread-local counters.
pub fn record(event: ObsEvent) {
    metrics::with_state_mut(|m| {
        let slot = match event {
            ObsEvent::ViewOpened {
                kind: ViewKind::Snapshot,
            } => &mut m.snapshots_opened,
            ObsEvent::ViewOpened {
                kind: ViewKind::Fork,
            } => &mut m.forks_opened,
            ObsEvent::IndexOpened => &mut m.indexes_opened,
            ObsEvent::Write => &mut m.writes,
            ObsEvent::Remove => &mut m.removes,
            ObsEvent::Clear => &mut m.clears,
            ObsEvent::IterationInvalidated => &mut m.iterations_invalidated,
            ObsEvent::CleanupFailure => &mut m.cleanup_failures,
        };
        *slot = slot.saturating_add(1);
    });
}
