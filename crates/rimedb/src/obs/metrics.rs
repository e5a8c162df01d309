use std::cell::RefCell;

///
/// EventState
/// Ephemeral, in-memory counters for runtime operations.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventState {
    pub snapshots_opened: u64,
    pub forks_opened: u64,
    pub indexes_opened: u64,
    pub writes: u64,
    pub removes: u64,
    pub clears: u64,
    pub iterations_invalidated: u64,
    pub cleanup_failures: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow counters immutably.
fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow counters mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub fn reset() {
    with_state_mut(|m| *m = EventState::default());
}

/// Point-in-time copy of the counters.
#[must_use]
pub fn report() -> EventState {
    with_state(Clone::clone)
}

///
/// TESTS
///
