use std::cell::Cell;

///
/// ModificationCounter
///
/// A monotonic generation counter attached to one view and shared by
/// reference with every index opened from it. It is bumped exactly once per
/// successful structural mutation, through any of those indices, which makes
/// all of a view's indices one consistency domain: cursors capture
/// [`current`](Self::current) at creation and die on the first mismatch.
///

#[derive(Debug, Default)]
pub struct ModificationCounter {
    count: Cell<u64>,
}

impl ModificationCounter {
    pub(crate) const fn new() -> Self {
        Self {
            count: Cell::new(0),
        }
    }

    /// Record one successful structural mutation.
    pub(crate) fn notify_modified(&self) {
        self.count.set(self.count.get().saturating_add(1));
    }

    #[must_use]
    pub fn current(&self) -> u64 {
        self.count.get()
    }
}

///
/// TESTS
///
