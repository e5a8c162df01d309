use crate::{
    db::counter::ModificationCounter,
    engine::{self, RawHandle},
    error::Error,
    obs::{self, ObsEvent},
    proxy::{Cleaner, NativeHandle, ProxyError},
};
use std::{cell::Cell, fmt, rc::Rc};

///
/// ViewKind
///
/// The closed set of view variants. Not open for extension: every access
/// rule in the runtime is decided by this tag alone.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViewKind {
    /// Immutable, point-in-time read access over already-committed state.
    Snapshot,
    /// Mutable view accumulating pending changes, mergeable as one unit.
    Fork,
}

impl ViewKind {
    #[must_use]
    pub const fn can_modify(self) -> bool {
        matches!(self, Self::Fork)
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Snapshot => "snapshot",
            Self::Fork => "fork",
        };
        write!(f, "{label}")
    }
}

///
/// View
///
/// A read access point over a point-in-time state. Owns exactly one native
/// handle and one modification counter.
///
/// Teardown ordering is structural: the view's disposer must be registered
/// before any derived index's disposer, so LIFO close destroys the indices
/// first. The live-index count below does not enforce that order; it only
/// turns a violation into a loud [`ProxyError::OrderViolation`] instead of
/// a dangling-memory access.
///

#[derive(Debug)]
pub struct View {
    kind: ViewKind,
    handle: Rc<NativeHandle>,
    counter: Rc<ModificationCounter>,
    live_indexes: Cell<usize>,
}

impl View {
    /// Open a view of the given kind inside a disposal scope.
    pub(crate) fn open(
        db: RawHandle,
        kind: ViewKind,
        scope: &Cleaner,
    ) -> Result<Rc<Self>, Error> {
        if scope.is_closed() {
            return Err(ProxyError::ClosedScope.into());
        }

        let raw = engine::create_view(db, kind)?;
        let view = Rc::new(Self {
            kind,
            handle: Rc::new(NativeHandle::new(raw)),
            counter: Rc::new(ModificationCounter::new()),
            live_indexes: Cell::new(0),
        });

        let registered = Rc::clone(&view);
        scope.register(move || registered.dispose())?;
        obs::record(ObsEvent::ViewOpened { kind });

        Ok(view)
    }

    fn dispose(&self) -> Result<(), Error> {
        let live = self.live_indexes.get();
        if live > 0 {
            // Freeing the native view under a live index would hand that
            // index dangling memory; leak the view and surface the misuse.
            return Err(ProxyError::OrderViolation { live }.into());
        }

        let raw = self.handle.get()?;
        self.handle.invalidate();
        engine::destroy_view(raw)?;
        Ok(())
    }

    #[must_use]
    pub const fn kind(&self) -> ViewKind {
        self.kind
    }

    #[must_use]
    pub fn can_modify(&self) -> bool {
        self.kind.can_modify()
    }

    /// Current value of this view's modification counter.
    #[must_use]
    pub fn modification_count(&self) -> u64 {
        self.counter.current()
    }

    pub(crate) fn counter(&self) -> Rc<ModificationCounter> {
        Rc::clone(&self.counter)
    }

    pub(crate) fn handle(&self) -> &NativeHandle {
        &self.handle
    }

    pub(crate) fn retain_index(&self) {
        self.live_indexes.set(self.live_indexes.get() + 1);
    }

    pub(crate) fn release_index(&self) {
        self.live_indexes.set(self.live_indexes.get().saturating_sub(1));
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} view", self.kind)
    }
}

///
/// TESTS
///
