//! Database facade: the entry point that hands out scoped snapshots and
//! forks over the engine's committed state.

pub mod counter;
pub mod view;

pub use counter::ModificationCounter;
pub use view::{View, ViewKind};

use crate::{
    engine,
    error::{AccessError, Error},
    proxy::{Cleaner, NativeHandle, ProxyError},
};
use std::rc::Rc;

///
/// Database
///
/// Owns the committed state in the engine. Snapshots and forks opened from
/// it register their disposers with the scope the caller passes in; opening
/// the database itself in an outer scope (and views in the same or a nested
/// scope created afterwards) is what guarantees children are destroyed
/// before their parents on unwind.
///

pub struct Database {
    handle: Rc<NativeHandle>,
}

impl Database {
    /// Create a database inside a disposal scope.
    pub fn open(scope: &Cleaner) -> Result<Rc<Self>, Error> {
        if scope.is_closed() {
            return Err(ProxyError::ClosedScope.into());
        }

        let handle = Rc::new(NativeHandle::new(engine::create_database()));
        let registered = Rc::clone(&handle);
        scope.register(move || {
            let raw = registered.get()?;
            registered.invalidate();
            engine::destroy_database(raw)?;
            Ok(())
        })?;

        Ok(Rc::new(Self { handle }))
    }

    /// Open an immutable point-in-time view of the committed state.
    pub fn snapshot(&self, scope: &Cleaner) -> Result<Rc<View>, Error> {
        View::open(self.handle.get()?, ViewKind::Snapshot, scope)
    }

    /// Open a mutable view accumulating pending changes.
    pub fn fork(&self, scope: &Cleaner) -> Result<Rc<View>, Error> {
        View::open(self.handle.get()?, ViewKind::Fork, scope)
    }

    /// Publish a fork's pending state as the new committed state, as one
    /// unit. The fork stays open until its scope closes; snapshots taken
    /// before the merge keep their point-in-time state.
    pub fn merge(&self, fork: &View) -> Result<(), Error> {
        if !fork.can_modify() {
            return Err(AccessError::ReadOnly { kind: fork.kind() }.into());
        }
        engine::merge(self.handle.get()?, fork.handle().get()?)?;
        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MapIndex;

    #[test]
    fn snapshot_of_empty_database_reads_nothing() {
        let scope = Cleaner::new();
        let db = Database::open(&scope).unwrap();
        let snapshot = db.snapshot(&scope).unwrap();
        let map = MapIndex::open("items", &snapshot, &scope).unwrap();

        assert_eq!(map.get(b"anything").unwrap(), None);
        assert_eq!(map.get(b"").unwrap(), None);
        scope.close().unwrap();
    }

    #[test]
    fn merge_publishes_fork_state_to_later_snapshots_only() {
        let scope = Cleaner::new();
        let db = Database::open(&scope).unwrap();

        let before = db.snapshot(&scope).unwrap();
        let fork = db.fork(&scope).unwrap();
        let map = MapIndex::open("items", &fork, &scope).unwrap();
        map.put(b"k", b"v").unwrap();
        db.merge(&fork).unwrap();

        let after = db.snapshot(&scope).unwrap();
        let seen_after = MapIndex::open("items", &after, &scope).unwrap();
        assert_eq!(seen_after.get(b"k").unwrap(), Some(b"v".to_vec()));

        let seen_before = MapIndex::open("items", &before, &scope).unwrap();
        assert_eq!(seen_before.get(b"k").unwrap(), None);

        scope.close().unwrap();
    }

    #[test]
    fn merge_rejects_a_snapshot() {
        let scope = Cleaner::new();
        let db = Database::open(&scope).unwrap();
        let snapshot = db.snapshot(&scope).unwrap();

        let err = db.merge(&snapshot).unwrap_err();
        assert!(err.is_read_only());
        scope.close().unwrap();
    }

    #[test]
    fn operations_after_scope_close_fail_invalid_handle() {
        let scope = Cleaner::new();
        let db = Database::open(&scope).unwrap();
        scope.close().unwrap();

        let late = Cleaner::new();
        let err = db.snapshot(&late).unwrap_err();
        assert!(err.is_invalid_handle());
        late.close().unwrap();
    }

    #[test]
    fn cascade_close_releases_every_engine_slot() {
        let (dbs, views, cols) = engine::live_slots();

        let scope = Cleaner::new();
        let db = Database::open(&scope).unwrap();
        let inner = scope.child().unwrap();
        let fork = db.fork(&inner).unwrap();
        let _a = MapIndex::open("a", &fork, &inner).unwrap();
        let _b = MapIndex::open("b", &fork, &inner).unwrap();
        let snapshot = db.snapshot(&inner).unwrap();
        let _c = MapIndex::open("c", &snapshot, &inner).unwrap();

        scope.close().unwrap();

        assert_eq!(engine::live_slots(), (dbs, views, cols));
    }

    #[test]
    fn closing_a_view_scope_under_live_indices_surfaces_order_violation() {
        let outer = Cleaner::new();
        let db = Database::open(&outer).unwrap();

        // Misuse: the index outlives the scope that owns its view.
        let view_scope = Cleaner::new();
        let index_scope = Cleaner::new();
        let fork = db.fork(&view_scope).unwrap();
        let map = MapIndex::open("items", &fork, &index_scope).unwrap();

        let err = view_scope.close().unwrap_err();
        match err {
            ProxyError::Cleanup { failures } => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(
                    failures[0],
                    Error::Proxy(ProxyError::OrderViolation { live: 1 })
                ));
            }
            other => panic!("expected aggregate cleanup error, got: {other}"),
        }

        // The index is still operational: its view was leaked, not freed.
        map.put(b"k", b"v").unwrap();
        index_scope.close().unwrap();
        outer.close().unwrap();
    }
}
