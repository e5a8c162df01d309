//! Thread-local stand-in for the native storage engine.
//!
//! Every engine-owned object (database, view, collection) lives in one
//! arena keyed by raw handles. The runtime layer above never touches the
//! arena directly; it goes through the operations at the bottom of this
//! file, which is exactly the surface a real engine would expose.
//!
//! Tree layout, proofs, and codecs are not modeled here; collections are
//! plain ordered byte maps.

use crate::db::view::ViewKind;
use derive_more::{Deref, DerefMut};
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    ops::Bound,
};
use thiserror::Error as ThisError;

/// Raw address of an engine-owned object. Allocated from a monotonic
/// counter and never reused, so a stale raw value cannot silently alias a
/// newer object.
pub(crate) type RawHandle = u64;

///
/// EngineError
///
/// An operation reached the engine with a raw handle that no longer
/// addresses a live slot. The handle layer above prevents this for every
/// supported call sequence, so this is corruption, not user error.
///

#[derive(Debug, ThisError)]
pub enum EngineError {
    #[error("raw handle {raw} does not address a live {slot} slot")]
    DanglingHandle { raw: u64, slot: &'static str },
}

///
/// CollectionData
///

#[derive(Clone, Debug, Default, Deref, DerefMut)]
struct CollectionData(BTreeMap<Vec<u8>, Vec<u8>>);

/// Named collections of one database or view state.
type CollectionSet = BTreeMap<String, CollectionData>;

///
/// Slots
///

struct DatabaseSlot {
    committed: CollectionSet,
}

struct ViewSlot {
    kind: ViewKind,
    state: CollectionSet,
}

struct CollectionSlot {
    view: RawHandle,
    name: String,
}

///
/// EngineState
///

#[derive(Default)]
struct EngineState {
    next: u64,
    databases: HashMap<RawHandle, DatabaseSlot>,
    views: HashMap<RawHandle, ViewSlot>,
    collections: HashMap<RawHandle, CollectionSlot>,
}

impl EngineState {
    fn alloc(&mut self) -> RawHandle {
        self.next += 1;
        self.next
    }

    fn database_mut(&mut self, raw: RawHandle) -> Result<&mut DatabaseSlot, EngineError> {
        self.databases.get_mut(&raw).ok_or(EngineError::DanglingHandle {
            raw,
            slot: "database",
        })
    }

    fn view_mut(&mut self, raw: RawHandle) -> Result<&mut ViewSlot, EngineError> {
        self.views
            .get_mut(&raw)
            .ok_or(EngineError::DanglingHandle { raw, slot: "view" })
    }

    /// Resolve a collection handle to the backing byte map inside its view.
    fn collection_mut(&mut self, raw: RawHandle) -> Result<&mut CollectionData, EngineError> {
        let (view, name) = {
            let slot = self
                .collections
                .get(&raw)
                .ok_or(EngineError::DanglingHandle {
                    raw,
                    slot: "collection",
                })?;
            (slot.view, slot.name.clone())
        };
        let view = self.view_mut(view)?;
        Ok(view.state.entry(name).or_default())
    }
}

thread_local! {
    static ENGINE: RefCell<EngineState> = RefCell::new(EngineState::default());
}

fn with_state_mut<R>(f: impl FnOnce(&mut EngineState) -> R) -> R {
    ENGINE.with(|state| f(&mut state.borrow_mut()))
}

///
/// Lifecycle operations
///

pub(crate) fn create_database() -> RawHandle {
    with_state_mut(|engine| {
        let raw = engine.alloc();
        engine.databases.insert(
            raw,
            DatabaseSlot {
                committed: CollectionSet::new(),
            },
        );
        raw
    })
}

pub(crate) fn destroy_database(raw: RawHandle) -> Result<(), EngineError> {
    with_state_mut(|engine| {
        engine
            .databases
            .remove(&raw)
            .map(|_| ())
            .ok_or(EngineError::DanglingHandle {
                raw,
                slot: "database",
            })
    })
}

/// Open a view over the database's committed state. The view takes its own
/// point-in-time copy; later merges do not show through.
pub(crate) fn create_view(db: RawHandle, kind: ViewKind) -> Result<RawHandle, EngineError> {
    with_state_mut(|engine| {
        let state = engine.database_mut(db)?.committed.clone();
        let raw = engine.alloc();
        engine.views.insert(raw, ViewSlot { kind, state });
        Ok(raw)
    })
}

pub(crate) fn destroy_view(raw: RawHandle) -> Result<(), EngineError> {
    with_state_mut(|engine| {
        engine
            .views
            .remove(&raw)
            .map(|_| ())
            .ok_or(EngineError::DanglingHandle { raw, slot: "view" })
    })
}

/// Open (or create) the named collection bound to a view. Two opens of the
/// same name on the same view address the same data.
pub(crate) fn create_collection(view: RawHandle, name: &str) -> Result<RawHandle, EngineError> {
    with_state_mut(|engine| {
        engine.view_mut(view)?.state.entry(name.to_owned()).or_default();
        let raw = engine.alloc();
        engine.collections.insert(
            raw,
            CollectionSlot {
                view,
                name: name.to_owned(),
            },
        );
        Ok(raw)
    })
}

/// Drop the collection handle. The named data stays with its view.
pub(crate) fn destroy_collection(raw: RawHandle) -> Result<(), EngineError> {
    with_state_mut(|engine| {
        engine
            .collections
            .remove(&raw)
            .map(|_| ())
            .ok_or(EngineError::DanglingHandle {
                raw,
                slot: "collection",
            })
    })
}

/// Replace the database's committed state with the fork's state.
pub(crate) fn merge(db: RawHandle, fork: RawHandle) -> Result<(), EngineError> {
    with_state_mut(|engine| {
        let state = engine.view_mut(fork)?.state.clone();
        engine.database_mut(db)?.committed = state;
        Ok(())
    })
}

///
/// Collection operations
///

pub(crate) fn get(col: RawHandle, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
    with_state_mut(|engine| Ok(engine.collection_mut(col)?.get(key).cloned()))
}

pub(crate) fn put(col: RawHandle, key: &[u8], value: &[u8]) -> Result<(), EngineError> {
    with_state_mut(|engine| {
        engine.collection_mut(col)?.insert(key.to_vec(), value.to_vec());
        Ok(())
    })
}

pub(crate) fn remove(col: RawHandle, key: &[u8]) -> Result<(), EngineError> {
    with_state_mut(|engine| {
        engine.collection_mut(col)?.remove(key);
        Ok(())
    })
}

pub(crate) fn clear(col: RawHandle) -> Result<(), EngineError> {
    with_state_mut(|engine| {
        engine.collection_mut(col)?.clear();
        Ok(())
    })
}

pub(crate) fn len(col: RawHandle) -> Result<u64, EngineError> {
    with_state_mut(|engine| Ok(engine.collection_mut(col)?.len() as u64))
}

/// One lazy cursor step: the first entry strictly after `after`, or the
/// first entry overall when `after` is `None`.
pub(crate) fn next_after(
    col: RawHandle,
    after: Option<&[u8]>,
) -> Result<Option<(Vec<u8>, Vec<u8>)>, EngineError> {
    with_state_mut(|engine| {
        let data = engine.collection_mut(col)?;
        let lower = match after {
            Some(key) => Bound::Excluded(key.to_vec()),
            None => Bound::Unbounded,
        };
        Ok(data
            .range((lower, Bound::Unbounded))
            .next()
            .map(|(key, value)| (key.clone(), value.clone())))
    })
}

/// Live slot counts (databases, views, collections) for leak checks.
#[cfg(test)]
pub(crate) fn live_slots() -> (usize, usize, usize) {
    with_state_mut(|engine| {
        (
            engine.databases.len(),
            engine.views.len(),
            engine.collections.len(),
        )
    })
}

///
/// TESTS
///
