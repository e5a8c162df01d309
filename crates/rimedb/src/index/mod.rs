//! Typed index proxies: each binds one named native collection to one
//! view's lifecycle and mutability rules. The closed set of kinds (map,
//! list) shares the entry points in [`IndexCore`]; access checks are never
//! duplicated per kind.

pub mod iter;
pub mod list;
pub mod map;
mod name;

pub use iter::{Entries, Values};
pub use list::ListIndex;
pub use map::MapIndex;
pub use name::{IndexName, NameError};

use crate::{
    db::{counter::ModificationCounter, view::View},
    engine::{self, RawHandle},
    error::{AccessError, Error},
    obs::{self, ObsEvent},
    proxy::{Cleaner, NativeHandle, ProxyError},
};
use std::rc::Rc;
use thiserror::Error as ThisError;

///
/// IndexError
///

#[derive(Debug, ThisError)]
pub enum IndexError {
    #[error("list position {index} out of bounds (len {len})")]
    OutOfBounds { index: u64, len: u64 },
}

///
/// IndexCore
///
/// Shared state and entry points for every index kind. Mutations are gated
/// centrally: view mutability first (no side effects on failure), then
/// handle validity, then the native call, and the counter bump only after
/// the call succeeded. A mutation that fails must contribute nothing.
///

pub(crate) struct IndexCore {
    handle: Rc<NativeHandle>,
    name: IndexName,
    view: Rc<View>,
    counter: Rc<ModificationCounter>,
}

impl IndexCore {
    /// Bind the named native collection to a view, inside a disposal scope.
    pub(crate) fn open(name: &str, view: &Rc<View>, scope: &Cleaner) -> Result<Self, Error> {
        if scope.is_closed() {
            return Err(ProxyError::ClosedScope.into());
        }

        let name = IndexName::try_new(name)?;
        let raw = engine::create_collection(view.handle().get()?, name.as_str())?;
        let handle = Rc::new(NativeHandle::new(raw));

        view.retain_index();
        let registered = Rc::clone(&handle);
        let owner = Rc::clone(view);
        scope.register(move || {
            let raw = registered.get()?;
            registered.invalidate();
            owner.release_index();
            engine::destroy_collection(raw)?;
            Ok(())
        })?;
        obs::record(ObsEvent::IndexOpened);

        Ok(Self {
            handle,
            name,
            view: Rc::clone(view),
            counter: view.counter(),
        })
    }

    pub(crate) fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Mutating entry point shared by every write operation.
    pub(crate) fn mutate<R>(
        &self,
        event: ObsEvent,
        op: impl FnOnce(RawHandle) -> Result<R, Error>,
    ) -> Result<R, Error> {
        if !self.view.can_modify() {
            return Err(AccessError::ReadOnly {
                kind: self.view.kind(),
            }
            .into());
        }
        let raw = self.handle.get()?;
        let out = op(raw)?;
        self.counter.notify_modified();
        obs::record(event);
        Ok(out)
    }

    /// Read entry point shared by every non-iterating read.
    pub(crate) fn read<R>(&self, op: impl FnOnce(RawHandle) -> Result<R, Error>) -> Result<R, Error> {
        let raw = self.handle.get()?;
        op(raw)
    }

    /// Start a lazy, fail-fast cursor over the collection's entries.
    pub(crate) fn entries(&self) -> Result<Entries, Error> {
        self.handle.get()?;
        Ok(Entries::new(
            Rc::clone(&self.handle),
            Rc::clone(&self.counter),
        ))
    }
}
