use crate::{
    db::view::View,
    engine,
    error::Error,
    index::{Entries, IndexCore},
    obs::ObsEvent,
    proxy::Cleaner,
};
use std::rc::Rc;

///
/// MapIndex
///
/// A byte-keyed map bound to one view. Reads return `None` for absent keys;
/// mutations require the view to be a fork and bump the view's modification
/// counter once each.
///

pub struct MapIndex {
    core: IndexCore,
}

impl MapIndex {
    /// Open the named map on a view, inside a disposal scope.
    pub fn open(name: &str, view: &Rc<View>, scope: &Cleaner) -> Result<Self, Error> {
        Ok(Self {
            core: IndexCore::open(name, view, scope)?,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Associate `value` with `key`, replacing any previous value.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        self.core
            .mutate(ObsEvent::Write, |raw| Ok(engine::put(raw, key, value)?))
    }

    /// Value stored under `key`, or `None`. Absence is an outcome, not an
    /// error.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        self.core.read(|raw| Ok(engine::get(raw, key)?))
    }

    pub fn contains(&self, key: &[u8]) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove the entry under `key`, if any.
    pub fn remove(&self, key: &[u8]) -> Result<(), Error> {
        self.core
            .mutate(ObsEvent::Remove, |raw| Ok(engine::remove(raw, key)?))
    }

    /// Remove every entry.
    pub fn clear(&self) -> Result<(), Error> {
        self.core
            .mutate(ObsEvent::Clear, |raw| Ok(engine::clear(raw)?))
    }

    pub fn len(&self) -> Result<u64, Error> {
        self.core.read(|raw| Ok(engine::len(raw)?))
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Lazy fail-fast cursor over entries in key order.
    pub fn entries(&self) -> Result<Entries, Error> {
        self.core.entries()
    }
}

///
/// TESTS
///
