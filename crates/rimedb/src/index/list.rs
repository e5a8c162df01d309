use crate::{
    db::view::View,
    engine,
    error::Error,
    index::{IndexCore, IndexError, Values},
    obs::ObsEvent,
    proxy::Cleaner,
};
use std::rc::Rc;

/// Positions are stored as big-endian u64 collection keys, so engine key
/// order is list order.
fn position_key(index: u64) -> [u8; 8] {
    index.to_be_bytes()
}

///
/// ListIndex
///
/// An append-ordered list bound to one view, layered over the same native
/// collection contract the map uses. Mutations require a fork and bump the
/// view's modification counter once each.
///

pub struct ListIndex {
    core: IndexCore,
}

impl ListIndex {
    /// Open the named list on a view, inside a disposal scope.
    pub fn open(name: &str, view: &Rc<View>, scope: &Cleaner) -> Result<Self, Error> {
        Ok(Self {
            core: IndexCore::open(name, view, scope)?,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Append a value at the end of the list.
    pub fn push(&self, value: &[u8]) -> Result<(), Error> {
        self.core.mutate(ObsEvent::Write, |raw| {
            let len = engine::len(raw)?;
            Ok(engine::put(raw, &position_key(len), value)?)
        })
    }

    /// Value at `index`, or `None` past the end.
    pub fn get(&self, index: u64) -> Result<Option<Vec<u8>>, Error> {
        self.core
            .read(|raw| Ok(engine::get(raw, &position_key(index))?))
    }

    /// Replace the value at an existing position.
    pub fn set(&self, index: u64, value: &[u8]) -> Result<(), Error> {
        self.core.mutate(ObsEvent::Write, |raw| {
            let len = engine::len(raw)?;
            if index >= len {
                return Err(IndexError::OutOfBounds { index, len }.into());
            }
            Ok(engine::put(raw, &position_key(index), value)?)
        })
    }

    /// Remove every element.
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

    /// Lazy fail-fast cursor over values in list order.
    pub fn values(&self) -> Result<Values, Error> {
        Ok(Values::new(self.core.entries()?))
    }
}

///
/// TESTS
///
