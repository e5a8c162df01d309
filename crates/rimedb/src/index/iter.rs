use crate::{
    db::counter::ModificationCounter,
    engine,
    error::{AccessError, Error},
    obs::{self, ObsEvent},
    proxy::NativeHandle,
};
use std::rc::Rc;

///
/// Entries
///
/// A lazy, finite, non-restartable cursor over one collection's entries in
/// key order. The view's modification count is captured at creation and
/// re-checked on every step; a structural change through any index of the
/// same view kills the cursor on its next step. A dead cursor (failed or
/// exhausted) yields nothing forever.
///

#[derive(Debug)]
pub struct Entries {
    handle: Rc<NativeHandle>,
    counter: Rc<ModificationCounter>,
    expected: u64,
    last: Option<Vec<u8>>,
    done: bool,
}

impl Entries {
    pub(crate) fn new(handle: Rc<NativeHandle>, counter: Rc<ModificationCounter>) -> Self {
        let expected = counter.current();
        Self {
            handle,
            counter,
            expected,
            last: None,
            done: false,
        }
    }
}

impl Iterator for Entries {
    type Item = Result<(Vec<u8>, Vec<u8>), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let observed = self.counter.current();
        if observed != self.expected {
            self.done = true;
            obs::record(ObsEvent::IterationInvalidated);
            return Some(Err(AccessError::ConcurrentModification {
                expected: self.expected,
                observed,
            }
            .into()));
        }

        let raw = match self.handle.get() {
            Ok(raw) => raw,
            Err(err) => {
                self.done = true;
                return Some(Err(err.into()));
            }
        };

        match engine::next_after(raw, self.last.as_deref()) {
            Ok(Some((key, value))) => {
                self.last = Some(key.clone());
                Some(Ok((key, value)))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err.into()))
            }
        }
    }
}

///
/// Values
///
/// [`Entries`] with the keys dropped; used by list indices, whose keys are
/// internal position encodings.
///

pub struct Values {
    inner: Entries,
}

impl Values {
    pub(crate) const fn new(inner: Entries) -> Self {
        Self { inner }
    }
}

impl Iterator for Values {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|step| step.map(|(_key, value)| value))
    }
}
