use crate::{engine::RawHandle, proxy::ProxyError};
use std::cell::Cell;

///
/// NativeHandle
///
/// An opaque reference to an engine-owned object plus a one-way validity
/// flag. Shared between the owning proxy and its registered disposer; no
/// other component reads or writes the flag. Once invalidated, the raw
/// value is never observable again.
///

#[derive(Debug)]
pub struct NativeHandle {
    raw: RawHandle,
    valid: Cell<bool>,
}

impl NativeHandle {
    pub(crate) const fn new(raw: RawHandle) -> Self {
        Self {
            raw,
            valid: Cell::new(true),
        }
    }

    /// Return the raw handle, failing if it has been invalidated.
    pub(crate) fn get(&self) -> Result<RawHandle, ProxyError> {
        if self.valid.get() {
            Ok(self.raw)
        } else {
            Err(ProxyError::InvalidHandle)
        }
    }

    /// Mark the handle invalid. Idempotent; the flag never flips back.
    pub(crate) fn invalidate(&self) {
        self.valid.set(false);
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_raw_while_valid() {
        let handle = NativeHandle::new(7);
        assert!(handle.is_valid());
        assert_eq!(handle.get().unwrap(), 7);
    }

    #[test]
    fn get_fails_after_invalidate() {
        let handle = NativeHandle::new(7);
        handle.invalidate();

        assert!(!handle.is_valid());
        assert!(matches!(handle.get(), Err(ProxyError::InvalidHandle)));
    }

    #[test]
    fn invalidate_twice_is_a_no_op() {
        let handle = NativeHandle::new(7);
        handle.invalidate();
        handle.invalidate();

        assert!(!handle.is_valid());
        assert!(matches!(handle.get(), Err(ProxyError::InvalidHandle)));
    }
}
