use crate::{
    error::Error,
    obs::{self, ObsEvent},
    proxy::ProxyError,
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

type Disposer = Box<dyn FnOnce() -> Result<(), Error>>;

///
/// RegistrationToken
///
/// Receipt for one accepted registration; `position` is the slot in
/// registration order (and thus the reverse of disposal order).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RegistrationToken {
    position: usize,
}

impl RegistrationToken {
    #[must_use]
    pub const fn position(self) -> usize {
        self.position
    }
}

///
/// Cleaner
///
/// An ordered stack of disposal actions. Closing the scope runs every
/// registered disposer exactly once, in strict reverse registration order,
/// so objects registered parent-before-child are torn down child-first.
///
/// A child scope's own close is registered as one disposer of its parent
/// (see [`Cleaner::child`]); that is the only sanctioned way to build
/// ownership trees, and it yields cascading teardown from plain LIFO
/// semantics.
///

pub struct Cleaner {
    disposers: RefCell<Vec<Disposer>>,
    closed: Cell<bool>,
}

impl Cleaner {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            disposers: RefCell::new(Vec::new()),
            closed: Cell::new(false),
        }
    }

    /// Register a disposal action to run when this scope closes.
    pub fn register(
        &self,
        dispose: impl FnOnce() -> Result<(), Error> + 'static,
    ) -> Result<RegistrationToken, ProxyError> {
        if self.closed.get() {
            return Err(ProxyError::ClosedScope);
        }
        let mut disposers = self.disposers.borrow_mut();
        disposers.push(Box::new(dispose));
        Ok(RegistrationToken {
            position: disposers.len() - 1,
        })
    }

    /// Close the scope: reject further registrations, then run every
    /// disposer exactly once in reverse registration order.
    ///
    /// A failing disposer never stops the cascade; all failures are
    /// collected and raised together as [`ProxyError::Cleanup`] after the
    /// last disposer has been attempted. A second `close` is a silent no-op.
    pub fn close(&self) -> Result<(), ProxyError> {
        if self.closed.get() {
            return Ok(());
        }
        // The flag flips before any disposer runs, so disposers cannot
        // re-enter registration.
        self.closed.set(true);

        let mut disposers = self.disposers.take();
        let mut failures = Vec::new();
        while let Some(dispose) = disposers.pop() {
            if let Err(err) = dispose() {
                obs::record(ObsEvent::CleanupFailure);
                failures.push(err);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ProxyError::Cleanup { failures })
        }
    }

    /// Create a nested scope whose close is one disposer of this scope.
    pub fn child(&self) -> Result<Rc<Self>, ProxyError> {
        let child = Rc::new(Self::new());
        let registered = Rc::clone(&child);
        self.register(move || registered.close().map_err(Error::from))?;
        Ok(child)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// A disposer that appends its label to a shared log.
    fn logging(log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> Disposer {
        let log = Rc::clone(log);
        Box::new(move || {
            log.borrow_mut().push(label);
            Ok(())
        })
    }

    #[test]
    fn close_runs_disposers_in_reverse_registration_order() {
        let cleaner = Cleaner::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        cleaner.register(logging(&log, "first")).unwrap();
        cleaner.register(logging(&log, "second")).unwrap();
        cleaner.register(logging(&log, "third")).unwrap();
        cleaner.close().unwrap();

        assert_eq!(*log.borrow(), ["third", "second", "first"]);
    }

    #[test]
    fn close_twice_runs_disposers_once() {
        let cleaner = Cleaner::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        cleaner.register(logging(&log, "only")).unwrap();
        cleaner.close().unwrap();
        cleaner.close().unwrap();

        assert_eq!(*log.borrow(), ["only"]);
    }

    #[test]
    fn tokens_report_registration_order() {
        let cleaner = Cleaner::new();
        let first = cleaner.register(|| Ok(())).unwrap();
        let second = cleaner.register(|| Ok(())).unwrap();

        assert_eq!(first.position(), 0);
        assert_eq!(second.position(), 1);
        cleaner.close().unwrap();
    }

    #[test]
    fn register_after_close_is_rejected() {
        let cleaner = Cleaner::new();
        cleaner.close().unwrap();

        let result = cleaner.register(|| Ok(()));
        assert!(matches!(result, Err(ProxyError::ClosedScope)));
    }

    #[test]
    fn registration_during_close_is_rejected() {
        let cleaner = Rc::new(Cleaner::new());
        let observed = Rc::new(RefCell::new(None));

        let scope = Rc::clone(&cleaner);
        let slot = Rc::clone(&observed);
        cleaner
            .register(move || {
                *slot.borrow_mut() = Some(scope.register(|| Ok(())));
                Ok(())
            })
            .unwrap();
        cleaner.close().unwrap();

        assert!(matches!(
            *observed.borrow(),
            Some(Err(ProxyError::ClosedScope))
        ));
    }

    #[test]
    fn failing_disposer_does_not_stop_the_cascade() {
        let cleaner = Cleaner::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        cleaner.register(logging(&log, "a")).unwrap();
        cleaner.register(|| Err(ProxyError::InvalidHandle.into())).unwrap();
        cleaner.register(logging(&log, "b")).unwrap();
        cleaner.register(|| Err(ProxyError::InvalidHandle.into())).unwrap();

        let err = cleaner.close().unwrap_err();
        match err {
            ProxyError::Cleanup { failures } => {
                assert_eq!(failures.len(), 2, "every failure must be collected");
                assert!(failures.iter().all(Error::is_invalid_handle));
            }
            other => panic!("expected aggregate cleanup error, got: {other}"),
        }

        // Both non-failing disposers still ran, in order.
        assert_eq!(*log.borrow(), ["b", "a"]);
    }

    #[test]
    fn child_scope_closes_before_later_parent_disposers_run_first() {
        let parent = Cleaner::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        parent.register(logging(&log, "parent-early")).unwrap();
        let child = parent.child().unwrap();
        child.register(logging(&log, "child-a")).unwrap();
        child.register(logging(&log, "child-b")).unwrap();
        parent.register(logging(&log, "parent-late")).unwrap();

        parent.close().unwrap();

        assert_eq!(
            *log.borrow(),
            ["parent-late", "child-b", "child-a", "parent-early"]
        );
    }

    #[test]
    fn cascade_runs_to_arbitrary_nesting_depth() {
        let root = Cleaner::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        root.register(logging(&log, "root")).unwrap();
        let mid = root.child().unwrap();
        mid.register(logging(&log, "mid")).unwrap();
        let leaf = mid.child().unwrap();
        leaf.register(logging(&log, "leaf")).unwrap();

        root.close().unwrap();

        assert_eq!(*log.borrow(), ["leaf", "mid", "root"]);
    }

    #[test]
    fn explicitly_closed_child_is_a_no_op_in_parent_close() {
        let parent = Cleaner::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let child = parent.child().unwrap();
        child.register(logging(&log, "child")).unwrap();
        parent.register(logging(&log, "parent")).unwrap();

        child.close().unwrap();
        assert_eq!(*log.borrow(), ["child"]);

        parent.close().unwrap();
        assert_eq!(*log.borrow(), ["child", "parent"]);
    }

    proptest! {
        #[test]
        fn close_runs_every_disposer_exactly_once_in_reverse(count in 0usize..48) {
            let cleaner = Cleaner::new();
            let order = Rc::new(RefCell::new(Vec::new()));

            for i in 0..count {
                let order = Rc::clone(&order);
                cleaner.register(move || {
                    order.borrow_mut().push(i);
                    Ok(())
                }).unwrap();
            }
            cleaner.close().unwrap();

            let expected: Vec<usize> = (0..count).rev().collect();
            prop_assert_eq!(order.borrow().clone(), expected);
        }
    }
}
