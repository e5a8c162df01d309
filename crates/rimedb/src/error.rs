use crate::{
    db::view::ViewKind,
    engine::EngineError,
    index::{IndexError, NameError},
    proxy::ProxyError,
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level error for the view runtime. Each variant wraps the error enum
/// of the module that raised it. Every variant here is a contract violation
/// or corruption signal, raised synchronously at the violating call; none of
/// them is a recoverable runtime condition.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl Error {
    #[must_use]
    pub const fn is_invalid_handle(&self) -> bool {
        matches!(self, Self::Proxy(ProxyError::InvalidHandle))
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::Access(AccessError::ReadOnly { .. }))
    }

    #[must_use]
    pub const fn is_concurrent_modification(&self) -> bool {
        matches!(self, Self::Access(AccessError::ConcurrentModification { .. }))
    }
}

///
/// AccessError
///
/// Violations of a view's access rules, raised by the shared index entry
/// points before any native call is made (read-only) or by a cursor step
/// (concurrent modification).
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum AccessError {
    #[error(
        "collection changed during iteration: modification count moved from {expected} to {observed}"
    )]
    ConcurrentModification { expected: u64, observed: u64 },

    #[error("cannot modify a {kind} view; open a fork to mutate collections")]
    ReadOnly { kind: ViewKind },
}
