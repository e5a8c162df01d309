//! Native-object proxies: opaque handles and the disposal scopes that own
//! them. Everything engine-backed in this crate is reached through a
//! [`NativeHandle`] and released by a [`Cleaner`] registration.

mod cleaner;
mod handle;

pub use cleaner::{Cleaner, RegistrationToken};
pub use handle::NativeHandle;

use crate::error::Error;
use thiserror::Error as ThisError;

///
/// ProxyError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum ProxyError {
    #[error("cleanup raised {} error(s) during close", failures.len())]
    Cleanup { failures: Vec<Error> },

    #[error("scope is closed; no further registrations are accepted")]
    ClosedScope,

    #[error("operation on an invalidated native handle")]
    InvalidHandle,

    #[error("view destroyed while {live} derived index(es) remain open")]
    OrderViolation { live: usize },
}
