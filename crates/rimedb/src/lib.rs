//! RimeDB view runtime: scoped ownership of engine-backed objects.
//!
//! Objects that live in the handle-addressed storage engine (databases,
//! views, index collections) are never finalized by a collector. Each one is
//! created inside an explicit disposal scope ([`proxy::Cleaner`]) and is
//! guaranteed released on every exit path from that scope, children before
//! parents.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod engine;
pub mod error;
pub mod index;
pub mod obs;
pub mod proxy;

pub use error::{AccessError, Error};

///
/// Prelude
///
/// Prelude contains only the caller-facing vocabulary.
/// Engine internals and the obs surface are not re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{Database, View, ViewKind},
        error::Error,
        index::{ListIndex, MapIndex},
        proxy::Cleaner,
    };
}
