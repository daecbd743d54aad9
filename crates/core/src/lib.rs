//! `bindy-core` — identity building blocks shared by the event layer.
//!
//! This crate knows nothing about events; it only hands out identities.

pub mod error;
pub mod id;
pub mod identity;

pub use error::{BindyError, BindyResult};
pub use id::InstanceId;
pub use identity::{Identity, IdentityTag, Tagged};
