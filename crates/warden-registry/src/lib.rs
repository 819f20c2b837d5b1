//! Warden Registry - the identity manager and time-lock policy engine.
//!
//! The registry creates identities, holds their proxies, and decides who may
//! forward calls through them. New owners are admitted through two paths
//! with different activation delays: nomination by an existing owner
//! (short) and nomination by the identity's recovery key (one day). A
//! pending owner becomes active the first time an authorization check
//! observes its elapsed activation time; no timers fire on their own.

#![deny(unsafe_code)]

pub mod error;
pub mod manager;
pub mod record;

pub use error::RegistryError;
pub use manager::{CallContext, IdentityManager};
pub use record::{AdmissionState, IdentityRecord};
