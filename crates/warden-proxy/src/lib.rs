//! Warden Proxy - minimal owned execution shell.
//!
//! A proxy performs calls on behalf of its identity when instructed by its
//! sole controller. The controller is always the registry; the execution
//! primitive itself lives behind the [`Executor`] trait and is supplied by
//! the environment.

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use warden_types::{Address, CallOutcome, CallRequest, ProxyAddress};

/// Boundary to the environment's execution primitive.
///
/// Implementations perform `request` with the call's origin attributed to
/// `origin`, and report the outcome. Failures are returned as-is, never
/// swallowed or retried.
pub trait Executor {
    fn execute(
        &mut self,
        origin: &ProxyAddress,
        request: &CallRequest,
    ) -> Result<CallOutcome, ExecutionError>;
}

/// A forwarding account shell with exactly one controller.
///
/// Every proxy behaves identically; instances differ only in their address
/// and owner. The owner is set at construction and never reassigned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proxy {
    address: ProxyAddress,
    owner: Address,
}

impl Proxy {
    pub fn new(address: ProxyAddress, owner: Address) -> Self {
        Self { address, owner }
    }

    pub fn address(&self) -> &ProxyAddress {
        &self.address
    }

    /// The sole controller of this shell.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Execute `request` as this proxy.
    ///
    /// Only the owner may instruct the shell; any other caller is refused
    /// before the execution primitive is touched.
    pub fn execute(
        &self,
        caller: &Address,
        executor: &mut dyn Executor,
        request: &CallRequest,
    ) -> Result<CallOutcome, ProxyError> {
        if caller != &self.owner {
            return Err(ProxyError::NotOwner {
                caller: caller.clone(),
            });
        }

        debug!(
            proxy = %self.address,
            destination = %request.destination,
            "dispatching forwarded call"
        );
        executor
            .execute(&self.address, request)
            .map_err(ProxyError::Execution)
    }
}

/// Failure reported by the execution primitive.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{reason}")]
pub struct ExecutionError {
    pub reason: String,
}

impl ExecutionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Proxy-level errors.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("caller {caller} does not own this proxy")]
    NotOwner { caller: Address },

    #[error("forwarded call failed: {0}")]
    Execution(ExecutionError),
}
