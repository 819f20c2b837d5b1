use thiserror::Error;
use warden_proxy::{ExecutionError, ProxyError};
use warden_types::{Address, ProxyAddress};

/// Errors returned by registry operations.
///
/// Authorization failures are raised before any external effect is
/// attempted; `Execution` surfaces a failure of the forwarded call itself.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown identity: {0}")]
    UnknownIdentity(ProxyAddress),

    #[error("caller {0} is not authorized")]
    Unauthorized(Address),

    #[error("{0} is already an active owner")]
    AlreadyActive(Address),

    #[error("forwarded call failed: {0}")]
    Execution(ExecutionError),
}

impl From<ProxyError> for RegistryError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::NotOwner { caller } => Self::Unauthorized(caller),
            ProxyError::Execution(inner) => Self::Execution(inner),
        }
    }
}
