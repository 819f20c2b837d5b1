//! Warden Types - shared vocabulary for the proxy identity manager.
//!
//! Addresses, forwarded-call shapes, admission delay classes, and the domain
//! events the registry appends to its ledger.

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An authenticated caller identity.
///
/// Authentication itself happens outside the engine; an `Address` is taken
/// at face value as the sender the environment vouched for.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a created proxy, allocated at identity creation and never
/// reassigned.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProxyAddress(pub String);

impl ProxyAddress {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocate a fresh, unique handle.
    pub fn generate() -> Self {
        Self(format!("proxy-{}", uuid::Uuid::new_v4()))
    }
}

impl std::fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An arbitrary call to forward through a proxy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub destination: Address,
    pub value: u64,
    pub payload: Vec<u8>,
}

impl CallRequest {
    pub fn new(destination: Address, value: u64, payload: Vec<u8>) -> Self {
        Self {
            destination,
            value,
            payload,
        }
    }
}

/// Output of a successfully forwarded call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub output: Vec<u8>,
}

impl CallOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_output(output: Vec<u8>) -> Self {
        Self { output }
    }
}

/// Which admission path scheduled a pending owner.
///
/// The delay before activation depends on this class alone; both paths share
/// one admission code path in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelayClass {
    /// Nominated by an existing active owner.
    Owner,
    /// Nominated by the identity's recovery key.
    Recovery,
}

/// Activation delays for the two owner-admission paths.
///
/// The owner path is near-immediate; the recovery path holds the candidate
/// for a full day so existing owners have a window to react before a
/// recovery-nominated key gains forwarding authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionDelays {
    pub owner: Duration,
    pub recovery: Duration,
}

impl Default for AdmissionDelays {
    fn default() -> Self {
        Self {
            owner: Duration::from_secs(1),
            recovery: Duration::from_secs(86_400),
        }
    }
}

impl AdmissionDelays {
    pub fn for_class(&self, class: DelayClass) -> Duration {
        match class {
            DelayClass::Owner => self.owner,
            DelayClass::Recovery => self.recovery,
        }
    }
}

/// Domain events appended to the ledger by registry operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    IdentityCreated {
        identity: ProxyAddress,
        owner: Address,
        recovery_key: Address,
        creator: Address,
    },
    OwnerAdded {
        identity: ProxyAddress,
        owner: Address,
        instigator: Address,
    },
}

impl Event {
    /// The identity this event concerns.
    pub fn identity(&self) -> &ProxyAddress {
        match self {
            Event::IdentityCreated { identity, .. } => identity,
            Event::OwnerAdded { identity, .. } => identity,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::IdentityCreated { .. } => EventKind::IdentityCreated,
            Event::OwnerAdded { .. } => EventKind::OwnerAdded,
        }
    }
}

/// Discriminant of an [`Event`], used for ledger aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    IdentityCreated,
    OwnerAdded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_proxy_addresses_are_unique() {
        assert_ne!(ProxyAddress::generate(), ProxyAddress::generate());
    }

    #[test]
    fn default_delays_match_admission_paths() {
        let delays = AdmissionDelays::default();
        assert_eq!(
            delays.for_class(DelayClass::Owner),
            Duration::from_secs(1)
        );
        assert_eq!(
            delays.for_class(DelayClass::Recovery),
            Duration::from_secs(86_400)
        );
    }

    #[test]
    fn event_reports_its_identity() {
        let identity = ProxyAddress::new("proxy-1");
        let event = Event::OwnerAdded {
            identity: identity.clone(),
            owner: Address::new("new-owner"),
            instigator: Address::new("existing-owner"),
        };
        assert_eq!(event.identity(), &identity);
        assert_eq!(event.kind(), EventKind::OwnerAdded);
    }
}
