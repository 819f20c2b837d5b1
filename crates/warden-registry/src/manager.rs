use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use warden_ledger::EventLedger;
use warden_proxy::{Executor, Proxy};
use warden_types::{
    Address, AdmissionDelays, CallOutcome, CallRequest, DelayClass, Event, ProxyAddress,
};

use crate::error::RegistryError;
use crate::record::IdentityRecord;

/// Per-call environment: the authenticated sender and the current time.
///
/// Both come from the surrounding ledger/clock collaborators; the registry
/// itself never reads ambient time.
#[derive(Clone, Debug)]
pub struct CallContext {
    pub sender: Address,
    pub now: DateTime<Utc>,
}

impl CallContext {
    pub fn new(sender: Address, now: DateTime<Utc>) -> Self {
        Self { sender, now }
    }
}

/// IdentityManager - the registry and policy engine.
///
/// Creates identities, owns their proxies, and authorizes every forwarded
/// action against the identity's owner set. Pending owners are promoted
/// lazily: the first authorization check that observes an elapsed
/// activation time makes the promotion permanent.
pub struct IdentityManager {
    address: Address,
    delays: AdmissionDelays,
    identities: HashMap<ProxyAddress, IdentityRecord>,
    proxies: HashMap<ProxyAddress, Proxy>,
    ledger: EventLedger,
}

impl IdentityManager {
    pub fn new() -> Self {
        Self::with_delays(AdmissionDelays::default())
    }

    pub fn with_delays(delays: AdmissionDelays) -> Self {
        Self {
            address: Address::new(format!("warden-{}", uuid::Uuid::new_v4())),
            delays,
            identities: HashMap::new(),
            proxies: HashMap::new(),
            ledger: EventLedger::new(),
        }
    }

    /// The registry's own address; every created proxy reports it as owner.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The append-only event log of this registry.
    pub fn ledger(&self) -> &EventLedger {
        &self.ledger
    }

    pub fn lookup(&self, identity: &ProxyAddress) -> Option<&IdentityRecord> {
        self.identities.get(identity)
    }

    pub fn proxy(&self, identity: &ProxyAddress) -> Option<&Proxy> {
        self.proxies.get(identity)
    }

    pub fn identities(&self) -> impl Iterator<Item = &IdentityRecord> {
        self.identities.values()
    }

    /// Create a new identity with `owner` as its single active owner.
    ///
    /// Anyone may call this. The sender is recorded as the creator and
    /// gains no authority from creating; the new proxy is owned by the
    /// registry.
    pub fn create_identity(
        &mut self,
        ctx: &CallContext,
        owner: Address,
        recovery_key: Address,
    ) -> ProxyAddress {
        let proxy_address = ProxyAddress::generate();
        let proxy = Proxy::new(proxy_address.clone(), self.address.clone());
        let record = IdentityRecord::new(
            proxy_address.clone(),
            owner.clone(),
            recovery_key.clone(),
            ctx.sender.clone(),
            ctx.now,
        );

        self.proxies.insert(proxy_address.clone(), proxy);
        self.identities.insert(proxy_address.clone(), record);
        self.ledger.append(
            ctx.now,
            Event::IdentityCreated {
                identity: proxy_address.clone(),
                owner,
                recovery_key,
                creator: ctx.sender.clone(),
            },
        );

        info!(identity = %proxy_address, creator = %ctx.sender, "identity created");
        proxy_address
    }

    /// Forward `request` through `identity`'s proxy.
    ///
    /// The sender must be an active owner at call time; pending owners
    /// whose activation time has elapsed are promoted as part of this
    /// check. An unauthorized call dispatches nothing.
    pub fn forward_to(
        &mut self,
        executor: &mut dyn Executor,
        ctx: &CallContext,
        identity: &ProxyAddress,
        request: &CallRequest,
    ) -> Result<CallOutcome, RegistryError> {
        let record = self
            .identities
            .get_mut(identity)
            .ok_or_else(|| RegistryError::UnknownIdentity(identity.clone()))?;

        for promoted in record.resolve_pending(ctx.now) {
            debug!(identity = %identity, owner = %promoted, "pending owner activated");
        }

        if !record.is_owner(&ctx.sender) {
            debug!(identity = %identity, caller = %ctx.sender, "forward rejected");
            return Err(RegistryError::Unauthorized(ctx.sender.clone()));
        }

        let proxy = self
            .proxies
            .get(identity)
            .ok_or_else(|| RegistryError::UnknownIdentity(identity.clone()))?;

        let outcome = proxy.execute(&self.address, executor, request)?;
        Ok(outcome)
    }

    /// Nominate `new_owner` on the short owner-path delay.
    ///
    /// The sender must itself be an active owner.
    pub fn add_owner(
        &mut self,
        ctx: &CallContext,
        identity: &ProxyAddress,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        let record = self
            .identities
            .get_mut(identity)
            .ok_or_else(|| RegistryError::UnknownIdentity(identity.clone()))?;

        record.resolve_pending(ctx.now);
        if !record.is_owner(&ctx.sender) {
            return Err(RegistryError::Unauthorized(ctx.sender.clone()));
        }

        Self::schedule_admission(
            record,
            &mut self.ledger,
            &self.delays,
            ctx,
            new_owner,
            DelayClass::Owner,
        )
    }

    /// Nominate `new_owner` on the long recovery-path delay.
    ///
    /// Only the identity's recovery key may call this. The delay gives
    /// existing owners a window to react before the nominee gains
    /// forwarding authority.
    pub fn add_owner_for_recovery(
        &mut self,
        ctx: &CallContext,
        identity: &ProxyAddress,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        let record = self
            .identities
            .get_mut(identity)
            .ok_or_else(|| RegistryError::UnknownIdentity(identity.clone()))?;

        record.resolve_pending(ctx.now);
        if record.recovery_key() != &ctx.sender {
            return Err(RegistryError::Unauthorized(ctx.sender.clone()));
        }

        Self::schedule_admission(
            record,
            &mut self.ledger,
            &self.delays,
            ctx,
            new_owner,
            DelayClass::Recovery,
        )
    }

    /// Shared tail of both admission paths, parameterized by delay class.
    ///
    /// Re-nominating an already-pending candidate re-bases its activation
    /// time; an already-active owner is rejected.
    fn schedule_admission(
        record: &mut IdentityRecord,
        ledger: &mut EventLedger,
        delays: &AdmissionDelays,
        ctx: &CallContext,
        candidate: Address,
        class: DelayClass,
    ) -> Result<(), RegistryError> {
        let activation = ctx.now + delays.for_class(class);
        record.admit(candidate.clone(), activation)?;

        let identity = record.proxy_address().clone();
        ledger.append(
            ctx.now,
            Event::OwnerAdded {
                identity: identity.clone(),
                owner: candidate.clone(),
                instigator: ctx.sender.clone(),
            },
        );

        info!(
            identity = %identity,
            owner = %candidate,
            instigator = %ctx.sender,
            class = ?class,
            %activation,
            "owner admission scheduled"
        );
        Ok(())
    }
}

impl Default for IdentityManager {
    fn default() -> Self {
        Self::new()
    }
}
