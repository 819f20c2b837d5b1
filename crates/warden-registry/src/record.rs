use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_types::{Address, ProxyAddress};

use crate::error::RegistryError;

/// Where a candidate stands in the admission state machine.
///
/// `absent -> pending -> active`, one way. The `pending -> active`
/// transition is observed at check time, never scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionState {
    Absent,
    Pending(DateTime<Utc>),
    Active,
}

/// Per-identity state: active owners, recovery key, and pending admissions.
///
/// The owner set is non-empty from creation on and only ever grows. The
/// recovery key is fixed at creation and holds no forwarding authority of
/// its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    proxy_address: ProxyAddress,
    owners: BTreeSet<Address>,
    recovery_key: Address,
    pending_owners: BTreeMap<Address, DateTime<Utc>>,
    creator: Address,
    created_at: DateTime<Utc>,
}

impl IdentityRecord {
    pub fn new(
        proxy_address: ProxyAddress,
        owner: Address,
        recovery_key: Address,
        creator: Address,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut owners = BTreeSet::new();
        owners.insert(owner);
        Self {
            proxy_address,
            owners,
            recovery_key,
            pending_owners: BTreeMap::new(),
            creator,
            created_at,
        }
    }

    pub fn proxy_address(&self) -> &ProxyAddress {
        &self.proxy_address
    }

    pub fn owners(&self) -> impl Iterator<Item = &Address> {
        self.owners.iter()
    }

    pub fn is_owner(&self, candidate: &Address) -> bool {
        self.owners.contains(candidate)
    }

    pub fn recovery_key(&self) -> &Address {
        &self.recovery_key
    }

    pub fn creator(&self) -> &Address {
        &self.creator
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Pending candidates with their activation times, unresolved.
    ///
    /// An entry whose activation time has passed still reads as pending
    /// here until some authorization check observes it.
    pub fn pending_owners(&self) -> &BTreeMap<Address, DateTime<Utc>> {
        &self.pending_owners
    }

    pub fn admission_state(&self, candidate: &Address) -> AdmissionState {
        if self.owners.contains(candidate) {
            AdmissionState::Active
        } else if let Some(activation) = self.pending_owners.get(candidate) {
            AdmissionState::Pending(*activation)
        } else {
            AdmissionState::Absent
        }
    }

    /// Promote every pending candidate whose activation time has elapsed.
    ///
    /// Promotion is permanent: the candidate joins the owner set and its
    /// pending entry is removed. Returns the promoted addresses.
    pub fn resolve_pending(&mut self, now: DateTime<Utc>) -> Vec<Address> {
        let due: Vec<Address> = self
            .pending_owners
            .iter()
            .filter(|(_, activation)| now >= **activation)
            .map(|(candidate, _)| candidate.clone())
            .collect();

        for candidate in &due {
            self.pending_owners.remove(candidate);
            self.owners.insert(candidate.clone());
        }

        due
    }

    /// Insert `candidate` into the pending set with the given activation
    /// time, re-basing the timestamp if the candidate is already pending.
    ///
    /// An already-active owner cannot be re-admitted.
    pub fn admit(
        &mut self,
        candidate: Address,
        activation: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        if self.owners.contains(&candidate) {
            return Err(RegistryError::AlreadyActive(candidate));
        }
        self.pending_owners.insert(candidate, activation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> IdentityRecord {
        IdentityRecord::new(
            ProxyAddress::new("proxy-1"),
            Address::new("u1"),
            Address::new("rescue"),
            Address::new("creator"),
            t0(),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn starts_with_one_owner_and_no_pending() {
        let record = record();
        assert!(record.is_owner(&Address::new("u1")));
        assert_eq!(record.owners().count(), 1);
        assert!(record.pending_owners().is_empty());
        assert_eq!(
            record.admission_state(&Address::new("rescue")),
            AdmissionState::Absent
        );
    }

    #[test]
    fn resolve_promotes_only_elapsed_candidates() {
        let mut record = record();
        let early = t0() + chrono::Duration::seconds(1);
        let late = t0() + chrono::Duration::seconds(100);
        record.admit(Address::new("u2"), early).unwrap();
        record.admit(Address::new("u3"), late).unwrap();

        let promoted = record.resolve_pending(t0() + chrono::Duration::seconds(5));

        assert_eq!(promoted, vec![Address::new("u2")]);
        assert!(record.is_owner(&Address::new("u2")));
        assert_eq!(
            record.admission_state(&Address::new("u3")),
            AdmissionState::Pending(late)
        );
    }

    #[test]
    fn promotion_at_exact_activation_time() {
        let mut record = record();
        let activation = t0() + chrono::Duration::seconds(1);
        record.admit(Address::new("u2"), activation).unwrap();

        record.resolve_pending(activation);

        assert!(record.is_owner(&Address::new("u2")));
    }

    #[test]
    fn owners_and_pending_stay_disjoint() {
        let mut record = record();
        let activation = t0() + chrono::Duration::seconds(1);
        record.admit(Address::new("u2"), activation).unwrap();
        record.resolve_pending(activation);

        assert!(record.pending_owners().is_empty());
        assert!(matches!(
            record.admit(Address::new("u2"), activation),
            Err(RegistryError::AlreadyActive(_))
        ));
    }

    #[test]
    fn readmitting_pending_candidate_rebases_activation() {
        let mut record = record();
        let first = t0() + chrono::Duration::seconds(1);
        let second = t0() + chrono::Duration::seconds(50);
        record.admit(Address::new("u2"), first).unwrap();
        record.admit(Address::new("u2"), second).unwrap();

        assert_eq!(
            record.admission_state(&Address::new("u2")),
            AdmissionState::Pending(second)
        );
        assert_eq!(record.pending_owners().len(), 1);
    }
}
