//! Warden Ledger - append-only record of registry events.
//!
//! The registry appends every creation and admission event here instead of
//! relying on an implicit environment log, so callers and tests can assert
//! on emitted events without a subscription mechanism.

#![deny(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use warden_types::{Event, ProxyAddress};

/// One appended event with its position and observation time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: Event,
}

/// Append-only event ledger.
///
/// Entries are never rewritten or removed; `seq` starts at 1 and grows by
/// one per append.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLedger {
    entries: Vec<LedgerEntry>,
}

impl EventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` observed at `now` and return its sequence number.
    pub fn append(&mut self, now: DateTime<Utc>, event: Event) -> u64 {
        let seq = self.entries.len() as u64 + 1;
        self.entries.push(LedgerEntry {
            seq,
            recorded_at: now,
            event,
        });
        seq
    }

    /// All entries in append order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn latest_seq(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries touching one identity, in append order.
    pub fn events_for(&self, identity: &ProxyAddress) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.event.identity() == identity)
            .collect()
    }

    /// Event counts per kind.
    pub fn statistics(&self) -> LedgerStatistics {
        let mut by_kind: HashMap<String, usize> = HashMap::new();
        for entry in &self.entries {
            *by_kind
                .entry(format!("{:?}", entry.event.kind()))
                .or_insert(0) += 1;
        }

        LedgerStatistics {
            total_events: self.entries.len(),
            by_kind,
        }
    }
}

/// Aggregate view over the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerStatistics {
    pub total_events: usize,
    pub by_kind: HashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_types::Address;

    fn created(identity: &str) -> Event {
        Event::IdentityCreated {
            identity: ProxyAddress::new(identity),
            owner: Address::new("owner"),
            recovery_key: Address::new("recovery"),
            creator: Address::new("creator"),
        }
    }

    #[test]
    fn appends_assign_increasing_sequence_numbers() {
        let mut ledger = EventLedger::new();
        let now = Utc::now();

        assert_eq!(ledger.append(now, created("proxy-1")), 1);
        assert_eq!(ledger.append(now, created("proxy-2")), 2);
        assert_eq!(ledger.latest_seq(), 2);
    }

    #[test]
    fn events_for_filters_by_identity() {
        let mut ledger = EventLedger::new();
        let now = Utc::now();
        ledger.append(now, created("proxy-1"));
        ledger.append(now, created("proxy-2"));
        ledger.append(
            now,
            Event::OwnerAdded {
                identity: ProxyAddress::new("proxy-1"),
                owner: Address::new("new-owner"),
                instigator: Address::new("owner"),
            },
        );

        let entries = ledger.events_for(&ProxyAddress::new("proxy-1"));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq, 1);
        assert_eq!(entries[1].seq, 3);
    }

    #[test]
    fn statistics_count_by_kind() {
        let mut ledger = EventLedger::new();
        let now = Utc::now();
        ledger.append(now, created("proxy-1"));
        ledger.append(
            now,
            Event::OwnerAdded {
                identity: ProxyAddress::new("proxy-1"),
                owner: Address::new("new-owner"),
                instigator: Address::new("owner"),
            },
        );

        let stats = ledger.statistics();
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.by_kind.get("IdentityCreated"), Some(&1));
        assert_eq!(stats.by_kind.get("OwnerAdded"), Some(&1));
    }
}
