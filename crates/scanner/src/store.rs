//! Local mirror of the server's address collection.
//!
//! The store is the single source of truth between the transport and the
//! view layer. Writes only ever come from the connection task, in message
//! arrival order; readers get cloned snapshots so derivation never
//! observes a mutation mid-computation.
//!
//! Change notification follows a broadcast + watch hybrid: every mutation
//! publishes a `StoreEvent` for subscribers that care about what changed,
//! and bumps a coalescing generation counter for renderers that only need
//! to know *that* something changed.

use common::types::AddressRecord;
use std::sync::RwLock;
use tokio::sync::{broadcast, watch};
use tracing::debug;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The whole collection was replaced by a full snapshot.
    Replaced { count: usize },
    /// One record was inserted or replaced by an incremental update.
    Upserted { address: String },
}

pub struct StateStore {
    records: RwLock<Vec<AddressRecord>>,
    events_tx: broadcast::Sender<StoreEvent>,
    generation_tx: watch::Sender<u64>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (generation_tx, _) = watch::channel(0);
        Self {
            records: RwLock::new(Vec::new()),
            events_tx,
            generation_tx,
        }
    }

    /// Replace the entire collection with a full snapshot. The given order
    /// becomes the insertion order that stable sorts tie-break on.
    /// Fires exactly one change notification.
    pub fn apply_full_update(&self, records: Vec<AddressRecord>) {
        let count = records.len();
        {
            let mut guard = self.records.write().expect("store lock poisoned");
            *guard = records;
        }
        debug!(count, "applied full update");
        self.notify(StoreEvent::Replaced { count });
    }

    /// Upsert one record: whole-record replacement when the address is
    /// already known, append otherwise. Last write wins; delivery order is
    /// trusted, no ordering metadata is consulted.
    /// Fires exactly one change notification.
    pub fn apply_incremental_update(&self, record: AddressRecord) {
        let address = record.address.clone();
        {
            let mut guard = self.records.write().expect("store lock poisoned");
            match guard.iter_mut().find(|r| r.address == record.address) {
                Some(existing) => *existing = record,
                None => guard.push(record),
            }
        }
        debug!(address = %address, "applied incremental update");
        self.notify(StoreEvent::Upserted { address });
    }

    /// Cloned snapshot of one record.
    #[allow(dead_code)] // Accessor contract for the renderer binding; exercised in tests
    pub fn get(&self, address: &str) -> Option<AddressRecord> {
        self.records
            .read()
            .expect("store lock poisoned")
            .iter()
            .find(|r| r.address == address)
            .cloned()
    }

    /// Cloned snapshot of the whole collection, in insertion order.
    pub fn all(&self) -> Vec<AddressRecord> {
        self.records.read().expect("store lock poisoned").clone()
    }

    #[allow(dead_code)] // Used in tests
    pub fn len(&self) -> usize {
        self.records.read().expect("store lock poisoned").len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to per-mutation change events.
    #[allow(dead_code)] // Subscriber surface for the renderer binding; exercised in tests
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }

    /// Coalescing change signal: the generation bumps on every mutation,
    /// and a renderer that wakes late sees only the latest value.
    pub fn watch_generation(&self) -> watch::Receiver<u64> {
        self.generation_tx.subscribe()
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is fine; the store works headless.
        let _ = self.events_tx.send(event);
        self.generation_tx.send_modify(|g| *g += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views;
    use common::types::{LoadingStage, TokenHolding};

    fn record(address: &str, balance: f64) -> AddressRecord {
        let mut r = AddressRecord::new(address);
        r.balance = balance;
        r
    }

    #[test]
    fn test_full_update_replaces_collection() {
        let store = StateStore::new();
        store.apply_full_update(vec![record("a", 1.0), record("b", 2.0)]);
        assert_eq!(store.len(), 2);

        store.apply_full_update(vec![record("c", 3.0)]);
        assert_eq!(store.len(), 1);
        // "a" was omitted from the snapshot, so it is gone.
        assert!(store.get("a").is_none());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn test_incremental_update_appends_unknown_address() {
        let store = StateStore::new();
        store.apply_full_update(vec![record("a", 1.0)]);
        store.apply_incremental_update(record("b", 2.0));

        assert_eq!(store.len(), 2);
        // Appended at the end: insertion order is preserved.
        assert_eq!(store.all()[1].address, "b");
    }

    #[test]
    fn test_incremental_update_replaces_whole_record() {
        let store = StateStore::new();
        let mut rich = record("a", 5.0);
        rich.portfolio = vec![TokenHolding {
            kind: Some("SOL".to_string()),
            mint: None,
            name: Some("Solana".to_string()),
            symbol: "SOL".to_string(),
            balance: 5.0,
            usd_value: 557.25,
            logo: None,
        }];
        rich.total_value = Some(557.25);
        rich.loading_stage = Some(LoadingStage::Complete);
        store.apply_incremental_update(rich);

        // A later partial record fully replaces the stored one: the old
        // portfolio and totalValue must not survive.
        let mut partial = record("a", 6.0);
        partial.loading_stage = Some(LoadingStage::BasicInfo);
        store.apply_incremental_update(partial);

        let stored = store.get("a").unwrap();
        assert_eq!(stored.balance, 6.0);
        assert!(stored.portfolio.is_empty());
        assert!(stored.total_value.is_none());
        assert_eq!(stored.loading_stage, Some(LoadingStage::BasicInfo));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_last_write_wins_in_quick_succession() {
        let store = StateStore::new();
        store.apply_incremental_update(record("a", 1.0));
        store.apply_incremental_update(record("a", 2.0));
        store.apply_incremental_update(record("a", 1.5));
        assert_eq!(store.get("a").unwrap().balance, 1.5);
    }

    #[test]
    fn test_each_mutation_fires_one_event() {
        let store = StateStore::new();
        let mut rx = store.subscribe();

        store.apply_full_update(vec![record("a", 1.0)]);
        store.apply_incremental_update(record("b", 2.0));

        assert_eq!(rx.try_recv().unwrap(), StoreEvent::Replaced { count: 1 });
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::Upserted {
                address: "b".to_string()
            }
        );
        assert!(rx.try_recv().is_err(), "no extra notifications expected");
    }

    #[test]
    fn test_generation_coalesces() {
        let store = StateStore::new();
        let gen_rx = store.watch_generation();
        assert_eq!(*gen_rx.borrow(), 0);

        store.apply_incremental_update(record("a", 1.0));
        store.apply_incremental_update(record("a", 2.0));
        store.apply_full_update(vec![record("a", 3.0)]);

        // A late reader sees only the latest generation.
        assert_eq!(*gen_rx.borrow(), 3);
    }

    #[test]
    fn test_full_update_idempotent_ranking() {
        let store = StateStore::new();
        let snapshot = vec![record("a", 1.0), record("b", 3.0), record("c", 2.0)];

        store.apply_full_update(snapshot.clone());
        let first: Vec<String> = views::rank_addresses(store.all())
            .into_iter()
            .map(|r| r.address)
            .collect();

        store.apply_full_update(snapshot);
        let second: Vec<String> = views::rank_addresses(store.all())
            .into_iter()
            .map(|r| r.address)
            .collect();

        assert_eq!(first, second);
        assert_eq!(first, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_snapshots_are_defensive() {
        let store = StateStore::new();
        store.apply_full_update(vec![record("a", 1.0)]);

        let mut snapshot = store.all();
        snapshot[0].balance = 99.0;
        assert_eq!(store.get("a").unwrap().balance, 1.0);
    }
}
