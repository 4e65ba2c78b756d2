use crate::models::{Item, ItemRecord, OrderHint, Vote};
use crate::services::store::{lock_order, CatalogStore, CatalogTransaction, StoreError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedRwLockReadGuard, RwLock};

#[derive(Debug, Default)]
struct Catalog {
    order: Vec<String>,
    items: HashMap<String, Arc<Mutex<Item>>>,
}

/// In-process catalog store
///
/// Each item sits behind its own mutex so votes on disjoint pairs run in
/// parallel. Transactions hold the read side of the catalog lock for their
/// whole lifetime; snapshots and upserts take the write side, so they never
/// observe a half-applied vote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    catalog: Arc<RwLock<Catalog>>,
    votes: Arc<Mutex<Vec<Vote>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given records, in order
    pub async fn with_records(records: Vec<ItemRecord>) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in records {
            store.upsert_item(record).await?;
        }
        Ok(store)
    }

    /// Copy of the vote log in append order
    pub async fn votes(&self) -> Vec<Vote> {
        let _catalog = self.catalog.write().await;
        self.votes.lock().await.clone()
    }

    pub async fn item_count(&self) -> usize {
        self.catalog.read().await.order.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_item(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let catalog = self.catalog.read().await;
        match catalog.items.get(id) {
            Some(item) => Ok(Some(item.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn list_items(&self, order: OrderHint) -> Result<Vec<Item>, StoreError> {
        let catalog = self.catalog.write().await;

        let mut items = Vec::with_capacity(catalog.order.len());
        for id in &catalog.order {
            if let Some(item) = catalog.items.get(id) {
                items.push(item.lock().await.clone());
            }
        }

        if order == OrderHint::MarketCapRank {
            // Stable, so equal ranks keep insertion order
            items.sort_by_key(|item| (item.market_cap_rank.is_none(), item.market_cap_rank));
        }

        Ok(items)
    }

    async fn upsert_item(&self, record: ItemRecord) -> Result<Item, StoreError> {
        if record.id.trim().is_empty() {
            return Err(StoreError::InvalidInput("item id must not be empty".to_string()));
        }

        let mut catalog = self.catalog.write().await;

        if let Some(existing) = catalog.items.get(&record.id) {
            let mut item = existing.lock().await;
            item.apply_record(record);
            return Ok(item.clone());
        }

        let item = Item::from_record(record);
        catalog.order.push(item.id.clone());
        catalog
            .items
            .insert(item.id.clone(), Arc::new(Mutex::new(item.clone())));

        Ok(item)
    }

    async fn begin(&self) -> Result<Box<dyn CatalogTransaction>, StoreError> {
        let catalog = self.catalog.clone().read_owned().await;

        Ok(Box::new(MemoryTransaction {
            catalog,
            votes: self.votes.clone(),
            locked: BTreeMap::new(),
            lock_taken: false,
            staged: HashMap::new(),
            pending_votes: Vec::new(),
        }))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Writes are staged and only applied to the locked items on commit
struct MemoryTransaction {
    catalog: OwnedRwLockReadGuard<Catalog>,
    votes: Arc<Mutex<Vec<Vote>>>,
    locked: BTreeMap<String, OwnedMutexGuard<Item>>,
    lock_taken: bool,
    staged: HashMap<String, Item>,
    pending_votes: Vec<Vote>,
}

#[async_trait]
impl CatalogTransaction for MemoryTransaction {
    async fn lock_items(&mut self, ids: &[&str]) -> Result<Vec<Item>, StoreError> {
        if self.lock_taken {
            return Err(StoreError::InvalidInput(
                "items already locked in this transaction".to_string(),
            ));
        }
        self.lock_taken = true;

        let mut found = Vec::with_capacity(ids.len());
        for id in lock_order(ids) {
            let Some(slot) = self.catalog.items.get(&id).cloned() else {
                continue;
            };
            let guard = slot.lock_owned().await;
            found.push(guard.clone());
            self.locked.insert(id, guard);
        }

        Ok(found)
    }

    async fn write_counters(&mut self, item: &Item) -> Result<(), StoreError> {
        if !self.locked.contains_key(&item.id) {
            return Err(StoreError::InvalidInput(format!(
                "item {} was not locked by this transaction",
                item.id
            )));
        }
        self.staged.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn append_vote(&mut self, vote: &Vote) -> Result<(), StoreError> {
        self.pending_votes.push(vote.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction {
            catalog,
            votes,
            mut locked,
            staged,
            pending_votes,
            ..
        } = *self;

        let mut log = votes.lock().await;
        for (id, item) in staged {
            if let Some(guard) = locked.get_mut(&id) {
                guard.wins = item.wins;
                guard.losses = item.losses;
                guard.total_votes = item.total_votes;
            }
        }
        log.extend(pending_votes);

        drop(log);
        drop(locked);
        drop(catalog);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, rank: Option<i32>) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            symbol: id.to_string(),
            name: id.to_string(),
            image: None,
            current_price: None,
            market_cap: None,
            market_cap_rank: rank,
            total_volume: None,
            price_change_24h: None,
            circulating_supply: None,
        }
    }

    #[tokio::test]
    async fn test_list_orders_by_rank_then_insertion() {
        let store = MemoryStore::with_records(vec![
            record("unranked", None),
            record("third", Some(3)),
            record("first", Some(1)),
            record("also-third", Some(3)),
        ])
        .await
        .unwrap();

        let ids: Vec<String> = store
            .list_items(OrderHint::MarketCapRank)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec!["first", "third", "also-third", "unranked"]);

        let inserted: Vec<String> = store
            .list_items(OrderHint::Insertion)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(inserted, vec!["unranked", "third", "first", "also-third"]);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryStore::with_records(vec![record("btc", Some(1))]).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            let mut items = tx.lock_items(&["btc"]).await.unwrap();
            items[0].record_win();
            tx.write_counters(&items[0]).await.unwrap();
            tx.append_vote(&Vote::new("btc", "eth")).await.unwrap();
        }

        let item = store.get_item("btc").await.unwrap().unwrap();
        assert_eq!(item.wins, 0);
        assert!(store.votes().await.is_empty());
    }

    #[tokio::test]
    async fn test_commit_applies_writes() {
        let store = MemoryStore::with_records(vec![record("btc", Some(1)), record("eth", Some(2))])
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let items = tx.lock_items(&["eth", "btc"]).await.unwrap();
        assert_eq!(items.len(), 2);
        let mut btc = items.iter().find(|i| i.id == "btc").cloned().unwrap();
        btc.record_win();
        tx.write_counters(&btc).await.unwrap();
        tx.append_vote(&Vote::new("btc", "eth")).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.get_item("btc").await.unwrap().unwrap().wins, 1);
        assert_eq!(store.votes().await.len(), 1);
    }

    #[tokio::test]
    async fn test_write_requires_lock() {
        let store = MemoryStore::with_records(vec![record("btc", Some(1))]).await.unwrap();
        let item = store.get_item("btc").await.unwrap().unwrap();

        let mut tx = store.begin().await.unwrap();
        let result = tx.write_counters(&item).await;
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_upsert_refreshes_metadata_only() {
        let store = MemoryStore::with_records(vec![record("btc", Some(1))]).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let mut items = tx.lock_items(&["btc"]).await.unwrap();
        items[0].record_loss();
        tx.write_counters(&items[0]).await.unwrap();
        tx.commit().await.unwrap();

        let mut refreshed = record("btc", Some(2));
        refreshed.name = "Bitcoin".to_string();
        let item = store.upsert_item(refreshed).await.unwrap();

        assert_eq!(item.name, "Bitcoin");
        assert_eq!(item.market_cap_rank, Some(2));
        assert_eq!(item.losses, 1);
        assert_eq!(store.item_count().await, 1);
    }
}
