use std::collections::HashMap;

use indexer_primitives::{CryptoHash, ReceiptOrDataId, TransactionHash};

const RESOLVER: &str = "resolver";

/// A receipt whose parent transaction cannot be found leaves every row it
/// feeds unattributable, so the block must not be committed.
#[derive(thiserror::Error, Debug)]
#[error("unable to resolve parent transaction hash(es) for {0:?}")]
pub struct MissingParentTransaction(pub Vec<ReceiptOrDataId>);

/// In-memory map from receipt id (or data id) to the hash of the transaction
/// that ultimately caused it. Bounded LRU, the database is the fallback.
pub struct TxHashCache {
    entries: futures_locks::RwLock<lru::LruCache<ReceiptOrDataId, TransactionHash>>,
}

impl TxHashCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = std::num::NonZeroUsize::new(capacity.max(1))
            .expect("cache capacity is at least one");
        Self {
            entries: futures_locks::RwLock::new(lru::LruCache::new(capacity)),
        }
    }

    pub async fn put(&self, id: ReceiptOrDataId, transaction_hash: TransactionHash) {
        tracing::debug!(target: RESOLVER, "+H {} - {}", id, transaction_hash);
        self.entries.write().await.put(id, transaction_hash);
    }

    pub async fn extend(
        &self,
        entries: impl IntoIterator<Item = (ReceiptOrDataId, TransactionHash)>,
    ) {
        let mut guard = self.entries.write().await;
        for (id, transaction_hash) in entries {
            tracing::debug!(target: RESOLVER, "+H {} - {}", id, transaction_hash);
            guard.put(id, transaction_hash);
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // `LruCache::get` refreshes recency, hence the write lock.
    pub(crate) async fn get_many(
        &self,
        ids: &[ReceiptOrDataId],
    ) -> HashMap<ReceiptOrDataId, TransactionHash> {
        let mut guard = self.entries.write().await;
        ids.iter()
            .filter_map(|id| guard.get(id).map(|hash| (id.clone(), hash.clone())))
            .collect()
    }
}

/// Maps every given receipt or data id to its parent transaction hash.
///
/// The cache covers the common case. Ids the cache doesn't know (receipts
/// created before the indexer started, or evicted under memory pressure) are
/// chased through the database in the order the chain links them:
/// the data that fed the receipt, the data the receipt promised, the outcome
/// that produced the receipt, and finally the transaction it was converted
/// from. Each step only queries the ids the previous steps left unresolved.
pub(crate) async fn resolve_parent_transaction_hashes(
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    tx_cache: &TxHashCache,
    block_hash: &CryptoHash,
    block_timestamp: u64,
    ids: Vec<ReceiptOrDataId>,
) -> anyhow::Result<HashMap<ReceiptOrDataId, TransactionHash>> {
    let mut ids = ids;
    ids.sort_unstable();
    ids.dedup();

    let mut resolved = tx_cache.get_many(&ids).await;
    if resolved.len() == ids.len() {
        return Ok(resolved);
    }

    tracing::warn!(
        target: RESOLVER,
        "Block {}: {} receipt(s) not in the tx hash cache, falling back to the database",
        block_hash,
        ids.len() - resolved.len(),
    );
    crate::metrics::TX_CACHE_MISSES_TOTAL.inc();

    let remaining = unresolved_ids(&ids, &resolved);
    resolved.extend(
        db_manager
            .get_tx_hashes_by_input_data(remaining, block_timestamp)
            .await?,
    );

    let remaining = unresolved_ids(&ids, &resolved);
    if !remaining.is_empty() {
        resolved.extend(
            db_manager
                .get_tx_hashes_by_output_data(remaining, block_timestamp)
                .await?,
        );
    }

    let remaining = unresolved_ids(&ids, &resolved);
    if !remaining.is_empty() {
        resolved.extend(
            db_manager
                .get_tx_hashes_by_produced_receipts(remaining, block_timestamp)
                .await?,
        );
    }

    let remaining = unresolved_ids(&ids, &resolved);
    if !remaining.is_empty() {
        resolved.extend(
            db_manager
                .get_tx_hashes_by_converted_transactions(remaining, block_timestamp)
                .await?,
        );
    }

    let remaining = unresolved_ids(&ids, &resolved);
    if !remaining.is_empty() {
        return Err(MissingParentTransaction(remaining).into());
    }

    tx_cache
        .extend(resolved.iter().map(|(id, hash)| (id.clone(), hash.clone())))
        .await;

    Ok(resolved)
}

fn unresolved_ids(
    ids: &[ReceiptOrDataId],
    resolved: &HashMap<ReceiptOrDataId, TransactionHash>,
) -> Vec<ReceiptOrDataId> {
    ids.iter()
        .filter(|id| !resolved.contains_key(*id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::TestDbManager;

    #[tokio::test]
    async fn cache_evicts_least_recently_used() {
        let cache = TxHashCache::new(2);
        cache.put("receipt-1".to_string(), "tx-1".to_string()).await;
        cache.put("receipt-2".to_string(), "tx-2".to_string()).await;
        cache.put("receipt-3".to_string(), "tx-3".to_string()).await;

        assert_eq!(cache.len().await, 2);
        let hits = cache
            .get_many(&["receipt-1".to_string(), "receipt-3".to_string()])
            .await;
        assert!(!hits.contains_key("receipt-1"));
        assert_eq!(hits.get("receipt-3"), Some(&"tx-3".to_string()));
    }

    #[tokio::test]
    async fn resolves_from_cache_without_touching_the_database() {
        let db_manager = TestDbManager::default();
        let cache = TxHashCache::new(10);
        cache.put("receipt-1".to_string(), "tx-1".to_string()).await;
        cache.put("receipt-2".to_string(), "tx-2".to_string()).await;

        let resolved = resolve_parent_transaction_hashes(
            &db_manager,
            &cache,
            &"block-hash".to_string(),
            1_718_714_464_432_560_897,
            vec![
                "receipt-1".to_string(),
                "receipt-2".to_string(),
                "receipt-1".to_string(),
            ],
        )
        .await
        .unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.get("receipt-1"), Some(&"tx-1".to_string()));
        assert!(db_manager.tx_hash_lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn falls_back_through_database_lookups_in_order() {
        let db_manager = TestDbManager::default();
        db_manager.seed_tx_hash_by_produced_receipt("receipt-old", "tx-old");
        let cache = TxHashCache::new(10);
        cache.put("receipt-new".to_string(), "tx-new".to_string()).await;

        let resolved = resolve_parent_transaction_hashes(
            &db_manager,
            &cache,
            &"block-hash".to_string(),
            1_718_714_464_432_560_897,
            vec!["receipt-new".to_string(), "receipt-old".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(resolved.get("receipt-old"), Some(&"tx-old".to_string()));
        // Only the unresolved id reaches the database, and the lookup chain
        // stops once everything is resolved.
        assert_eq!(
            *db_manager.tx_hash_lookups.lock().unwrap(),
            vec![
                ("input_data".to_string(), vec!["receipt-old".to_string()]),
                ("output_data".to_string(), vec!["receipt-old".to_string()]),
                (
                    "produced_receipts".to_string(),
                    vec!["receipt-old".to_string()]
                ),
            ]
        );

        // The database answer is cached for the next block.
        let hits = cache.get_many(&["receipt-old".to_string()]).await;
        assert_eq!(hits.get("receipt-old"), Some(&"tx-old".to_string()));
    }

    #[tokio::test]
    async fn unresolvable_ids_are_a_hard_error() {
        let db_manager = TestDbManager::default();
        let cache = TxHashCache::new(10);

        let error = resolve_parent_transaction_hashes(
            &db_manager,
            &cache,
            &"block-hash".to_string(),
            1_718_714_464_432_560_897,
            vec!["receipt-lost".to_string()],
        )
        .await
        .unwrap_err();

        let missing = error
            .downcast::<MissingParentTransaction>()
            .expect("should be a missing parent transaction error");
        assert_eq!(missing.0, vec!["receipt-lost".to_string()]);
    }
}
