use indexer_primitives::{views, ExecutionOutcomeStatus};

use crate::resolver::TxHashCache;

/// One row per receipt execution outcome plus one row per (executed receipt,
/// produced receipt) edge. The edges also chain the resolver cache forward:
/// a produced receipt shares the parent transaction of the receipt whose
/// execution produced it.
pub(crate) async fn store_outcomes(
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    tx_cache: &TxHashCache,
    block_message: &views::BlockMessage,
) -> anyhow::Result<()> {
    let header = &block_message.block.header;
    let mut outcomes = Vec::new();
    let mut outcome_receipts = Vec::new();

    for shard in &block_message.shards {
        for (index_in_chunk, outcome) in shard.receipt_execution_outcomes.iter().enumerate() {
            let outcome_view = &outcome.execution_outcome;
            outcomes.push(database::models::ExecutionOutcome {
                executed_in_block_hash: outcome_view.block_hash.clone(),
                executed_in_block_timestamp: header.timestamp_nanosec.into(),
                executor_account_id: outcome_view.outcome.executor_id.clone(),
                gas_burnt: outcome_view.outcome.gas_burnt.into(),
                index_in_chunk: index_in_chunk as i32,
                receipt_id: outcome_view.id.clone(),
                shard_id: shard.shard_id.into(),
                status: ExecutionOutcomeStatus::from(&outcome_view.outcome.status).to_string(),
                tokens_burnt: outcome_view.outcome.tokens_burnt.parse()?,
            });

            for (receipt_index, produced_receipt_id) in
                outcome_view.outcome.receipt_ids.iter().enumerate()
            {
                outcome_receipts.push(database::models::ExecutionOutcomeReceipt {
                    executed_receipt_id: outcome_view.id.clone(),
                    index_in_execution_outcome: receipt_index as i32,
                    produced_receipt_id: produced_receipt_id.clone(),
                });
            }
        }
    }

    let executed_ids: Vec<String> = outcomes
        .iter()
        .map(|outcome| outcome.receipt_id.clone())
        .collect();
    let executed_hashes = tx_cache.get_many(&executed_ids).await;
    // An executed receipt missing from the cache is fine here: its produced
    // receipts will resolve through the database when they show up.
    let chained: Vec<(String, String)> = outcome_receipts
        .iter()
        .filter_map(|edge| {
            executed_hashes
                .get(&edge.executed_receipt_id)
                .map(|hash| (edge.produced_receipt_id.clone(), hash.clone()))
        })
        .collect();
    tx_cache.extend(chained).await;

    crate::metrics::ROWS_WRITTEN_TOTAL
        .with_label_values(&["execution_outcomes"])
        .inc_by(outcomes.len() as u64);
    crate::metrics::ROWS_WRITTEN_TOTAL
        .with_label_values(&["execution_outcome_receipts"])
        .inc_by(outcome_receipts.len() as u64);

    futures::try_join!(
        db_manager.save_execution_outcomes(outcomes),
        db_manager.save_execution_outcome_receipts(outcome_receipts),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{self, TestDbManager};
    use bigdecimal::BigDecimal;

    #[tokio::test]
    async fn stores_outcomes_and_chains_the_cache_to_produced_receipts() {
        let db_manager = TestDbManager::default();
        let tx_cache = TxHashCache::new(10);
        tx_cache.put("receipt-1".to_string(), "tx-1".to_string()).await;

        let mut block_message = testutils::block_message(100, "block-100");
        block_message.shards[0].receipt_execution_outcomes.push(
            testutils::execution_outcome(
                "receipt-1",
                "token.near",
                vec!["receipt-2", "receipt-3"],
                true,
                vec![],
            ),
        );

        store_outcomes(&db_manager, &tx_cache, &block_message)
            .await
            .unwrap();

        let outcomes = db_manager.outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].receipt_id, "receipt-1");
        assert_eq!(outcomes[0].executor_account_id, "token.near");
        assert_eq!(outcomes[0].status, "SUCCESS_VALUE");
        assert_eq!(outcomes[0].shard_id, BigDecimal::from(0));

        let edges = db_manager.outcome_receipts.lock().unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].produced_receipt_id, "receipt-2");
        assert_eq!(edges[0].index_in_execution_outcome, 0);
        assert_eq!(edges[1].produced_receipt_id, "receipt-3");

        let chained = tx_cache
            .get_many(&["receipt-2".to_string(), "receipt-3".to_string()])
            .await;
        assert_eq!(chained.get("receipt-2"), Some(&"tx-1".to_string()));
        assert_eq!(chained.get("receipt-3"), Some(&"tx-1".to_string()));
    }
}
