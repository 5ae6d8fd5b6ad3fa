use anyhow::Context;
use futures::future::try_join_all;

use indexer_primitives::views;

use crate::resolver::TxHashCache;

#[derive(Default)]
struct ChunkRows {
    receipts: Vec<database::models::Receipt>,
    actions: Vec<database::models::ActionReceiptAction>,
    input_data: Vec<database::models::ActionReceiptInputData>,
    output_data: Vec<database::models::ActionReceiptOutputData>,
    // Data ids this chunk's receipts promised, mapped to the parent hash.
    // Cached so the data receipts land already resolved when they arrive.
    cache_entries: Vec<(String, String)>,
}

/// Persists receipts with their actions and data-dependency edges. Every
/// receipt is attributed to its parent transaction; a receipt that cannot be
/// attributed aborts the whole block.
pub(crate) async fn store_receipts(
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    tx_cache: &TxHashCache,
    block_message: &views::BlockMessage,
) -> anyhow::Result<()> {
    let header = &block_message.block.header;
    let chunk_rows = try_join_all(
        block_message
            .shards
            .iter()
            .filter_map(|shard| shard.chunk.as_ref())
            .map(|chunk| store_chunk_receipts(db_manager, tx_cache, header, chunk)),
    )
    .await?;

    let mut receipts = Vec::new();
    let mut actions = Vec::new();
    let mut input_data = Vec::new();
    let mut output_data = Vec::new();
    let mut cache_entries = Vec::new();
    for rows in chunk_rows {
        receipts.extend(rows.receipts);
        actions.extend(rows.actions);
        input_data.extend(rows.input_data);
        output_data.extend(rows.output_data);
        cache_entries.extend(rows.cache_entries);
    }

    tx_cache.extend(cache_entries).await;

    for (table, count) in [
        ("receipts", receipts.len()),
        ("action_receipt_actions", actions.len()),
        ("action_receipt_input_data", input_data.len()),
        ("action_receipt_output_data", output_data.len()),
    ] {
        crate::metrics::ROWS_WRITTEN_TOTAL
            .with_label_values(&[table])
            .inc_by(count as u64);
    }

    futures::try_join!(
        db_manager.save_receipts(receipts),
        db_manager.save_action_receipt_actions(actions),
        db_manager.save_action_receipt_input_data(input_data),
        db_manager.save_action_receipt_output_data(output_data),
    )?;

    Ok(())
}

async fn store_chunk_receipts(
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    tx_cache: &TxHashCache,
    header: &views::BlockHeaderView,
    chunk: &views::ChunkView,
) -> anyhow::Result<ChunkRows> {
    // Experimental receipt kinds are skipped entirely, they have no
    // discoverable parent transaction.
    let ids: Vec<String> = chunk
        .receipts
        .iter()
        .filter(|receipt| receipt.kind().is_some())
        .map(views::ReceiptView::receipt_or_data_id)
        .collect();
    if ids.is_empty() {
        return Ok(ChunkRows::default());
    }

    let parent_tx_hashes = crate::resolver::resolve_parent_transaction_hashes(
        db_manager,
        tx_cache,
        &header.hash,
        header.timestamp_nanosec,
        ids,
    )
    .await?;

    let mut rows = ChunkRows::default();
    let mut index_in_chunk = 0;
    for receipt in &chunk.receipts {
        let Some(kind) = receipt.kind() else { continue };
        let receipt_or_data_id = receipt.receipt_or_data_id();
        let parent_tx_hash = parent_tx_hashes
            .get(&receipt_or_data_id)
            .with_context(|| format!("receipt {} left unresolved", receipt_or_data_id))?
            .clone();

        if let views::ReceiptEnumView::Action(action_receipt) = &receipt.receipt {
            for data_id in &action_receipt.input_data_ids {
                rows.input_data.push(database::models::ActionReceiptInputData {
                    input_data_id: data_id.clone(),
                    input_to_receipt_id: receipt.receipt_id.clone(),
                });
            }
            for receiver in &action_receipt.output_data_receivers {
                rows.cache_entries
                    .push((receiver.data_id.clone(), parent_tx_hash.clone()));
                rows.output_data
                    .push(database::models::ActionReceiptOutputData {
                        output_data_id: receiver.data_id.clone(),
                        output_from_receipt_id: receipt.receipt_id.clone(),
                        receiver_account_id: receiver.receiver_id.clone(),
                    });
            }
            for (index, action) in crate::actions::flatten_actions(&action_receipt.actions)
                .into_iter()
                .enumerate()
            {
                rows.actions.push(database::models::ActionReceiptAction {
                    action_kind: action.kind.to_string(),
                    args: action.args,
                    index_in_action_receipt: index as i32,
                    nep518_rlp_hash: action.nep518_rlp_hash,
                    receipt_id: receipt.receipt_id.clone(),
                    receipt_included_in_block_timestamp: header.timestamp_nanosec.into(),
                    receipt_predecessor_account_id: receipt.predecessor_id.clone(),
                    receipt_receiver_account_id: receipt.receiver_id.clone(),
                });
            }
        }

        rows.receipts.push(database::models::Receipt {
            included_in_block_hash: header.hash.clone(),
            included_in_block_timestamp: header.timestamp_nanosec.into(),
            included_in_chunk_hash: chunk.header.chunk_hash.clone(),
            index_in_chunk,
            originated_from_transaction_hash: parent_tx_hash,
            predecessor_account_id: receipt.predecessor_id.clone(),
            receipt_id: receipt.receipt_id.clone(),
            receipt_kind: kind.to_string(),
            receiver_account_id: receipt.receiver_id.clone(),
        });
        index_in_chunk += 1;
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{self, TestDbManager};

    #[tokio::test]
    async fn stores_action_receipts_with_their_actions_and_edges() {
        let db_manager = TestDbManager::default();
        let tx_cache = TxHashCache::new(10);
        tx_cache.put("receipt-1".to_string(), "tx-1".to_string()).await;

        let mut block_message = testutils::block_message(100, "block-100");
        let mut receipt = testutils::action_receipt("receipt-1", "alice.near", "token.near");
        if let views::ReceiptEnumView::Action(action_receipt) = &mut receipt.receipt {
            action_receipt.output_data_receivers.push(views::DataReceiverView {
                data_id: "data-1".to_string(),
                receiver_id: "alice.near".to_string(),
            });
            action_receipt.actions.push(views::ActionView::Transfer {
                deposit: "100".to_string(),
            });
        }
        block_message.shards[0]
            .chunk
            .as_mut()
            .unwrap()
            .receipts
            .push(receipt);

        store_receipts(&db_manager, &tx_cache, &block_message)
            .await
            .unwrap();

        let receipts = db_manager.receipts.lock().unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].receipt_id, "receipt-1");
        assert_eq!(receipts[0].originated_from_transaction_hash, "tx-1");
        assert_eq!(receipts[0].receipt_kind, "ACTION");
        assert_eq!(receipts[0].index_in_chunk, 0);

        let actions = db_manager.actions.lock().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_kind, "TRANSFER");
        assert_eq!(actions[0].index_in_action_receipt, 0);

        let output_data = db_manager.output_data.lock().unwrap();
        assert_eq!(output_data.len(), 1);
        assert_eq!(output_data[0].output_data_id, "data-1");

        // The promised data id resolves through the cache from now on.
        assert_eq!(tx_cache.len().await, 2);
    }

    #[tokio::test]
    async fn data_receipts_resolve_by_data_id_but_store_their_own_id() {
        let db_manager = TestDbManager::default();
        let tx_cache = TxHashCache::new(10);
        tx_cache.put("data-1".to_string(), "tx-1".to_string()).await;

        let mut block_message = testutils::block_message(100, "block-100");
        block_message.shards[0]
            .chunk
            .as_mut()
            .unwrap()
            .receipts
            .push(testutils::data_receipt("receipt-2", "data-1", "token.near"));

        store_receipts(&db_manager, &tx_cache, &block_message)
            .await
            .unwrap();

        let receipts = db_manager.receipts.lock().unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].receipt_id, "receipt-2");
        assert_eq!(receipts[0].receipt_kind, "DATA");
        assert_eq!(receipts[0].originated_from_transaction_hash, "tx-1");
    }

    #[tokio::test]
    async fn unresolvable_receipt_aborts_the_block() {
        let db_manager = TestDbManager::default();
        let tx_cache = TxHashCache::new(10);

        let mut block_message = testutils::block_message(100, "block-100");
        block_message.shards[0]
            .chunk
            .as_mut()
            .unwrap()
            .receipts
            .push(testutils::action_receipt("receipt-orphan", "a.near", "b.near"));

        let error = store_receipts(&db_manager, &tx_cache, &block_message)
            .await
            .unwrap_err();
        assert!(error
            .downcast_ref::<crate::resolver::MissingParentTransaction>()
            .is_some());
        assert!(db_manager.receipts.lock().unwrap().is_empty());
    }
}
