use anyhow::Context;

use indexer_primitives::{views, ExecutionOutcomeStatus};

use crate::resolver::TxHashCache;

/// One row per signed transaction found in the block's chunks. The receipt
/// every transaction converts into seeds the resolver cache, so receipts of
/// the following blocks find their parent without a database round trip.
pub(crate) async fn store_transactions(
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    tx_cache: &TxHashCache,
    block_message: &views::BlockMessage,
) -> anyhow::Result<()> {
    let header = &block_message.block.header;
    let mut transactions = Vec::new();
    let mut cache_entries = Vec::new();

    for shard in &block_message.shards {
        let Some(chunk) = &shard.chunk else { continue };
        for (index_in_chunk, transaction) in chunk.transactions.iter().enumerate() {
            let outcome = &transaction.outcome.execution_outcome.outcome;
            let converted_into_receipt_id = outcome
                .receipt_ids
                .first()
                .with_context(|| {
                    format!(
                        "transaction {} was not converted into a receipt",
                        transaction.transaction.hash
                    )
                })?
                .clone();

            cache_entries.push((
                converted_into_receipt_id.clone(),
                transaction.transaction.hash.clone(),
            ));
            transactions.push(database::models::Transaction {
                block_timestamp: header.timestamp_nanosec.into(),
                converted_into_receipt_id,
                included_in_block_hash: header.hash.clone(),
                included_in_chunk_hash: chunk.header.chunk_hash.clone(),
                index_in_chunk: index_in_chunk as i32,
                receipt_conversion_gas_burnt: outcome.gas_burnt.into(),
                receipt_conversion_tokens_burnt: outcome.tokens_burnt.parse()?,
                receiver_account_id: transaction.transaction.receiver_id.clone(),
                signer_account_id: transaction.transaction.signer_id.clone(),
                status: ExecutionOutcomeStatus::from(&outcome.status).to_string(),
                transaction_hash: transaction.transaction.hash.clone(),
            });
        }
    }

    tx_cache.extend(cache_entries).await;

    crate::metrics::ROWS_WRITTEN_TOTAL
        .with_label_values(&["transactions"])
        .inc_by(transactions.len() as u64);
    db_manager.save_transactions(transactions).await
}
