use indexer_primitives::views;

/// Stores the block header row plus one row per chunk produced in the block.
/// Shards without a chunk (missed production) contribute nothing.
pub(crate) async fn store_block(
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    block_message: &views::BlockMessage,
) -> anyhow::Result<()> {
    let header = &block_message.block.header;
    let block = database::models::Block {
        author_account_id: block_message.block.author.clone(),
        block_hash: header.hash.clone(),
        block_height: header.height.into(),
        block_timestamp: header.timestamp_nanosec.into(),
        gas_price: header.gas_price.parse()?,
        prev_block_hash: header.prev_hash.clone(),
        total_supply: header.total_supply.parse()?,
    };

    let chunks: Vec<database::models::Chunk> = block_message
        .shards
        .iter()
        .filter_map(|shard| shard.chunk.as_ref())
        .map(|chunk| database::models::Chunk {
            author_account_id: chunk.author.clone(),
            chunk_hash: chunk.header.chunk_hash.clone(),
            gas_limit: chunk.header.gas_limit.into(),
            gas_used: chunk.header.gas_used.into(),
            included_in_block_hash: header.hash.clone(),
            included_in_block_timestamp: header.timestamp_nanosec.into(),
            shard_id: chunk.header.shard_id.into(),
        })
        .collect();

    crate::metrics::ROWS_WRITTEN_TOTAL
        .with_label_values(&["blocks"])
        .inc();
    crate::metrics::ROWS_WRITTEN_TOTAL
        .with_label_values(&["chunks"])
        .inc_by(chunks.len() as u64);

    futures::try_join!(
        db_manager.save_blocks(vec![block]),
        db_manager.save_chunks(chunks),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{self, TestDbManager};
    use bigdecimal::BigDecimal;

    #[tokio::test]
    async fn stores_header_and_produced_chunks_only() {
        let db_manager = TestDbManager::default();
        let mut block_message = testutils::block_message(100, "block-100");
        block_message.shards[1].chunk = None;

        store_block(&db_manager, &block_message).await.unwrap();

        let blocks = db_manager.blocks.lock().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_hash, "block-100");
        assert_eq!(blocks[0].block_height, BigDecimal::from(100));

        let chunks = db_manager.chunks.lock().unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].shard_id, BigDecimal::from(0));
        assert_eq!(chunks[0].included_in_block_hash, "block-100");
    }
}
