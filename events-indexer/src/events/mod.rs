pub(crate) mod ft;
pub(crate) mod nft;

use bigdecimal::BigDecimal;

use indexer_primitives::{views, EventType, ShardId};

/// Synthetic per-block event ordinal: shard first, then event family, then
/// position within the shard. Keeps events globally orderable inside a block
/// without a central sequence generator, and stable across re-runs.
pub(crate) fn compose_event_index(
    shard_id: ShardId,
    event_type: EventType,
    index_in_shard: u64,
) -> BigDecimal {
    BigDecimal::from(shard_id * 10u64.pow(15) + (event_type as u64) * 10u64.pow(10) + index_in_shard)
}

/// Extracts FT and NFT token events from every shard's execution outcomes
/// and stores them. Only successful outcomes produce rows.
pub(crate) async fn store_events(
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    block_message: &views::BlockMessage,
) -> anyhow::Result<()> {
    let header = &block_message.block.header;
    let mut ft_events = Vec::new();
    let mut nft_events = Vec::new();

    for shard in &block_message.shards {
        ft_events.extend(ft::extract_events(header, shard));
        nft_events.extend(nft::extract_events(header, shard));
    }

    crate::metrics::ROWS_WRITTEN_TOTAL
        .with_label_values(&["ft_events"])
        .inc_by(ft_events.len() as u64);
    crate::metrics::ROWS_WRITTEN_TOTAL
        .with_label_values(&["nft_events"])
        .inc_by(nft_events.len() as u64);

    futures::try_join!(
        db_manager.save_ft_events(ft_events),
        db_manager.save_nft_events(nft_events),
    )?;

    Ok(())
}
