use clap::Parser;
use futures::StreamExt;

use crate::config::Opts;
use crate::resolver::TxHashCache;

mod actions;
mod blocks;
mod config;
mod dex;
mod events;
mod metrics;
mod outcomes;
mod receipts;
mod resolver;
mod streamer;
#[cfg(test)]
mod testutils;
mod transactions;

#[macro_use]
extern crate lazy_static;

// Target for tracing logs
pub(crate) const INDEXER: &str = "events_indexer";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    configuration::init_tracing(INDEXER)?;
    let indexer_config =
        configuration::read_configuration::<configuration::EventsIndexerConfig>().await?;
    let opts: Opts = Opts::parse();

    tracing::info!(target: INDEXER, "Connecting to the database...");
    let db_manager =
        database::prepare_db_manager::<database::PostgresDBManager>(&indexer_config.database)
            .await?;

    let client = reqwest::Client::new();
    let start_block_height = config::get_start_block_height(
        &client,
        &indexer_config.block_stream.blocks_url,
        &db_manager,
        &opts.start_options,
        &indexer_config.general.indexer_id,
    )
    .await?;
    tracing::info!(
        target: INDEXER,
        "Starting {} from block {}",
        indexer_config.general.indexer_id,
        start_block_height
    );

    let tx_cache = TxHashCache::new(indexer_config.general.tx_hash_cache_size);
    let (sender, stream) =
        streamer::streamer(indexer_config.block_stream.clone(), start_block_height);

    // Initiate metrics http server
    tokio::spawn(
        metrics::init_server(indexer_config.general.metrics_server_port)
            .expect("Failed to start metrics server"),
    );

    let stats = std::sync::Arc::new(tokio::sync::RwLock::new(metrics::Stats::new()));
    tokio::spawn(metrics::state_logger(
        std::sync::Arc::clone(&stats),
        indexer_config.block_stream.clone(),
    ));

    // Blocks are handled strictly one at a time: receipts of block N+1 find
    // their parent transaction hashes through the rows and cache entries
    // written for block N.
    let mut handlers = tokio_stream::wrappers::ReceiverStream::new(stream)
        .map(|block_message| {
            handle_block_message(
                block_message,
                &db_manager,
                &tx_cache,
                &indexer_config,
                std::sync::Arc::clone(&stats),
            )
        })
        .buffer_unordered(1usize);

    while let Some(handled_block) = handlers.next().await {
        if let Err(err) = handled_block {
            // Writes are idempotent, so the failed block replays safely
            // after a restart from interruption.
            tracing::error!(target: INDEXER, "Stopping the indexer: {:?}", err);
            return Err(err);
        }
    }
    drop(handlers); // close the channel so the sender will stop

    // propagate errors from the sender
    match sender.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(e) => Err(anyhow::Error::from(e)), // JoinError
    }
}

async fn handle_block_message(
    block_message: indexer_primitives::views::BlockMessage,
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    tx_cache: &TxHashCache,
    indexer_config: &configuration::EventsIndexerConfig,
    stats: std::sync::Arc<tokio::sync::RwLock<metrics::Stats>>,
) -> anyhow::Result<u64> {
    let block_height = block_message.block.header.height;
    tracing::debug!(target: INDEXER, "Block {}", block_height);

    stats
        .write()
        .await
        .block_heights_processing
        .insert(block_height);

    // Stage order follows data lineage: transactions seed the resolver cache
    // with their converted receipts, receipts add the data ids they promise,
    // outcomes chain the produced receipts forward.
    blocks::store_block(db_manager, &block_message).await?;
    transactions::store_transactions(db_manager, tx_cache, &block_message).await?;
    receipts::store_receipts(db_manager, tx_cache, &block_message).await?;
    outcomes::store_outcomes(db_manager, tx_cache, &block_message).await?;
    events::store_events(db_manager, &block_message).await?;
    dex::store_dex_events(db_manager, &indexer_config.general.chain_id, &block_message).await?;

    db_manager
        .update_meta(&indexer_config.general.indexer_id, block_height)
        .await?;

    metrics::BLOCK_PROCESSED_TOTAL.inc();
    // Prometheus Gauge Metric type do not support u64
    // https://github.com/tikv/rust-prometheus/issues/470
    metrics::LATEST_BLOCK_HEIGHT.set(i64::try_from(block_height)?);
    metrics::TX_HASHES_IN_CACHE.set(tx_cache.len().await as i64);

    let mut stats_lock = stats.write().await;
    stats_lock.block_heights_processing.remove(&block_height);
    stats_lock.blocks_processed_count += 1;
    stats_lock.last_processed_block_height = block_height;

    Ok(block_height)
}
