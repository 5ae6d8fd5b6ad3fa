pub use clap::{Parser, Subcommand};

/// NEAR Events Indexer
/// Watches for stream of blocks from the chain and stores receipts, actions
/// and token events into the database
#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub(crate) struct Opts {
    #[clap(subcommand)]
    pub start_options: StartOptions,
}

#[allow(clippy::enum_variant_names)]
#[derive(Subcommand, Debug, Clone)]
pub enum StartOptions {
    FromBlock {
        height: u64,
    },
    FromInterruption {
        /// Fallback start block height if interruption is not found
        height: Option<u64>,
    },
    FromLatest,
}

pub(crate) async fn get_start_block_height(
    client: &reqwest::Client,
    blocks_url: &str,
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync),
    start_options: &StartOptions,
    indexer_id: &str,
) -> anyhow::Result<u64> {
    let start_block_height = match start_options {
        StartOptions::FromBlock { height } => *height,
        StartOptions::FromInterruption { height } => {
            if let Ok(block_height) = db_manager.get_last_processed_block_height(indexer_id).await
            {
                block_height
            } else if let Some(height) = height {
                *height
            } else {
                crate::streamer::fetch_final_block_height(client, blocks_url).await?
            }
        }
        StartOptions::FromLatest => {
            crate::streamer::fetch_final_block_height(client, blocks_url).await?
        }
    };
    // Start just a bit earlier to overlap indexed blocks to ensure we don't miss anything in-between
    Ok(start_block_height.saturating_sub(100))
}
