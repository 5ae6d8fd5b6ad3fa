use tokio_retry::{strategy::FixedInterval, Retry};

use indexer_primitives::views::BlockMessage;

/// Fixed pause between attempts to fetch the same block.
const FETCH_RETRY_INTERVAL_MILLIS: u64 = 500;

/// Spawns the block-fetching task and returns its handle together with the
/// channel the pipeline consumes. The task walks block heights sequentially
/// starting from `start_block_height` and stops once the receiver is dropped.
pub(crate) fn streamer(
    config: configuration::BlockStreamConfig,
    start_block_height: u64,
) -> (
    tokio::task::JoinHandle<anyhow::Result<()>>,
    tokio::sync::mpsc::Receiver<BlockMessage>,
) {
    let (sender, receiver) = tokio::sync::mpsc::channel(config.channel_size);
    let handle = tokio::spawn(start(sender, config, start_block_height));
    (handle, receiver)
}

async fn start(
    blocks_sink: tokio::sync::mpsc::Sender<BlockMessage>,
    config: configuration::BlockStreamConfig,
    start_block_height: u64,
) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let mut block_height = start_block_height;

    loop {
        // Heights skipped by the chain are served as JSON `null`.
        if let Some(block_message) =
            fetch_block_with_retry(&client, &config.blocks_url, block_height).await?
        {
            if blocks_sink.send(block_message).await.is_err() {
                tracing::debug!(
                    target: crate::INDEXER,
                    "Receiver dropped, stopping the block stream"
                );
                return Ok(());
            }
        }
        block_height += 1;
    }
}

// The retry strategy has no attempt cap, so this only returns once the block
// server answered; a lasting outage stalls the stream instead of skipping.
async fn fetch_block_with_retry(
    client: &reqwest::Client,
    blocks_url: &str,
    block_height: u64,
) -> anyhow::Result<Option<BlockMessage>> {
    let retry_strategy = FixedInterval::from_millis(FETCH_RETRY_INTERVAL_MILLIS);
    Retry::spawn(retry_strategy, || async {
        fetch_block(client, blocks_url, block_height)
            .await
            .map_err(|err| {
                tracing::warn!(
                    target: crate::INDEXER,
                    "Failed to fetch block {}, retrying: {:?}",
                    block_height,
                    err
                );
                err
            })
    })
    .await
}

async fn fetch_block(
    client: &reqwest::Client,
    blocks_url: &str,
    block_height: u64,
) -> anyhow::Result<Option<BlockMessage>> {
    let response = client
        .get(format!("{}/v0/block/{}", blocks_url, block_height))
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json::<Option<BlockMessage>>().await?)
}

pub(crate) async fn fetch_final_block_height(
    client: &reqwest::Client,
    blocks_url: &str,
) -> anyhow::Result<u64> {
    let message = client
        .get(format!("{}/v0/last_block/final", blocks_url))
        .send()
        .await?
        .error_for_status()?
        .json::<BlockMessage>()
        .await?;
    Ok(message.block.header.height)
}
