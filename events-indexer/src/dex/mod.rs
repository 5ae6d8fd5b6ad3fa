pub(crate) mod ref_finance;

use indexer_primitives::views;

/// Wrapped NEAR, the quote side of the reference pair used for USD pricing.
pub(crate) const WRAP_NEAR: &str = "wrap.near";

/// Stablecoins treated as 1 USD when they sit on the quote side of a pair:
/// native USDt, USDC, and their bridged (factory.bridge.near) versions.
pub(crate) const STABLE_TOKENS: [&str; 4] = [
    "usdt.tether-token.near",
    "17208628f84f5d6ad33f0da3bbbeb27ffcb398eac501a31bd6ad2011e36133a1",
    "dac17f958d2ee523a2206206994597c13d831ec7.factory.bridge.near",
    "a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48.factory.bridge.near",
];

/// Extracts and stores swaps from the DEX contracts deployed on the current
/// chain. The tracked contracts live on mainnet only, so other chains are a
/// no-op.
pub(crate) async fn store_dex_events(
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    chain_id: &configuration::ChainId,
    block_message: &views::BlockMessage,
) -> anyhow::Result<()> {
    match chain_id {
        configuration::ChainId::Mainnet => ref_finance::sync(db_manager, block_message).await,
        _ => Ok(()),
    }
}
