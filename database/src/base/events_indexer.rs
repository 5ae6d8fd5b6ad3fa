use bigdecimal::BigDecimal;

use crate::models;

#[async_trait::async_trait]
pub trait EventsIndexerDbManager {
    async fn save_blocks(&self, blocks: Vec<models::Block>) -> anyhow::Result<()>;

    async fn save_chunks(&self, chunks: Vec<models::Chunk>) -> anyhow::Result<()>;

    async fn save_transactions(
        &self,
        transactions: Vec<models::Transaction>,
    ) -> anyhow::Result<()>;

    async fn save_receipts(&self, receipts: Vec<models::Receipt>) -> anyhow::Result<()>;

    async fn save_action_receipt_actions(
        &self,
        actions: Vec<models::ActionReceiptAction>,
    ) -> anyhow::Result<()>;

    async fn save_action_receipt_input_data(
        &self,
        input_data: Vec<models::ActionReceiptInputData>,
    ) -> anyhow::Result<()>;

    async fn save_action_receipt_output_data(
        &self,
        output_data: Vec<models::ActionReceiptOutputData>,
    ) -> anyhow::Result<()>;

    async fn save_execution_outcomes(
        &self,
        outcomes: Vec<models::ExecutionOutcome>,
    ) -> anyhow::Result<()>;

    async fn save_execution_outcome_receipts(
        &self,
        outcome_receipts: Vec<models::ExecutionOutcomeReceipt>,
    ) -> anyhow::Result<()>;

    async fn save_ft_events(&self, events: Vec<models::FtEvent>) -> anyhow::Result<()>;

    async fn save_nft_events(&self, events: Vec<models::NftEvent>) -> anyhow::Result<()>;

    async fn save_dex_events(&self, events: Vec<models::DexEvent>) -> anyhow::Result<()>;

    /// Inserts new pairs and refreshes prices of existing ones.
    async fn upsert_dex_pairs(&self, pairs: Vec<models::DexPair>) -> anyhow::Result<()>;

    /// Parent transaction hashes for receipts fed by the given data ids.
    async fn get_tx_hashes_by_input_data(
        &self,
        data_ids: Vec<String>,
        block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>>;

    /// Parent transaction hashes for receipts that promised the given data ids.
    async fn get_tx_hashes_by_output_data(
        &self,
        data_ids: Vec<String>,
        block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>>;

    /// Parent transaction hashes looked up through the outcome that produced
    /// the given receipts.
    async fn get_tx_hashes_by_produced_receipts(
        &self,
        receipt_ids: Vec<String>,
        block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>>;

    /// Transaction hashes for receipts the given transactions were converted into.
    async fn get_tx_hashes_by_converted_transactions(
        &self,
        receipt_ids: Vec<String>,
        block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>>;

    async fn get_dex_pairs(
        &self,
        contract: &str,
        pools: Vec<BigDecimal>,
    ) -> anyhow::Result<Vec<models::DexPairPrice>>;

    /// Latest known token price of the reference pair used for USD
    /// triangulation: `base` quoted in any of the given stable tokens.
    async fn get_reference_price_token(
        &self,
        contract: &str,
        base: &str,
        quotes: Vec<String>,
    ) -> anyhow::Result<Option<BigDecimal>>;

    async fn update_meta(&self, indexer_id: &str, block_height: u64) -> anyhow::Result<()>;

    async fn get_last_processed_block_height(&self, indexer_id: &str) -> anyhow::Result<u64>;
}
