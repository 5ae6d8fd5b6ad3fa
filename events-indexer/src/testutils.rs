use std::collections::HashMap;
use std::sync::Mutex;

use bigdecimal::BigDecimal;

use database::models;
use indexer_primitives::views;

/// In-memory stand-in for the database: writes land in vectors, lookups
/// answer from seeded maps and record which strategy was queried with
/// which ids.
#[derive(Default)]
pub(crate) struct TestDbManager {
    pub blocks: Mutex<Vec<models::Block>>,
    pub chunks: Mutex<Vec<models::Chunk>>,
    pub transactions: Mutex<Vec<models::Transaction>>,
    pub receipts: Mutex<Vec<models::Receipt>>,
    pub actions: Mutex<Vec<models::ActionReceiptAction>>,
    pub input_data: Mutex<Vec<models::ActionReceiptInputData>>,
    pub output_data: Mutex<Vec<models::ActionReceiptOutputData>>,
    pub outcomes: Mutex<Vec<models::ExecutionOutcome>>,
    pub outcome_receipts: Mutex<Vec<models::ExecutionOutcomeReceipt>>,
    pub ft_events: Mutex<Vec<models::FtEvent>>,
    pub nft_events: Mutex<Vec<models::NftEvent>>,
    pub dex_events: Mutex<Vec<models::DexEvent>>,
    pub dex_pairs_upserted: Mutex<Vec<models::DexPair>>,
    pub tx_hash_lookups: Mutex<Vec<(String, Vec<String>)>>,
    pub tx_hashes_by_produced_receipt: Mutex<HashMap<String, String>>,
    pub dex_pairs: Mutex<Vec<models::DexPairPrice>>,
    pub reference_price: Mutex<Option<BigDecimal>>,
    pub meta: Mutex<HashMap<String, u64>>,
}

impl TestDbManager {
    pub(crate) fn seed_tx_hash_by_produced_receipt(&self, receipt_id: &str, tx_hash: &str) {
        self.tx_hashes_by_produced_receipt
            .lock()
            .unwrap()
            .insert(receipt_id.to_string(), tx_hash.to_string());
    }

    pub(crate) fn seed_dex_pair(&self, pair: models::DexPairPrice) {
        self.dex_pairs.lock().unwrap().push(pair);
    }

    pub(crate) fn set_reference_price(&self, price: BigDecimal) {
        *self.reference_price.lock().unwrap() = Some(price);
    }
}

#[async_trait::async_trait]
impl database::EventsIndexerDbManager for TestDbManager {
    async fn save_blocks(&self, blocks: Vec<models::Block>) -> anyhow::Result<()> {
        self.blocks.lock().unwrap().extend(blocks);
        Ok(())
    }

    async fn save_chunks(&self, chunks: Vec<models::Chunk>) -> anyhow::Result<()> {
        self.chunks.lock().unwrap().extend(chunks);
        Ok(())
    }

    async fn save_transactions(
        &self,
        transactions: Vec<models::Transaction>,
    ) -> anyhow::Result<()> {
        self.transactions.lock().unwrap().extend(transactions);
        Ok(())
    }

    async fn save_receipts(&self, receipts: Vec<models::Receipt>) -> anyhow::Result<()> {
        self.receipts.lock().unwrap().extend(receipts);
        Ok(())
    }

    async fn save_action_receipt_actions(
        &self,
        actions: Vec<models::ActionReceiptAction>,
    ) -> anyhow::Result<()> {
        self.actions.lock().unwrap().extend(actions);
        Ok(())
    }

    async fn save_action_receipt_input_data(
        &self,
        input_data: Vec<models::ActionReceiptInputData>,
    ) -> anyhow::Result<()> {
        self.input_data.lock().unwrap().extend(input_data);
        Ok(())
    }

    async fn save_action_receipt_output_data(
        &self,
        output_data: Vec<models::ActionReceiptOutputData>,
    ) -> anyhow::Result<()> {
        self.output_data.lock().unwrap().extend(output_data);
        Ok(())
    }

    async fn save_execution_outcomes(
        &self,
        outcomes: Vec<models::ExecutionOutcome>,
    ) -> anyhow::Result<()> {
        self.outcomes.lock().unwrap().extend(outcomes);
        Ok(())
    }

    async fn save_execution_outcome_receipts(
        &self,
        outcome_receipts: Vec<models::ExecutionOutcomeReceipt>,
    ) -> anyhow::Result<()> {
        self.outcome_receipts.lock().unwrap().extend(outcome_receipts);
        Ok(())
    }

    async fn save_ft_events(&self, events: Vec<models::FtEvent>) -> anyhow::Result<()> {
        self.ft_events.lock().unwrap().extend(events);
        Ok(())
    }

    async fn save_nft_events(&self, events: Vec<models::NftEvent>) -> anyhow::Result<()> {
        self.nft_events.lock().unwrap().extend(events);
        Ok(())
    }

    async fn save_dex_events(&self, events: Vec<models::DexEvent>) -> anyhow::Result<()> {
        self.dex_events.lock().unwrap().extend(events);
        Ok(())
    }

    async fn upsert_dex_pairs(&self, pairs: Vec<models::DexPair>) -> anyhow::Result<()> {
        self.dex_pairs_upserted.lock().unwrap().extend(pairs);
        Ok(())
    }

    async fn get_tx_hashes_by_input_data(
        &self,
        data_ids: Vec<String>,
        _block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>> {
        self.tx_hash_lookups
            .lock()
            .unwrap()
            .push(("input_data".to_string(), data_ids));
        Ok(vec![])
    }

    async fn get_tx_hashes_by_output_data(
        &self,
        data_ids: Vec<String>,
        _block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>> {
        self.tx_hash_lookups
            .lock()
            .unwrap()
            .push(("output_data".to_string(), data_ids));
        Ok(vec![])
    }

    async fn get_tx_hashes_by_produced_receipts(
        &self,
        receipt_ids: Vec<String>,
        _block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>> {
        self.tx_hash_lookups
            .lock()
            .unwrap()
            .push(("produced_receipts".to_string(), receipt_ids.clone()));
        let canned = self.tx_hashes_by_produced_receipt.lock().unwrap();
        Ok(receipt_ids
            .into_iter()
            .filter_map(|id| canned.get(&id).map(|hash| (id, hash.clone())))
            .collect())
    }

    async fn get_tx_hashes_by_converted_transactions(
        &self,
        receipt_ids: Vec<String>,
        _block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>> {
        self.tx_hash_lookups
            .lock()
            .unwrap()
            .push(("converted_transactions".to_string(), receipt_ids));
        Ok(vec![])
    }

    async fn get_dex_pairs(
        &self,
        _contract: &str,
        pools: Vec<BigDecimal>,
    ) -> anyhow::Result<Vec<models::DexPairPrice>> {
        Ok(self
            .dex_pairs
            .lock()
            .unwrap()
            .iter()
            .filter(|pair| pools.contains(&pair.pool))
            .cloned()
            .collect())
    }

    async fn get_reference_price_token(
        &self,
        _contract: &str,
        _base: &str,
        _quotes: Vec<String>,
    ) -> anyhow::Result<Option<BigDecimal>> {
        Ok(self.reference_price.lock().unwrap().clone())
    }

    async fn update_meta(&self, indexer_id: &str, block_height: u64) -> anyhow::Result<()> {
        self.meta
            .lock()
            .unwrap()
            .insert(indexer_id.to_string(), block_height);
        Ok(())
    }

    async fn get_last_processed_block_height(&self, indexer_id: &str) -> anyhow::Result<u64> {
        self.meta
            .lock()
            .unwrap()
            .get(indexer_id)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no saved block height for {}", indexer_id))
    }
}

/// Block with two shards, both carrying an empty chunk.
pub(crate) fn block_message(height: u64, hash: &str) -> views::BlockMessage {
    let shards: Vec<views::ShardView> = (0..2)
        .map(|shard_id| views::ShardView {
            shard_id,
            chunk: Some(views::ChunkView {
                author: "validator.near".to_string(),
                header: chunk_header(shard_id, height, hash),
                receipts: vec![],
                transactions: vec![],
            }),
            receipt_execution_outcomes: vec![],
        })
        .collect();

    views::BlockMessage {
        block: views::BlockView {
            author: "validator.near".to_string(),
            chunks: shards
                .iter()
                .filter_map(|shard| shard.chunk.as_ref())
                .map(|chunk| chunk.header.clone())
                .collect(),
            header: views::BlockHeaderView {
                height,
                hash: hash.to_string(),
                prev_hash: format!("prev-{}", hash),
                timestamp_nanosec: 1_718_714_464_432_560_897,
                gas_price: "100000000".to_string(),
                total_supply: "1190259482207641611109710230734861".to_string(),
            },
        },
        shards,
    }
}

fn chunk_header(shard_id: u64, height: u64, block_hash: &str) -> views::ChunkHeaderView {
    views::ChunkHeaderView {
        chunk_hash: format!("chunk-{}-{}", shard_id, block_hash),
        prev_block_hash: format!("prev-{}", block_hash),
        shard_id,
        height_created: height,
        height_included: height,
        gas_limit: 1_000_000_000_000_000,
        gas_used: 400_000_000_000,
    }
}

pub(crate) fn transaction(
    hash: &str,
    signer: &str,
    converted_into_receipt_id: &str,
) -> views::IndexerTransactionWithOutcome {
    views::IndexerTransactionWithOutcome {
        transaction: views::SignedTransactionView {
            hash: hash.to_string(),
            nonce: 1,
            signer_id: signer.to_string(),
            public_key: "ed25519:6E8sCci9badyRkXb3JoRpBj5p8C6Tw41ELDZoiihKEtp".to_string(),
            receiver_id: "token.near".to_string(),
            signature: "ed25519:signature".to_string(),
            actions: vec![views::ActionView::Transfer {
                deposit: "1000000000000000000000000".to_string(),
            }],
            priority_fee: None,
        },
        outcome: views::ExecutionOutcomeWithReceiptView {
            execution_outcome: views::ExecutionOutcomeView {
                id: format!("outcome-{}", hash),
                block_hash: "block-100".to_string(),
                outcome: views::OutcomeView {
                    executor_id: signer.to_string(),
                    gas_burnt: 223_182_562_500,
                    tokens_burnt: "22318256250000000000".to_string(),
                    logs: vec![],
                    receipt_ids: vec![converted_into_receipt_id.to_string()],
                    status: views::ExecutionStatusView::SuccessValue(String::new()),
                },
            },
            receipt: None,
        },
    }
}

/// Action receipt with no actions attached; tests push what they need.
pub(crate) fn action_receipt(receipt_id: &str, predecessor: &str, receiver: &str) -> views::ReceiptView {
    views::ReceiptView {
        predecessor_id: predecessor.to_string(),
        receiver_id: receiver.to_string(),
        receipt_id: receipt_id.to_string(),
        receipt: views::ReceiptEnumView::Action(views::ActionReceiptView {
            signer_id: "signer.near".to_string(),
            signer_public_key: "ed25519:6E8sCci9badyRkXb3JoRpBj5p8C6Tw41ELDZoiihKEtp".to_string(),
            gas_price: "625040174".to_string(),
            input_data_ids: vec![],
            output_data_receivers: vec![],
            actions: vec![],
        }),
    }
}

pub(crate) fn data_receipt(receipt_id: &str, data_id: &str, receiver: &str) -> views::ReceiptView {
    views::ReceiptView {
        predecessor_id: "system".to_string(),
        receiver_id: receiver.to_string(),
        receipt_id: receipt_id.to_string(),
        receipt: views::ReceiptEnumView::Data(views::DataReceiptView {
            data_id: data_id.to_string(),
            data: None,
        }),
    }
}

/// Execution outcome of `receipt_id` at `executor_id`, carrying the receipt
/// itself (predecessor `predecessor.near`, signer `signer.near`).
pub(crate) fn execution_outcome(
    receipt_id: &str,
    executor_id: &str,
    produced_receipt_ids: Vec<&str>,
    success: bool,
    logs: Vec<&str>,
) -> views::ExecutionOutcomeWithReceiptView {
    let status = if success {
        views::ExecutionStatusView::SuccessValue(String::new())
    } else {
        views::ExecutionStatusView::Failure(serde_json::json!({"ActionError": {"index": 0}}))
    };

    views::ExecutionOutcomeWithReceiptView {
        execution_outcome: views::ExecutionOutcomeView {
            id: receipt_id.to_string(),
            block_hash: "block-100".to_string(),
            outcome: views::OutcomeView {
                executor_id: executor_id.to_string(),
                gas_burnt: 4_174_947_687_500,
                tokens_burnt: "417494768750000000000".to_string(),
                logs: logs.into_iter().map(String::from).collect(),
                receipt_ids: produced_receipt_ids.into_iter().map(String::from).collect(),
                status,
            },
        },
        receipt: Some(action_receipt(receipt_id, "predecessor.near", executor_id)),
    }
}
