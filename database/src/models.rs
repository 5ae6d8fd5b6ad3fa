use bigdecimal::BigDecimal;

/// Row types for the tables the indexer writes. Numeric chain values
/// (heights, timestamps, yocto amounts) are kept as `BigDecimal` to match
/// the NUMERIC columns they land in.
#[derive(Debug, Clone)]
pub struct Block {
    pub author_account_id: String,
    pub block_hash: String,
    pub block_height: BigDecimal,
    pub block_timestamp: BigDecimal,
    pub gas_price: BigDecimal,
    pub prev_block_hash: String,
    pub total_supply: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub author_account_id: String,
    pub chunk_hash: String,
    pub gas_limit: BigDecimal,
    pub gas_used: BigDecimal,
    pub included_in_block_hash: String,
    pub included_in_block_timestamp: BigDecimal,
    pub shard_id: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub block_timestamp: BigDecimal,
    pub converted_into_receipt_id: String,
    pub included_in_block_hash: String,
    pub included_in_chunk_hash: String,
    pub index_in_chunk: i32,
    pub receipt_conversion_gas_burnt: BigDecimal,
    pub receipt_conversion_tokens_burnt: BigDecimal,
    pub receiver_account_id: String,
    pub signer_account_id: String,
    pub status: String,
    pub transaction_hash: String,
}

#[derive(Debug, Clone)]
pub struct Receipt {
    pub included_in_block_hash: String,
    pub included_in_block_timestamp: BigDecimal,
    pub included_in_chunk_hash: String,
    pub index_in_chunk: i32,
    pub originated_from_transaction_hash: String,
    pub predecessor_account_id: String,
    pub receipt_id: String,
    pub receipt_kind: String,
    pub receiver_account_id: String,
}

#[derive(Debug, Clone)]
pub struct ActionReceiptAction {
    pub action_kind: String,
    pub args: serde_json::Value,
    pub index_in_action_receipt: i32,
    pub nep518_rlp_hash: Option<String>,
    pub receipt_id: String,
    pub receipt_included_in_block_timestamp: BigDecimal,
    pub receipt_predecessor_account_id: String,
    pub receipt_receiver_account_id: String,
}

#[derive(Debug, Clone)]
pub struct ActionReceiptInputData {
    pub input_data_id: String,
    pub input_to_receipt_id: String,
}

#[derive(Debug, Clone)]
pub struct ActionReceiptOutputData {
    pub output_data_id: String,
    pub output_from_receipt_id: String,
    pub receiver_account_id: String,
}

#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub executed_in_block_hash: String,
    pub executed_in_block_timestamp: BigDecimal,
    pub executor_account_id: String,
    pub gas_burnt: BigDecimal,
    pub index_in_chunk: i32,
    pub receipt_id: String,
    pub shard_id: BigDecimal,
    pub status: String,
    pub tokens_burnt: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct ExecutionOutcomeReceipt {
    pub executed_receipt_id: String,
    pub index_in_execution_outcome: i32,
    pub produced_receipt_id: String,
}

#[derive(Debug, Clone)]
pub struct FtEvent {
    pub affected_account_id: String,
    pub block_height: BigDecimal,
    pub block_timestamp: BigDecimal,
    pub cause: String,
    pub contract_account_id: String,
    pub delta_amount: BigDecimal,
    pub event_index: BigDecimal,
    pub event_memo: Option<String>,
    pub involved_account_id: Option<String>,
    pub receipt_id: String,
    pub standard: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct NftEvent {
    pub affected_account_id: String,
    pub authorized_account_id: Option<String>,
    pub block_height: BigDecimal,
    pub block_timestamp: BigDecimal,
    pub cause: String,
    pub contract_account_id: String,
    pub delta_amount: i32,
    pub event_index: BigDecimal,
    pub event_memo: Option<String>,
    pub involved_account_id: Option<String>,
    pub receipt_id: String,
    pub standard: String,
    pub status: String,
    pub token_id: String,
}

#[derive(Debug, Clone)]
pub struct DexPair {
    pub base: String,
    pub contract: String,
    pub pool: BigDecimal,
    pub price_token: Option<BigDecimal>,
    pub price_usd: Option<BigDecimal>,
    pub quote: String,
}

/// A stored pair joined with the token decimals from `ft_meta`, as needed
/// for price math.
#[derive(Debug, Clone)]
pub struct DexPairPrice {
    pub id: i64,
    pub pool: BigDecimal,
    pub base: String,
    pub quote: String,
    pub base_decimal: i32,
    pub quote_decimal: i32,
    pub price_token: Option<BigDecimal>,
    pub price_usd: Option<BigDecimal>,
}

#[derive(Debug, Clone)]
pub struct DexEvent {
    pub amount_usd: Option<BigDecimal>,
    pub base_amount: BigDecimal,
    pub event_index: BigDecimal,
    pub event_type: String,
    pub maker: String,
    pub pair_id: i64,
    pub price_token: Option<BigDecimal>,
    pub price_usd: Option<BigDecimal>,
    pub quote_amount: BigDecimal,
    pub receipt_id: String,
    pub timestamp: i64,
}
