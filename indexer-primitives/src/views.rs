use serde::{Deserialize, Serialize};

use crate::{AccountId, BlockHeight, CryptoHash, ReceiptKind, ReceiptOrDataId, ShardId};

/// Block message as served by the block streaming endpoint.
/// One message per block: the block itself plus every shard with its
/// chunk (if produced) and the execution outcomes that landed in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockMessage {
    pub block: BlockView,
    pub shards: Vec<ShardView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockView {
    pub author: AccountId,
    pub chunks: Vec<ChunkHeaderView>,
    pub header: BlockHeaderView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeaderView {
    pub height: BlockHeight,
    pub hash: CryptoHash,
    pub prev_hash: CryptoHash,
    /// Nanoseconds, decimal string on the wire.
    #[serde(with = "dec_format")]
    pub timestamp_nanosec: u64,
    pub gas_price: String,
    pub total_supply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkHeaderView {
    pub chunk_hash: CryptoHash,
    pub prev_block_hash: CryptoHash,
    pub shard_id: ShardId,
    pub height_created: BlockHeight,
    pub height_included: BlockHeight,
    pub gas_limit: u64,
    pub gas_used: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardView {
    pub shard_id: ShardId,
    pub chunk: Option<ChunkView>,
    pub receipt_execution_outcomes: Vec<ExecutionOutcomeWithReceiptView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkView {
    pub author: AccountId,
    pub header: ChunkHeaderView,
    pub receipts: Vec<ReceiptView>,
    pub transactions: Vec<IndexerTransactionWithOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerTransactionWithOutcome {
    pub transaction: SignedTransactionView,
    pub outcome: ExecutionOutcomeWithReceiptView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransactionView {
    pub hash: CryptoHash,
    pub nonce: u64,
    pub signer_id: AccountId,
    pub public_key: String,
    pub receiver_id: AccountId,
    pub signature: String,
    pub actions: Vec<ActionView>,
    #[serde(default)]
    pub priority_fee: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub predecessor_id: AccountId,
    pub receiver_id: AccountId,
    pub receipt_id: CryptoHash,
    pub receipt: ReceiptEnumView,
}

impl ReceiptView {
    pub fn kind(&self) -> Option<ReceiptKind> {
        match self.receipt {
            ReceiptEnumView::Action(_) => Some(ReceiptKind::Action),
            ReceiptEnumView::Data(_) => Some(ReceiptKind::Data),
            ReceiptEnumView::Other(_) => None,
        }
    }

    /// Id the receipt is addressed by: `receipt_id` for action receipts,
    /// the produced `data_id` for data receipts.
    pub fn receipt_or_data_id(&self) -> ReceiptOrDataId {
        match &self.receipt {
            ReceiptEnumView::Data(data) => data.data_id.clone(),
            _ => self.receipt_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReceiptEnumView {
    Action(ActionReceiptView),
    Data(DataReceiptView),
    #[serde(untagged)]
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReceiptView {
    pub signer_id: AccountId,
    pub signer_public_key: String,
    pub gas_price: String,
    pub input_data_ids: Vec<CryptoHash>,
    pub output_data_receivers: Vec<DataReceiverView>,
    pub actions: Vec<ActionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataReceiptView {
    pub data_id: CryptoHash,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataReceiverView {
    pub data_id: CryptoHash,
    pub receiver_id: AccountId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionView {
    CreateAccount,
    DeployContract {
        code: String,
    },
    DeployGlobalContract {
        code: String,
    },
    DeployGlobalContractByAccountId {
        code: String,
    },
    #[serde(rename_all = "camelCase")]
    UseGlobalContract {
        code_hash: CryptoHash,
    },
    #[serde(rename_all = "camelCase")]
    UseGlobalContractByAccountId {
        account_id: AccountId,
    },
    #[serde(rename_all = "camelCase")]
    FunctionCall {
        method_name: String,
        args: String,
        gas: u64,
        deposit: String,
    },
    Transfer {
        deposit: String,
    },
    #[serde(rename_all = "camelCase")]
    Stake {
        stake: String,
        public_key: String,
    },
    #[serde(rename_all = "camelCase")]
    AddKey {
        public_key: String,
        access_key: AccessKeyView,
    },
    #[serde(rename_all = "camelCase")]
    DeleteKey {
        public_key: String,
    },
    #[serde(rename_all = "camelCase")]
    DeleteAccount {
        beneficiary_id: AccountId,
    },
    #[serde(rename_all = "camelCase")]
    Delegate {
        delegate_action: DelegateActionView,
        signature: String,
    },
    DeterministicStateInit(serde_json::Value),
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateActionView {
    pub sender_id: AccountId,
    pub receiver_id: AccountId,
    pub actions: Vec<ActionView>,
    pub nonce: u64,
    pub max_block_height: BlockHeight,
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessKeyView {
    pub nonce: u64,
    pub permission: AccessKeyPermissionView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccessKeyPermissionView {
    FullAccess,
    #[serde(rename_all = "camelCase")]
    FunctionCall {
        allowance: Option<String>,
        receiver_id: AccountId,
        method_names: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcomeWithReceiptView {
    pub execution_outcome: ExecutionOutcomeView,
    pub receipt: Option<ReceiptView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcomeView {
    pub id: CryptoHash,
    pub block_hash: CryptoHash,
    pub outcome: OutcomeView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeView {
    pub executor_id: AccountId,
    pub gas_burnt: u64,
    pub tokens_burnt: String,
    pub logs: Vec<String>,
    pub receipt_ids: Vec<CryptoHash>,
    pub status: ExecutionStatusView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecutionStatusView {
    Unknown,
    Failure(serde_json::Value),
    SuccessValue(String),
    SuccessReceiptId(CryptoHash),
}

impl ExecutionStatusView {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::SuccessValue(_) | Self::SuccessReceiptId(_))
    }
}

impl From<&ExecutionStatusView> for crate::ExecutionOutcomeStatus {
    fn from(status: &ExecutionStatusView) -> Self {
        match status {
            ExecutionStatusView::Unknown => Self::Unknown,
            ExecutionStatusView::Failure(_) => Self::Failure,
            ExecutionStatusView::SuccessValue(_) => Self::SuccessValue,
            ExecutionStatusView::SuccessReceiptId(_) => Self::SuccessReceiptId,
        }
    }
}

/// Serde helper for u64 values that travel as decimal strings.
pub mod dec_format {
    use serde::de;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}
