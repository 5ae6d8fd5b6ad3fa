use serde::{Deserialize, Serialize};

pub mod events;
pub mod views;

pub type AccountId = String;
pub type CryptoHash = String;
pub type BlockHeight = u64;
pub type ShardId = u64;
pub type TransactionHash = String;
/// Receipt id for action receipts, data id for data receipts.
pub type ReceiptOrDataId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptKind {
    Action,
    Data,
}

impl std::fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action => write!(f, "ACTION"),
            Self::Data => write!(f, "DATA"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    CreateAccount,
    DeployContract,
    DeployGlobalContract,
    DeployGlobalContractByAccountId,
    UseGlobalContract,
    UseGlobalContractByAccountId,
    FunctionCall,
    Transfer,
    Stake,
    AddKey,
    DeleteKey,
    DeleteAccount,
    DeterministicStateInit,
    DelegateAction,
    Unknown,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::CreateAccount => "CREATE_ACCOUNT",
            Self::DeployContract => "DEPLOY_CONTRACT",
            Self::DeployGlobalContract => "DEPLOY_GLOBAL_CONTRACT",
            Self::DeployGlobalContractByAccountId => "DEPLOY_GLOBAL_CONTRACT_BY_ACCOUNT_ID",
            Self::UseGlobalContract => "USE_GLOBAL_CONTRACT",
            Self::UseGlobalContractByAccountId => "USE_GLOBAL_CONTRACT_BY_ACCOUNT_ID",
            Self::FunctionCall => "FUNCTION_CALL",
            Self::Transfer => "TRANSFER",
            Self::Stake => "STAKE",
            Self::AddKey => "ADD_KEY",
            Self::DeleteKey => "DELETE_KEY",
            Self::DeleteAccount => "DELETE_ACCOUNT",
            Self::DeterministicStateInit => "DETERMINISTIC_STATE_INIT",
            Self::DelegateAction => "DELEGATE_ACTION",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{}", kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOutcomeStatus {
    Unknown,
    Failure,
    SuccessValue,
    SuccessReceiptId,
}

impl std::fmt::Display for ExecutionOutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Failure => write!(f, "FAILURE"),
            Self::SuccessValue => write!(f, "SUCCESS_VALUE"),
            Self::SuccessReceiptId => write!(f, "SUCCESS_RECEIPT_ID"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCause {
    Mint,
    Burn,
    Transfer,
}

impl std::fmt::Display for EventCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mint => write!(f, "MINT"),
            Self::Burn => write!(f, "BURN"),
            Self::Transfer => write!(f, "TRANSFER"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Failure,
    Success,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failure => write!(f, "FAILURE"),
            Self::Success => write!(f, "SUCCESS"),
        }
    }
}

/// Per-type offset used when composing `event_index` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Nep141 = 1,
    Nep171 = 2,
    Dex = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DexEventType {
    Buy,
    Sell,
}

impl std::fmt::Display for DexEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}
