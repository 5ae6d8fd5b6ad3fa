use serde::Deserialize;

use crate::views::ExecutionOutcomeWithReceiptView;
use crate::AccountId;

pub const EVENT_JSON_PREFIX: &str = "EVENT_JSON:";

pub const FT_STANDARD: &str = "nep141";
pub const NFT_STANDARD: &str = "nep171";

/// Structured event log emitted by contracts, NEP-297 envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EventJson {
    pub standard: String,
    pub version: String,
    pub event: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Collects every parseable `EVENT_JSON:` log of an execution outcome.
/// Logs without the prefix or with malformed payloads are ignored.
pub fn extract_events(outcome: &ExecutionOutcomeWithReceiptView) -> Vec<EventJson> {
    outcome
        .execution_outcome
        .outcome
        .logs
        .iter()
        .filter_map(|log| {
            let payload = log.trim().strip_prefix(EVENT_JSON_PREFIX)?;
            serde_json::from_str(payload).ok()
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FtEventData {
    pub owner_id: Option<AccountId>,
    pub old_owner_id: Option<AccountId>,
    pub new_owner_id: Option<AccountId>,
    pub amount: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftEventData {
    pub owner_id: Option<AccountId>,
    pub old_owner_id: Option<AccountId>,
    pub new_owner_id: Option<AccountId>,
    pub authorized_id: Option<AccountId>,
    pub token_ids: Option<Vec<String>>,
    pub memo: Option<String>,
}
