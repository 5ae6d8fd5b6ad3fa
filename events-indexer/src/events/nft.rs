use indexer_primitives::events::{EventJson, NftEventData, NFT_STANDARD};
use indexer_primitives::{views, EventCause, EventStatus, EventType};

use super::compose_event_index;

const EVENTS: &str = "events";

struct NftEntry {
    affected: String,
    involved: Option<String>,
    authorized: Option<String>,
    token_id: String,
    delta: i32,
    cause: EventCause,
    memo: Option<String>,
}

/// Non-fungible-token rows for one shard, from structured NEP-297 logs only.
/// Multi-token events fan out to one row per token id; ownership is counted
/// in whole tokens, so deltas are always ±1.
pub(crate) fn extract_events(
    header: &views::BlockHeaderView,
    shard: &views::ShardView,
) -> Vec<database::models::NftEvent> {
    let mut rows: Vec<database::models::NftEvent> = Vec::new();

    for outcome in &shard.receipt_execution_outcomes {
        if !outcome.execution_outcome.outcome.status.is_success() {
            continue;
        }
        let Some(receipt) = &outcome.receipt else {
            continue;
        };

        let contract = &outcome.execution_outcome.outcome.executor_id;
        for event in indexer_primitives::events::extract_events(outcome) {
            for entry in standard_entries(&event) {
                let event_index =
                    compose_event_index(shard.shard_id, EventType::Nep171, rows.len() as u64);
                rows.push(database::models::NftEvent {
                    affected_account_id: entry.affected,
                    authorized_account_id: entry.authorized,
                    block_height: header.height.into(),
                    block_timestamp: header.timestamp_nanosec.into(),
                    cause: entry.cause.to_string(),
                    contract_account_id: contract.clone(),
                    delta_amount: entry.delta,
                    event_index,
                    event_memo: entry.memo,
                    involved_account_id: entry.involved,
                    receipt_id: receipt.receipt_id.clone(),
                    standard: NFT_STANDARD.to_string(),
                    status: EventStatus::Success.to_string(),
                    token_id: entry.token_id,
                });
            }
        }
    }

    rows
}

fn standard_entries(event: &EventJson) -> Vec<NftEntry> {
    if event.standard != NFT_STANDARD {
        return Vec::new();
    }
    let Some(data) = &event.data else {
        return Vec::new();
    };
    let Ok(items) = serde_json::from_value::<Vec<NftEventData>>(data.clone()) else {
        tracing::debug!(target: EVENTS, "Skipping malformed {} payload: {}", event.event, data);
        return Vec::new();
    };

    let mut entries = Vec::new();
    for item in items {
        let Some(token_ids) = item.token_ids.filter(|ids| !ids.is_empty()) else {
            continue;
        };
        match event.event.as_str() {
            "nft_mint" => {
                if let Some(owner_id) = item.owner_id {
                    for token_id in token_ids {
                        entries.push(NftEntry {
                            affected: owner_id.clone(),
                            involved: None,
                            authorized: None,
                            token_id,
                            delta: 1,
                            cause: EventCause::Mint,
                            memo: item.memo.clone(),
                        });
                    }
                }
            }
            "nft_burn" => {
                if let Some(owner_id) = item.owner_id {
                    for token_id in token_ids {
                        entries.push(NftEntry {
                            affected: owner_id.clone(),
                            involved: None,
                            authorized: item.authorized_id.clone(),
                            token_id,
                            delta: -1,
                            cause: EventCause::Burn,
                            memo: item.memo.clone(),
                        });
                    }
                }
            }
            "nft_transfer" => {
                if let (Some(old_owner), Some(new_owner)) =
                    (&item.old_owner_id, &item.new_owner_id)
                {
                    for token_id in token_ids {
                        entries.push(NftEntry {
                            affected: old_owner.clone(),
                            involved: Some(new_owner.clone()),
                            authorized: item.authorized_id.clone(),
                            token_id: token_id.clone(),
                            delta: -1,
                            cause: EventCause::Transfer,
                            memo: item.memo.clone(),
                        });
                        entries.push(NftEntry {
                            affected: new_owner.clone(),
                            involved: Some(old_owner.clone()),
                            authorized: item.authorized_id.clone(),
                            token_id,
                            delta: 1,
                            cause: EventCause::Transfer,
                            memo: item.memo.clone(),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    entries
}
