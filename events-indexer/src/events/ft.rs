use base64::{engine::general_purpose, Engine as _};
use bigdecimal::{BigDecimal, Zero};

use indexer_primitives::events::{EventJson, FtEventData, FT_STANDARD};
use indexer_primitives::{views, EventCause, EventStatus, EventType};

use super::compose_event_index;

const EVENTS: &str = "events";

/// Wrapped NEAR never adopted NEP-297 logs for its mint/burn methods.
const WRAP_NEAR: &str = "wrap.near";

lazy_static! {
    static ref DEPOSIT_PATTERN: regex::Regex =
        regex::Regex::new(r"^Deposit (\d+) NEAR to ([\S]+)").unwrap();
    static ref ACCOUNT_BURN_PATTERN: regex::Regex =
        regex::Regex::new(r"^Account @([\S]+) burned (\d+)").unwrap();
    static ref REFUND_PATTERN: regex::Regex =
        regex::Regex::new(r"^Refund (\d+) from ([\S]+) to ([\S]+)").unwrap();
}

/// One balance-changing row: +delta credits the affected account, -delta
/// debits it. A transfer is a debit/credit pair summing to zero.
struct FtEntry {
    affected: String,
    involved: Option<String>,
    delta: BigDecimal,
    cause: EventCause,
    memo: Option<String>,
}

/// Fungible-token rows for one shard. Structured NEP-297 logs win; receipts
/// that emit no structured events at all fall back to the legacy matchers
/// (free-text logs and known method signatures).
pub(crate) fn extract_events(
    header: &views::BlockHeaderView,
    shard: &views::ShardView,
) -> Vec<database::models::FtEvent> {
    let mut rows: Vec<database::models::FtEvent> = Vec::new();

    for outcome in &shard.receipt_execution_outcomes {
        if !outcome.execution_outcome.outcome.status.is_success() {
            continue;
        }
        let Some(receipt) = &outcome.receipt else {
            continue;
        };

        let event_logs = indexer_primitives::events::extract_events(outcome);
        let entries: Vec<FtEntry> = if event_logs.is_empty() {
            legacy_entries(receipt, &outcome.execution_outcome.outcome.logs)
        } else {
            event_logs.iter().flat_map(standard_entries).collect()
        };

        let contract = &outcome.execution_outcome.outcome.executor_id;
        for entry in entries {
            let event_index =
                compose_event_index(shard.shard_id, EventType::Nep141, rows.len() as u64);
            rows.push(database::models::FtEvent {
                affected_account_id: entry.affected,
                block_height: header.height.into(),
                block_timestamp: header.timestamp_nanosec.into(),
                cause: entry.cause.to_string(),
                contract_account_id: contract.clone(),
                delta_amount: entry.delta,
                event_index,
                event_memo: entry.memo,
                involved_account_id: entry.involved,
                receipt_id: receipt.receipt_id.clone(),
                standard: FT_STANDARD.to_string(),
                status: EventStatus::Success.to_string(),
            });
        }
    }

    rows
}

fn standard_entries(event: &EventJson) -> Vec<FtEntry> {
    if event.standard != FT_STANDARD {
        return Vec::new();
    }
    let Some(data) = &event.data else {
        return Vec::new();
    };
    let Ok(items) = serde_json::from_value::<Vec<FtEventData>>(data.clone()) else {
        tracing::debug!(target: EVENTS, "Skipping malformed {} payload: {}", event.event, data);
        return Vec::new();
    };

    let mut entries = Vec::new();
    for item in items {
        let Some(amount) = parse_amount(item.amount.as_deref()) else {
            continue;
        };
        match event.event.as_str() {
            "ft_mint" => {
                if let Some(owner_id) = item.owner_id {
                    entries.push(FtEntry {
                        affected: owner_id,
                        involved: None,
                        delta: amount,
                        cause: EventCause::Mint,
                        memo: item.memo,
                    });
                }
            }
            "ft_burn" => {
                if let Some(owner_id) = item.owner_id {
                    entries.push(FtEntry {
                        affected: owner_id,
                        involved: None,
                        delta: -amount,
                        cause: EventCause::Burn,
                        memo: item.memo,
                    });
                }
            }
            "ft_transfer" => {
                if let (Some(old_owner), Some(new_owner)) = (item.old_owner_id, item.new_owner_id)
                {
                    entries.push(FtEntry {
                        affected: old_owner.clone(),
                        involved: Some(new_owner.clone()),
                        delta: -amount.clone(),
                        cause: EventCause::Transfer,
                        memo: item.memo.clone(),
                    });
                    entries.push(FtEntry {
                        affected: new_owner,
                        involved: Some(old_owner),
                        delta: amount,
                        cause: EventCause::Transfer,
                        memo: item.memo,
                    });
                }
            }
            _ => {}
        }
    }
    entries
}

fn legacy_entries(receipt: &views::ReceiptView, logs: &[String]) -> Vec<FtEntry> {
    let views::ReceiptEnumView::Action(action_receipt) = &receipt.receipt else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for action in &action_receipt.actions {
        let views::ActionView::FunctionCall {
            method_name, args, ..
        } = action
        else {
            continue;
        };
        match method_name.as_str() {
            "near_deposit" if receipt.receiver_id == WRAP_NEAR => {
                entries.extend(wrap_near_deposits(logs));
            }
            "near_withdraw" if receipt.receiver_id == WRAP_NEAR => {
                entries.extend(wrap_near_withdrawal(args, &receipt.predecessor_id));
            }
            "ft_transfer" | "ft_transfer_call" => {
                entries.extend(transfer_from_args(args, &receipt.predecessor_id));
            }
            "ft_resolve_transfer" => {
                entries.extend(resolve_transfer_refunds(logs));
            }
            _ => {}
        }
    }
    entries
}

fn wrap_near_deposits(logs: &[String]) -> Vec<FtEntry> {
    logs.iter()
        .filter_map(|log| {
            let captures = DEPOSIT_PATTERN.captures(log)?;
            let amount = parse_amount(Some(&captures[1]))?;
            Some(FtEntry {
                affected: captures[2].to_string(),
                involved: None,
                delta: amount,
                cause: EventCause::Mint,
                memo: None,
            })
        })
        .collect()
}

fn wrap_near_withdrawal(args_base64: &str, predecessor: &str) -> Vec<FtEntry> {
    let Some(args) = decode_args(args_base64) else {
        return Vec::new();
    };
    let Some(amount) = parse_amount(args.amount.as_deref()) else {
        return Vec::new();
    };
    vec![FtEntry {
        affected: predecessor.to_string(),
        involved: None,
        delta: -amount,
        cause: EventCause::Burn,
        memo: None,
    }]
}

fn transfer_from_args(args_base64: &str, predecessor: &str) -> Vec<FtEntry> {
    let Some(args) = decode_args(args_base64) else {
        return Vec::new();
    };
    let Some(amount) = parse_amount(args.amount.as_deref()) else {
        return Vec::new();
    };
    let Some(receiver_id) = args.receiver_id else {
        return Vec::new();
    };
    vec![
        FtEntry {
            affected: predecessor.to_string(),
            involved: Some(receiver_id.clone()),
            delta: -amount.clone(),
            cause: EventCause::Transfer,
            memo: args.memo.clone(),
        },
        FtEntry {
            affected: receiver_id,
            involved: Some(predecessor.to_string()),
            delta: amount,
            cause: EventCause::Transfer,
            memo: args.memo,
        },
    ]
}

// `ft_resolve_transfer` settles an `ft_transfer_call`: unused tokens burn
// ("Account @x burned N") or travel back ("Refund N from receiver to sender").
fn resolve_transfer_refunds(logs: &[String]) -> Vec<FtEntry> {
    let mut entries = Vec::new();
    for log in logs {
        if let Some(captures) = ACCOUNT_BURN_PATTERN.captures(log) {
            if let Some(amount) = parse_amount(Some(&captures[2])) {
                entries.push(FtEntry {
                    affected: captures[1].to_string(),
                    involved: None,
                    delta: -amount,
                    cause: EventCause::Burn,
                    memo: None,
                });
            }
        }
        if let Some(captures) = REFUND_PATTERN.captures(log) {
            if let Some(amount) = parse_amount(Some(&captures[1])) {
                let refunded_from = captures[2].to_string();
                let refunded_to = captures[3].to_string();
                entries.push(FtEntry {
                    affected: refunded_from.clone(),
                    involved: Some(refunded_to.clone()),
                    delta: -amount.clone(),
                    cause: EventCause::Transfer,
                    memo: None,
                });
                entries.push(FtEntry {
                    affected: refunded_to,
                    involved: Some(refunded_from),
                    delta: amount,
                    cause: EventCause::Transfer,
                    memo: None,
                });
            }
        }
    }
    entries
}

#[derive(serde::Deserialize)]
struct TransferArgs {
    receiver_id: Option<String>,
    amount: Option<String>,
    memo: Option<String>,
}

fn decode_args(args_base64: &str) -> Option<TransferArgs> {
    let bytes = general_purpose::STANDARD.decode(args_base64).ok()?;
    serde_json::from_slice(&bytes).ok()
}

// Zero or unparseable amounts carry no balance change.
fn parse_amount(amount: Option<&str>) -> Option<BigDecimal> {
    let amount: BigDecimal = amount?.parse().ok()?;
    (!amount.is_zero()).then_some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils;

    fn header() -> views::BlockHeaderView {
        testutils::block_message(100, "block-100").block.header
    }

    fn shard_with_outcome(outcome: views::ExecutionOutcomeWithReceiptView) -> views::ShardView {
        let mut shard = testutils::block_message(100, "block-100").shards.remove(0);
        shard.receipt_execution_outcomes.push(outcome);
        shard
    }

    fn event_json(event: &str, data: serde_json::Value) -> String {
        format!(
            "EVENT_JSON:{}",
            serde_json::json!({
                "standard": "nep141",
                "version": "1.0.0",
                "event": event,
                "data": data,
            })
        )
    }

    #[test]
    fn transfer_produces_a_zero_sum_pair() {
        let log = event_json(
            "ft_transfer",
            serde_json::json!([{
                "old_owner_id": "alice.near",
                "new_owner_id": "bob.near",
                "amount": "500",
            }]),
        );
        let outcome =
            testutils::execution_outcome("receipt-1", "token.near", vec![], true, vec![log.as_str()]);

        let rows = extract_events(&header(), &shard_with_outcome(outcome));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].affected_account_id, "alice.near");
        assert_eq!(rows[0].delta_amount, BigDecimal::from(-500));
        assert_eq!(rows[0].involved_account_id.as_deref(), Some("bob.near"));
        assert_eq!(rows[1].affected_account_id, "bob.near");
        assert_eq!(rows[1].delta_amount, BigDecimal::from(500));
        assert_eq!(&rows[0].delta_amount + &rows[1].delta_amount, BigDecimal::from(0));
        assert_eq!(rows[0].cause, "TRANSFER");
        assert_eq!(rows[0].standard, "nep141");
        assert_eq!(rows[0].status, "SUCCESS");
        assert_ne!(rows[0].event_index, rows[1].event_index);
    }

    #[test]
    fn mint_and_burn_carry_signed_deltas() {
        let log = event_json(
            "ft_mint",
            serde_json::json!([{ "owner_id": "alice.near", "amount": "100" }]),
        );
        let burn_log = event_json(
            "ft_burn",
            serde_json::json!([{ "owner_id": "alice.near", "amount": "40" }]),
        );
        let outcome = testutils::execution_outcome(
            "receipt-1",
            "token.near",
            vec![],
            true,
            vec![log.as_str(), burn_log.as_str()],
        );

        let rows = extract_events(&header(), &shard_with_outcome(outcome));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cause, "MINT");
        assert_eq!(rows[0].delta_amount, BigDecimal::from(100));
        assert_eq!(rows[1].cause, "BURN");
        assert_eq!(rows[1].delta_amount, BigDecimal::from(-40));
    }

    #[test]
    fn zero_amounts_and_failed_outcomes_produce_nothing() {
        let log = event_json(
            "ft_mint",
            serde_json::json!([{ "owner_id": "alice.near", "amount": "0" }]),
        );
        let zero_amount =
            testutils::execution_outcome("receipt-1", "token.near", vec![], true, vec![log.as_str()]);
        assert!(extract_events(&header(), &shard_with_outcome(zero_amount)).is_empty());

        let log = event_json(
            "ft_mint",
            serde_json::json!([{ "owner_id": "alice.near", "amount": "100" }]),
        );
        let failed =
            testutils::execution_outcome("receipt-1", "token.near", vec![], false, vec![log.as_str()]);
        assert!(extract_events(&header(), &shard_with_outcome(failed)).is_empty());
    }

    #[test]
    fn legacy_matchers_only_run_without_structured_events() {
        let transfer_args = general_purpose::STANDARD.encode(
            serde_json::json!({ "receiver_id": "bob.near", "amount": "77" }).to_string(),
        );
        let structured = event_json(
            "ft_mint",
            serde_json::json!([{ "owner_id": "carol.near", "amount": "5" }]),
        );

        let mut outcome =
            testutils::execution_outcome("receipt-1", "token.near", vec![], true, vec![structured.as_str()]);
        if let views::ReceiptEnumView::Action(action_receipt) =
            &mut outcome.receipt.as_mut().unwrap().receipt
        {
            action_receipt.actions.push(views::ActionView::FunctionCall {
                method_name: "ft_transfer".to_string(),
                args: transfer_args,
                gas: 10_000_000_000_000,
                deposit: "1".to_string(),
            });
        }

        let rows = extract_events(&header(), &shard_with_outcome(outcome));

        // The structured mint wins; the legacy matcher does not double-count.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cause, "MINT");
        assert_eq!(rows[0].affected_account_id, "carol.near");
    }

    #[test]
    fn legacy_transfer_builds_the_inverse_pair_from_args() {
        let transfer_args = general_purpose::STANDARD.encode(
            serde_json::json!({ "receiver_id": "bob.near", "amount": "77", "memo": "hi" })
                .to_string(),
        );
        let mut outcome =
            testutils::execution_outcome("receipt-1", "token.near", vec![], true, vec![]);
        if let views::ReceiptEnumView::Action(action_receipt) =
            &mut outcome.receipt.as_mut().unwrap().receipt
        {
            action_receipt.actions.push(views::ActionView::FunctionCall {
                method_name: "ft_transfer".to_string(),
                args: transfer_args,
                gas: 10_000_000_000_000,
                deposit: "1".to_string(),
            });
        }

        let rows = extract_events(&header(), &shard_with_outcome(outcome));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].affected_account_id, "predecessor.near");
        assert_eq!(rows[0].delta_amount, BigDecimal::from(-77));
        assert_eq!(rows[1].affected_account_id, "bob.near");
        assert_eq!(rows[1].delta_amount, BigDecimal::from(77));
        assert_eq!(rows[1].event_memo.as_deref(), Some("hi"));
    }

    #[test]
    fn wrap_near_deposit_and_withdraw_map_to_mint_and_burn() {
        let mut deposit =
            testutils::execution_outcome("receipt-1", WRAP_NEAR, vec![], true, vec![
                "Deposit 2500000000000000000000000 NEAR to alice.near",
            ]);
        if let views::ReceiptEnumView::Action(action_receipt) =
            &mut deposit.receipt.as_mut().unwrap().receipt
        {
            action_receipt.actions.push(views::ActionView::FunctionCall {
                method_name: "near_deposit".to_string(),
                args: general_purpose::STANDARD.encode("{}"),
                gas: 10_000_000_000_000,
                deposit: "2500000000000000000000000".to_string(),
            });
        }

        let rows = extract_events(&header(), &shard_with_outcome(deposit));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cause, "MINT");
        assert_eq!(rows[0].affected_account_id, "alice.near");
        assert_eq!(
            rows[0].delta_amount,
            "2500000000000000000000000".parse::<BigDecimal>().unwrap()
        );

        let withdraw_args = general_purpose::STANDARD
            .encode(serde_json::json!({ "amount": "1000" }).to_string());
        let mut withdraw =
            testutils::execution_outcome("receipt-2", WRAP_NEAR, vec![], true, vec![]);
        if let views::ReceiptEnumView::Action(action_receipt) =
            &mut withdraw.receipt.as_mut().unwrap().receipt
        {
            action_receipt.actions.push(views::ActionView::FunctionCall {
                method_name: "near_withdraw".to_string(),
                args: withdraw_args,
                gas: 10_000_000_000_000,
                deposit: "1".to_string(),
            });
        }

        let rows = extract_events(&header(), &shard_with_outcome(withdraw));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cause, "BURN");
        assert_eq!(rows[0].affected_account_id, "predecessor.near");
        assert_eq!(rows[0].delta_amount, BigDecimal::from(-1000));
    }

    #[test]
    fn resolve_transfer_logs_settle_burns_and_refunds() {
        let mut outcome = testutils::execution_outcome("receipt-1", "token.near", vec![], true, vec![
            "Account @alice.near burned 30",
            "Refund 12 from bob.near to alice.near",
        ]);
        if let views::ReceiptEnumView::Action(action_receipt) =
            &mut outcome.receipt.as_mut().unwrap().receipt
        {
            action_receipt.actions.push(views::ActionView::FunctionCall {
                method_name: "ft_resolve_transfer".to_string(),
                args: general_purpose::STANDARD.encode("{}"),
                gas: 10_000_000_000_000,
                deposit: "0".to_string(),
            });
        }

        let rows = extract_events(&header(), &shard_with_outcome(outcome));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cause, "BURN");
        assert_eq!(rows[0].delta_amount, BigDecimal::from(-30));
        assert_eq!(rows[1].affected_account_id, "bob.near");
        assert_eq!(rows[1].delta_amount, BigDecimal::from(-12));
        assert_eq!(rows[2].affected_account_id, "alice.near");
        assert_eq!(rows[2].delta_amount, BigDecimal::from(12));
    }
}
