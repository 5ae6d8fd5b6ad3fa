use base64::{engine::general_purpose, Engine as _};
use sha3::{Digest, Keccak256};

use indexer_primitives::views::{AccessKeyPermissionView, ActionView};
use indexer_primitives::ActionKind;

/// One `action_receipt_actions` row worth of data: the kind tag, normalized
/// JSON args and, for EVM calls wrapped per NEP-518, the embedded transaction
/// hash.
pub(crate) struct ActionData {
    pub kind: ActionKind,
    pub args: serde_json::Value,
    pub nep518_rlp_hash: Option<String>,
}

/// Actions in storage order. A delegate action (NEP-366) contributes its
/// wrapper row followed by one row per delegated action, sharing the same
/// index sequence. Delegation is one level deep by protocol rule.
pub(crate) fn flatten_actions(actions: &[ActionView]) -> Vec<ActionData> {
    let mut flattened = Vec::with_capacity(actions.len());
    for action in actions {
        flattened.push(classify_action(action));
        if let ActionView::Delegate {
            delegate_action, ..
        } = action
        {
            flattened.extend(delegate_action.actions.iter().map(classify_action));
        }
    }
    flattened
}

pub(crate) fn classify_action(action: &ActionView) -> ActionData {
    let mut nep518_rlp_hash = None;
    let (kind, args) = match action {
        ActionView::CreateAccount => (ActionKind::CreateAccount, serde_json::json!({})),
        ActionView::DeployContract { code } => (ActionKind::DeployContract, code_hash_args(code)),
        ActionView::DeployGlobalContract { code } => {
            (ActionKind::DeployGlobalContract, code_hash_args(code))
        }
        ActionView::DeployGlobalContractByAccountId { code } => (
            ActionKind::DeployGlobalContractByAccountId,
            code_hash_args(code),
        ),
        ActionView::UseGlobalContract { code_hash } => (
            ActionKind::UseGlobalContract,
            serde_json::json!({ "code_hash": code_hash }),
        ),
        ActionView::UseGlobalContractByAccountId { account_id } => (
            ActionKind::UseGlobalContractByAccountId,
            serde_json::json!({ "account_id": account_id }),
        ),
        ActionView::FunctionCall {
            method_name,
            args,
            gas,
            deposit,
        } => {
            let args_json = decode_args(args);
            nep518_rlp_hash = args_json
                .as_ref()
                .and_then(|json| rlp_transaction_hash(method_name, json));
            let args = serde_json::json!({
                "args_base64": if args_json.is_some() {
                    serde_json::Value::Null
                } else {
                    serde_json::Value::String(args.clone())
                },
                "args_json": args_json,
                "deposit": deposit,
                "gas": gas,
                "method_name": method_name,
            });
            (ActionKind::FunctionCall, args)
        }
        ActionView::Transfer { deposit } => (
            ActionKind::Transfer,
            serde_json::json!({ "deposit": deposit }),
        ),
        ActionView::Stake { stake, public_key } => (
            ActionKind::Stake,
            serde_json::json!({ "public_key": public_key, "stake": stake }),
        ),
        ActionView::AddKey {
            public_key,
            access_key,
        } => {
            let permission = match &access_key.permission {
                AccessKeyPermissionView::FullAccess => serde_json::json!({
                    "permission_kind": "FULL_ACCESS",
                }),
                AccessKeyPermissionView::FunctionCall {
                    allowance,
                    receiver_id,
                    method_names,
                } => serde_json::json!({
                    "permission_kind": "FUNCTION_CALL",
                    "permission_details": {
                        "allowance": allowance,
                        "method_names": method_names,
                        "receiver_id": receiver_id,
                    },
                }),
            };
            // The nonce churns on every use of the key and is zeroed so the
            // stored args stay stable.
            (
                ActionKind::AddKey,
                serde_json::json!({
                    "access_key": { "nonce": 0, "permission": permission },
                    "public_key": public_key,
                }),
            )
        }
        ActionView::DeleteKey { public_key } => (
            ActionKind::DeleteKey,
            serde_json::json!({ "public_key": public_key }),
        ),
        ActionView::DeleteAccount { beneficiary_id } => (
            ActionKind::DeleteAccount,
            serde_json::json!({ "beneficiary_id": beneficiary_id }),
        ),
        ActionView::Delegate {
            delegate_action,
            signature,
        } => (
            ActionKind::DelegateAction,
            serde_json::json!({
                "max_block_height": delegate_action.max_block_height,
                "nonce": delegate_action.nonce,
                "public_key": delegate_action.public_key,
                "receiver_id": delegate_action.receiver_id,
                "sender_id": delegate_action.sender_id,
                "signature": signature,
            }),
        ),
        ActionView::DeterministicStateInit(value) => {
            (ActionKind::DeterministicStateInit, value.clone())
        }
        ActionView::Unknown(_) => (ActionKind::Unknown, serde_json::json!({})),
    };

    ActionData {
        kind,
        args,
        nep518_rlp_hash,
    }
}

// The block view replaces deployed contract code with its sha256 digest
// (base64 on the wire); store it base58 like every other hash.
fn code_hash_args(code_base64: &str) -> serde_json::Value {
    match general_purpose::STANDARD.decode(code_base64) {
        Ok(hash) => serde_json::json!({ "code_hash": bs58::encode(hash).into_string() }),
        Err(_) => serde_json::json!({ "code": null }),
    }
}

fn decode_args(args_base64: &str) -> Option<serde_json::Value> {
    let bytes = general_purpose::STANDARD.decode(args_base64).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// EVM transactions reach NEAR wrapped in `rlp_execute` calls (NEP-518).
/// The embedded transaction is addressed by the keccak-256 of its raw bytes
/// on EVM tooling, so that hash is kept alongside the action.
fn rlp_transaction_hash(method_name: &str, args: &serde_json::Value) -> Option<String> {
    if method_name != "rlp_execute" {
        return None;
    }
    let tx_bytes = general_purpose::STANDARD
        .decode(args.get("tx_bytes_b64")?.as_str()?)
        .ok()?;
    Some(format!("0x{}", hex::encode(Keccak256::digest(&tx_bytes))))
}
