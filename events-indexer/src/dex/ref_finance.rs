use std::collections::{BTreeMap, BTreeSet, HashMap};

use base64::{engine::general_purpose, Engine as _};
use bigdecimal::{BigDecimal, ToPrimitive, Zero};

use indexer_primitives::{views, DexEventType, EventType};

use crate::dex::{STABLE_TOKENS, WRAP_NEAR};
use crate::events::compose_event_index;

const DEX: &str = "dex";

pub(crate) const CONTRACT: &str = "v2.ref-finance.near";
const POOL_METHOD: &str = "add_simple_pool";
const SWAP_METHODS: [&str; 2] = ["swap", "ft_on_transfer"];
/// Fractional digits kept after price division.
const DIVISION_SCALE: i64 = 12;

lazy_static! {
    static ref SWAP_PATTERN: regex::Regex =
        regex::Regex::new(r"^Swapped (\d+) ([\S]+) for (\d+) ([\S]+)").unwrap();
}

/// One `Swapped ...` log matched to its pool, before the pair is known.
struct SwapCandidate {
    amount_in: BigDecimal,
    token_in: String,
    amount_out: BigDecimal,
    token_out: String,
    maker: String,
    pool: u64,
    receipt_id: String,
    event_index: BigDecimal,
}

struct PriceQuote {
    event_type: DexEventType,
    base_amount: BigDecimal,
    quote_amount: BigDecimal,
    price_token: Option<BigDecimal>,
    price_usd: Option<BigDecimal>,
    amount_usd: Option<BigDecimal>,
}

#[derive(serde::Deserialize)]
struct PoolArgs {
    tokens: Vec<String>,
}

#[derive(serde::Deserialize)]
struct SwapArgs {
    actions: Vec<SwapAction>,
}

#[derive(serde::Deserialize)]
struct SwapAction {
    pool_id: u64,
}

#[derive(serde::Deserialize)]
struct FtOnTransferArgs {
    msg: String,
}

/// Extracts ref finance pool creations and swaps from one block and stores
/// them as `dex_events` rows plus refreshed `dex_pairs` prices.
///
/// Swap logs are priced against pairs already stored in the database. A log
/// whose pool cannot be identified (unparseable args, pool registered in
/// this very block, pair without token metadata) is dropped with a warning
/// rather than aborting the block.
pub(crate) async fn sync(
    db_manager: &(impl database::EventsIndexerDbManager + Send + Sync + 'static),
    block_message: &views::BlockMessage,
) -> anyhow::Result<()> {
    let header = &block_message.block.header;
    // Pair rows to upsert, keyed by pool id. Within one block the latest
    // write wins, so a pool swapped twice ends up with the last price.
    let mut pool_map: BTreeMap<u64, database::models::DexPair> = BTreeMap::new();
    let mut pool_ids = BTreeSet::new();
    let mut candidates = Vec::new();

    for shard in &block_message.shards {
        let mut index_in_shard = 0;
        for outcome in &shard.receipt_execution_outcomes {
            let Some(receipt) = &outcome.receipt else {
                continue;
            };
            if receipt.receiver_id != CONTRACT
                || !outcome.execution_outcome.outcome.status.is_success()
            {
                continue;
            }
            let views::ReceiptEnumView::Action(action_receipt) = &receipt.receipt else {
                continue;
            };

            for action in &action_receipt.actions {
                let views::ActionView::FunctionCall {
                    method_name, args, ..
                } = action
                else {
                    continue;
                };

                if method_name == POOL_METHOD {
                    if let Some((pool, base, quote)) =
                        created_pool(args, &outcome.execution_outcome.outcome.status)
                    {
                        tracing::info!(
                            target: DEX,
                            "New pair on {}: pool {} ({}/{})",
                            CONTRACT,
                            pool,
                            base,
                            quote,
                        );
                        pool_map.insert(
                            pool,
                            database::models::DexPair {
                                base,
                                contract: CONTRACT.to_string(),
                                pool: pool.into(),
                                price_token: None,
                                price_usd: None,
                                quote,
                            },
                        );
                    }
                    continue;
                }

                if !SWAP_METHODS.contains(&method_name.as_str()) {
                    continue;
                }

                for (match_index, captures) in outcome
                    .execution_outcome
                    .outcome
                    .logs
                    .iter()
                    .filter_map(|log| SWAP_PATTERN.captures(log))
                    .enumerate()
                {
                    let Some(amount_in) = parse_amount(&captures[1]) else {
                        continue;
                    };
                    let Some(amount_out) = parse_amount(&captures[3]) else {
                        continue;
                    };
                    let Some(pool) = pool_id(method_name, args, match_index) else {
                        tracing::warn!(
                            target: DEX,
                            "Block {}: dropping swap log #{} of receipt {}, no pool id in {} args",
                            header.height,
                            match_index,
                            outcome.execution_outcome.id,
                            method_name,
                        );
                        crate::metrics::DROPPED_SWAPS_TOTAL.inc();
                        continue;
                    };

                    pool_ids.insert(pool);
                    candidates.push(SwapCandidate {
                        amount_in,
                        token_in: captures[2].to_string(),
                        amount_out,
                        token_out: captures[4].to_string(),
                        maker: action_receipt.signer_id.clone(),
                        pool,
                        receipt_id: outcome.execution_outcome.id.clone(),
                        event_index: compose_event_index(
                            shard.shard_id,
                            EventType::Dex,
                            index_in_shard,
                        ),
                    });
                    index_in_shard += 1;
                }
            }
        }
    }

    if candidates.is_empty() && pool_map.is_empty() {
        return Ok(());
    }

    let pools = pool_ids.iter().map(|pool| BigDecimal::from(*pool)).collect();
    let (pairs, near_usd) = futures::try_join!(
        db_manager.get_dex_pairs(CONTRACT, pools),
        db_manager.get_reference_price_token(
            CONTRACT,
            WRAP_NEAR,
            STABLE_TOKENS.iter().map(|token| token.to_string()).collect(),
        ),
    )?;
    let pair_map: HashMap<u64, database::models::DexPairPrice> = pairs
        .into_iter()
        .filter_map(|pair| pair.pool.to_u64().map(|pool| (pool, pair)))
        .collect();

    let mut events = Vec::new();
    for swap in candidates {
        let Some(pair) = pair_map.get(&swap.pool) else {
            tracing::warn!(
                target: DEX,
                "Block {}: dropping swap in receipt {}, pool {} has no stored pair",
                header.height,
                swap.receipt_id,
                swap.pool,
            );
            crate::metrics::DROPPED_SWAPS_TOTAL.inc();
            continue;
        };

        let quote = price_swap(pair, &swap, near_usd.as_ref());
        pool_map.insert(
            swap.pool,
            database::models::DexPair {
                base: pair.base.clone(),
                contract: CONTRACT.to_string(),
                pool: pair.pool.clone(),
                price_token: quote.price_token.clone(),
                price_usd: quote.price_usd.clone(),
                quote: pair.quote.clone(),
            },
        );
        events.push(database::models::DexEvent {
            amount_usd: quote.amount_usd,
            base_amount: quote.base_amount,
            event_index: swap.event_index,
            event_type: quote.event_type.to_string(),
            maker: swap.maker,
            pair_id: pair.id,
            price_token: quote.price_token,
            price_usd: quote.price_usd,
            quote_amount: quote.quote_amount,
            receipt_id: swap.receipt_id,
            timestamp: (header.timestamp_nanosec / 1_000_000_000) as i64,
        });
    }

    let pairs_to_upsert: Vec<database::models::DexPair> = pool_map.into_values().collect();
    crate::metrics::ROWS_WRITTEN_TOTAL
        .with_label_values(&["dex_events"])
        .inc_by(events.len() as u64);
    crate::metrics::ROWS_WRITTEN_TOTAL
        .with_label_values(&["dex_pairs"])
        .inc_by(pairs_to_upsert.len() as u64);

    futures::try_join!(
        db_manager.save_dex_events(events),
        db_manager.upsert_dex_pairs(pairs_to_upsert),
    )?;

    Ok(())
}

/// Pool id and oriented token pair of a successful `add_simple_pool` call.
/// The created pool id arrives as the return value of the call.
fn created_pool(
    args_base64: &str,
    status: &views::ExecutionStatusView,
) -> Option<(u64, String, String)> {
    let views::ExecutionStatusView::SuccessValue(value) = status else {
        return None;
    };
    let pool = String::from_utf8(general_purpose::STANDARD.decode(value).ok()?)
        .ok()?
        .parse()
        .ok()?;

    let args: PoolArgs = decode_args(args_base64)?;
    let mut tokens = args.tokens.into_iter();
    let (token0, token1) = (tokens.next()?, tokens.next()?);
    let (base, quote) = orient_pair(token0, token1);
    Some((pool, base, quote))
}

/// wNEAR and stablecoins go to the quote side of a new pair, so prices read
/// as "base token costs N wNEAR/USD".
fn orient_pair(token0: String, token1: String) -> (String, String) {
    let quote_side = |token: &str| token == WRAP_NEAR || STABLE_TOKENS.contains(&token);
    if !quote_side(&token0) || quote_side(&token1) {
        (token0, token1)
    } else {
        (token1, token0)
    }
}

/// Pool the n-th swap log of a call belongs to. `swap` carries the actions
/// in its own args, `ft_on_transfer` carries them as a JSON document inside
/// the `msg` field.
fn pool_id(method_name: &str, args_base64: &str, match_index: usize) -> Option<u64> {
    let actions = if method_name == "swap" {
        decode_args::<SwapArgs>(args_base64)?.actions
    } else {
        let transfer: FtOnTransferArgs = decode_args(args_base64)?;
        serde_json::from_str::<SwapArgs>(&transfer.msg.replace('\\', ""))
            .ok()?
            .actions
    };
    actions.get(match_index).map(|action| action.pool_id)
}

fn decode_args<T: serde::de::DeserializeOwned>(args_base64: &str) -> Option<T> {
    let bytes = general_purpose::STANDARD.decode(args_base64).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Scales both legs down to human units and prices the base token in the
/// quote token, then in USD when the quote side is a stablecoin or wNEAR
/// (the latter via the reference wNEAR price).
fn price_swap(
    pair: &database::models::DexPairPrice,
    swap: &SwapCandidate,
    near_usd: Option<&BigDecimal>,
) -> PriceQuote {
    // The maker receiving the base token is a buy, paying it out is a sell.
    let (event_type, base_raw, quote_raw) = if swap.token_out == pair.base {
        (DexEventType::Buy, &swap.amount_out, &swap.amount_in)
    } else {
        (DexEventType::Sell, &swap.amount_in, &swap.amount_out)
    };

    let base_amount = scale_down(base_raw, pair.base_decimal);
    let quote_amount = scale_down(quote_raw, pair.quote_decimal);
    let price_token = (!base_amount.is_zero())
        .then(|| (&quote_amount / &base_amount).with_scale(DIVISION_SCALE));
    let price_usd = price_token.as_ref().and_then(|price_token| {
        if STABLE_TOKENS.contains(&pair.quote.as_str()) {
            Some(price_token.clone())
        } else if pair.quote == WRAP_NEAR {
            near_usd.map(|near_usd| (price_token * near_usd).with_scale(DIVISION_SCALE))
        } else {
            None
        }
    });
    let amount_usd = price_usd
        .as_ref()
        .map(|price_usd| (&base_amount * price_usd).with_scale(DIVISION_SCALE));

    PriceQuote {
        event_type,
        base_amount,
        quote_amount,
        price_token,
        price_usd,
        amount_usd,
    }
}

fn scale_down(amount: &BigDecimal, decimals: i32) -> BigDecimal {
    amount * BigDecimal::new(1.into(), i64::from(decimals))
}

fn parse_amount(raw: &str) -> Option<BigDecimal> {
    let amount: BigDecimal = raw.parse().ok()?;
    (!amount.is_zero()).then_some(amount)
}
