use bigdecimal::{BigDecimal, ToPrimitive};

use crate::models;

/// Parent transactions are expected to land within 5 minutes before the
/// block that includes the receipt. Keeps the fallback lookups off the
/// full table history.
const PARENT_TX_LOOKBACK_NANOS: u64 = 300_000_000_000;

#[async_trait::async_trait]
impl crate::EventsIndexerDbManager for crate::PostgresDBManager {
    async fn save_blocks(&self, blocks: Vec<models::Block>) -> anyhow::Result<()> {
        for chunk in blocks.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_blocks", "blocks"])
                .inc();
            self.retry_write("blocks", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO blocks (author_account_id, block_hash, block_height, block_timestamp, gas_price, prev_block_hash, total_supply) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, block| {
                    values
                        .push_bind(&block.author_account_id)
                        .push_bind(&block.block_hash)
                        .push_bind(&block.block_height)
                        .push_bind(&block.block_timestamp)
                        .push_bind(&block.gas_price)
                        .push_bind(&block.prev_block_hash)
                        .push_bind(&block.total_supply);
                });
                query_builder.push(" ON CONFLICT (block_height) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_chunks(&self, chunks: Vec<models::Chunk>) -> anyhow::Result<()> {
        for chunk in chunks.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_chunks", "chunks"])
                .inc();
            self.retry_write("chunks", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO chunks (author_account_id, chunk_hash, gas_limit, gas_used, included_in_block_hash, included_in_block_timestamp, shard_id) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, row| {
                    values
                        .push_bind(&row.author_account_id)
                        .push_bind(&row.chunk_hash)
                        .push_bind(&row.gas_limit)
                        .push_bind(&row.gas_used)
                        .push_bind(&row.included_in_block_hash)
                        .push_bind(&row.included_in_block_timestamp)
                        .push_bind(&row.shard_id);
                });
                query_builder.push(" ON CONFLICT (chunk_hash) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_transactions(
        &self,
        transactions: Vec<models::Transaction>,
    ) -> anyhow::Result<()> {
        for chunk in transactions.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_transactions", "transactions"])
                .inc();
            self.retry_write("transactions", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO transactions (block_timestamp, converted_into_receipt_id, included_in_block_hash, included_in_chunk_hash, index_in_chunk, receipt_conversion_gas_burnt, receipt_conversion_tokens_burnt, receiver_account_id, signer_account_id, status, transaction_hash) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, tx| {
                    values
                        .push_bind(&tx.block_timestamp)
                        .push_bind(&tx.converted_into_receipt_id)
                        .push_bind(&tx.included_in_block_hash)
                        .push_bind(&tx.included_in_chunk_hash)
                        .push_bind(tx.index_in_chunk)
                        .push_bind(&tx.receipt_conversion_gas_burnt)
                        .push_bind(&tx.receipt_conversion_tokens_burnt)
                        .push_bind(&tx.receiver_account_id)
                        .push_bind(&tx.signer_account_id)
                        .push_bind(&tx.status)
                        .push_bind(&tx.transaction_hash);
                });
                query_builder.push(" ON CONFLICT (transaction_hash) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_receipts(&self, receipts: Vec<models::Receipt>) -> anyhow::Result<()> {
        for chunk in receipts.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_receipts", "receipts"])
                .inc();
            self.retry_write("receipts", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO receipts (included_in_block_hash, included_in_block_timestamp, included_in_chunk_hash, index_in_chunk, originated_from_transaction_hash, predecessor_account_id, receipt_id, receipt_kind, receiver_account_id) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, receipt| {
                    values
                        .push_bind(&receipt.included_in_block_hash)
                        .push_bind(&receipt.included_in_block_timestamp)
                        .push_bind(&receipt.included_in_chunk_hash)
                        .push_bind(receipt.index_in_chunk)
                        .push_bind(&receipt.originated_from_transaction_hash)
                        .push_bind(&receipt.predecessor_account_id)
                        .push_bind(&receipt.receipt_id)
                        .push_bind(&receipt.receipt_kind)
                        .push_bind(&receipt.receiver_account_id);
                });
                query_builder.push(" ON CONFLICT (receipt_id) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_action_receipt_actions(
        &self,
        actions: Vec<models::ActionReceiptAction>,
    ) -> anyhow::Result<()> {
        for chunk in actions.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_action_receipt_actions", "action_receipt_actions"])
                .inc();
            self.retry_write("action_receipt_actions", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO action_receipt_actions (action_kind, args, index_in_action_receipt, nep518_rlp_hash, receipt_id, receipt_included_in_block_timestamp, receipt_predecessor_account_id, receipt_receiver_account_id) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, action| {
                    values
                        .push_bind(&action.action_kind)
                        .push_bind(&action.args)
                        .push_bind(action.index_in_action_receipt)
                        .push_bind(&action.nep518_rlp_hash)
                        .push_bind(&action.receipt_id)
                        .push_bind(&action.receipt_included_in_block_timestamp)
                        .push_bind(&action.receipt_predecessor_account_id)
                        .push_bind(&action.receipt_receiver_account_id);
                });
                query_builder
                    .push(" ON CONFLICT (receipt_id, index_in_action_receipt) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_action_receipt_input_data(
        &self,
        input_data: Vec<models::ActionReceiptInputData>,
    ) -> anyhow::Result<()> {
        for chunk in input_data.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_action_receipt_input_data", "action_receipt_input_data"])
                .inc();
            self.retry_write("action_receipt_input_data", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO action_receipt_input_data (input_data_id, input_to_receipt_id) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, row| {
                    values
                        .push_bind(&row.input_data_id)
                        .push_bind(&row.input_to_receipt_id);
                });
                query_builder
                    .push(" ON CONFLICT (input_data_id, input_to_receipt_id) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_action_receipt_output_data(
        &self,
        output_data: Vec<models::ActionReceiptOutputData>,
    ) -> anyhow::Result<()> {
        for chunk in output_data.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&[
                    "save_action_receipt_output_data",
                    "action_receipt_output_data",
                ])
                .inc();
            self.retry_write("action_receipt_output_data", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO action_receipt_output_data (output_data_id, output_from_receipt_id, receiver_account_id) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, row| {
                    values
                        .push_bind(&row.output_data_id)
                        .push_bind(&row.output_from_receipt_id)
                        .push_bind(&row.receiver_account_id);
                });
                query_builder
                    .push(" ON CONFLICT (output_data_id, output_from_receipt_id) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_execution_outcomes(
        &self,
        outcomes: Vec<models::ExecutionOutcome>,
    ) -> anyhow::Result<()> {
        for chunk in outcomes.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_execution_outcomes", "execution_outcomes"])
                .inc();
            self.retry_write("execution_outcomes", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO execution_outcomes (executed_in_block_hash, executed_in_block_timestamp, executor_account_id, gas_burnt, index_in_chunk, receipt_id, shard_id, status, tokens_burnt) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, outcome| {
                    values
                        .push_bind(&outcome.executed_in_block_hash)
                        .push_bind(&outcome.executed_in_block_timestamp)
                        .push_bind(&outcome.executor_account_id)
                        .push_bind(&outcome.gas_burnt)
                        .push_bind(outcome.index_in_chunk)
                        .push_bind(&outcome.receipt_id)
                        .push_bind(&outcome.shard_id)
                        .push_bind(&outcome.status)
                        .push_bind(&outcome.tokens_burnt);
                });
                query_builder.push(" ON CONFLICT (receipt_id) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_execution_outcome_receipts(
        &self,
        outcome_receipts: Vec<models::ExecutionOutcomeReceipt>,
    ) -> anyhow::Result<()> {
        for chunk in outcome_receipts.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&[
                    "save_execution_outcome_receipts",
                    "execution_outcome_receipts",
                ])
                .inc();
            self.retry_write("execution_outcome_receipts", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO execution_outcome_receipts (executed_receipt_id, index_in_execution_outcome, produced_receipt_id) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, row| {
                    values
                        .push_bind(&row.executed_receipt_id)
                        .push_bind(row.index_in_execution_outcome)
                        .push_bind(&row.produced_receipt_id);
                });
                query_builder.push(
                    " ON CONFLICT (executed_receipt_id, index_in_execution_outcome, produced_receipt_id) DO NOTHING",
                );
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_ft_events(&self, events: Vec<models::FtEvent>) -> anyhow::Result<()> {
        for chunk in events.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_ft_events", "ft_events"])
                .inc();
            self.retry_write("ft_events", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO ft_events (affected_account_id, block_height, block_timestamp, cause, contract_account_id, delta_amount, event_index, event_memo, involved_account_id, receipt_id, standard, status) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, event| {
                    values
                        .push_bind(&event.affected_account_id)
                        .push_bind(&event.block_height)
                        .push_bind(&event.block_timestamp)
                        .push_bind(&event.cause)
                        .push_bind(&event.contract_account_id)
                        .push_bind(&event.delta_amount)
                        .push_bind(&event.event_index)
                        .push_bind(&event.event_memo)
                        .push_bind(&event.involved_account_id)
                        .push_bind(&event.receipt_id)
                        .push_bind(&event.standard)
                        .push_bind(&event.status);
                });
                query_builder.push(" ON CONFLICT (event_index, block_timestamp) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_nft_events(&self, events: Vec<models::NftEvent>) -> anyhow::Result<()> {
        for chunk in events.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_nft_events", "nft_events"])
                .inc();
            self.retry_write("nft_events", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO nft_events (affected_account_id, authorized_account_id, block_height, block_timestamp, cause, contract_account_id, delta_amount, event_index, event_memo, involved_account_id, receipt_id, standard, status, token_id) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, event| {
                    values
                        .push_bind(&event.affected_account_id)
                        .push_bind(&event.authorized_account_id)
                        .push_bind(&event.block_height)
                        .push_bind(&event.block_timestamp)
                        .push_bind(&event.cause)
                        .push_bind(&event.contract_account_id)
                        .push_bind(event.delta_amount)
                        .push_bind(&event.event_index)
                        .push_bind(&event.event_memo)
                        .push_bind(&event.involved_account_id)
                        .push_bind(&event.receipt_id)
                        .push_bind(&event.standard)
                        .push_bind(&event.status)
                        .push_bind(&event.token_id);
                });
                query_builder.push(" ON CONFLICT (event_index, block_timestamp) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn save_dex_events(&self, events: Vec<models::DexEvent>) -> anyhow::Result<()> {
        for chunk in events.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["save_dex_events", "dex_events"])
                .inc();
            self.retry_write("dex_events", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO dex_events (amount_usd, base_amount, event_index, type, maker, pair_id, price_token, price_usd, quote_amount, receipt_id, timestamp) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, event| {
                    values
                        .push_bind(&event.amount_usd)
                        .push_bind(&event.base_amount)
                        .push_bind(&event.event_index)
                        .push_bind(&event.event_type)
                        .push_bind(&event.maker)
                        .push_bind(event.pair_id)
                        .push_bind(&event.price_token)
                        .push_bind(&event.price_usd)
                        .push_bind(&event.quote_amount)
                        .push_bind(&event.receipt_id)
                        .push_bind(event.timestamp);
                });
                query_builder.push(" ON CONFLICT (event_index, timestamp) DO NOTHING");
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn upsert_dex_pairs(&self, pairs: Vec<models::DexPair>) -> anyhow::Result<()> {
        for chunk in pairs.chunks(self.insert_batch_size) {
            crate::metrics::DATABASE_QUERIES
                .with_label_values(&["upsert_dex_pairs", "dex_pairs"])
                .inc();
            self.retry_write("dex_pairs", || async {
                let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
                    "INSERT INTO dex_pairs (base, contract, pool, price_token, price_usd, quote) ",
                );
                query_builder.push_values(chunk.iter(), |mut values, pair| {
                    values
                        .push_bind(&pair.base)
                        .push_bind(&pair.contract)
                        .push_bind(&pair.pool)
                        .push_bind(&pair.price_token)
                        .push_bind(&pair.price_usd)
                        .push_bind(&pair.quote);
                });
                query_builder.push(
                    " ON CONFLICT (contract, pool) DO UPDATE SET price_token = EXCLUDED.price_token, price_usd = EXCLUDED.price_usd, updated_at = now()",
                );
                query_builder.build().execute(&self.pg_pool).await?;
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    async fn get_tx_hashes_by_input_data(
        &self,
        data_ids: Vec<String>,
        block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>> {
        crate::metrics::DATABASE_QUERIES
            .with_label_values(&["get_tx_hashes_by_input_data", "action_receipt_input_data"])
            .inc();
        let rows: Vec<(String, String)> = sqlx::query_as(
            "
            SELECT d.input_data_id, r.originated_from_transaction_hash
            FROM action_receipt_input_data d
            JOIN receipts r ON d.input_to_receipt_id = r.receipt_id
            WHERE d.input_data_id = ANY($1)
              AND r.included_in_block_timestamp BETWEEN $2 AND $3;
            ",
        )
        .bind(&data_ids)
        .bind(BigDecimal::from(
            block_timestamp.saturating_sub(PARENT_TX_LOOKBACK_NANOS),
        ))
        .bind(BigDecimal::from(block_timestamp))
        .fetch_all(&self.pg_pool)
        .await?;
        Ok(rows)
    }

    async fn get_tx_hashes_by_output_data(
        &self,
        data_ids: Vec<String>,
        block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>> {
        crate::metrics::DATABASE_QUERIES
            .with_label_values(&["get_tx_hashes_by_output_data", "action_receipt_output_data"])
            .inc();
        let rows: Vec<(String, String)> = sqlx::query_as(
            "
            SELECT d.output_data_id, r.originated_from_transaction_hash
            FROM action_receipt_output_data d
            JOIN receipts r ON d.output_from_receipt_id = r.receipt_id
            WHERE d.output_data_id = ANY($1)
              AND r.included_in_block_timestamp BETWEEN $2 AND $3;
            ",
        )
        .bind(&data_ids)
        .bind(BigDecimal::from(
            block_timestamp.saturating_sub(PARENT_TX_LOOKBACK_NANOS),
        ))
        .bind(BigDecimal::from(block_timestamp))
        .fetch_all(&self.pg_pool)
        .await?;
        Ok(rows)
    }

    async fn get_tx_hashes_by_produced_receipts(
        &self,
        receipt_ids: Vec<String>,
        block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>> {
        crate::metrics::DATABASE_QUERIES
            .with_label_values(&[
                "get_tx_hashes_by_produced_receipts",
                "execution_outcome_receipts",
            ])
            .inc();
        let rows: Vec<(String, String)> = sqlx::query_as(
            "
            SELECT o.produced_receipt_id, r.originated_from_transaction_hash
            FROM execution_outcome_receipts o
            JOIN receipts r ON o.executed_receipt_id = r.receipt_id
            WHERE o.produced_receipt_id = ANY($1)
              AND r.included_in_block_timestamp BETWEEN $2 AND $3;
            ",
        )
        .bind(&receipt_ids)
        .bind(BigDecimal::from(
            block_timestamp.saturating_sub(PARENT_TX_LOOKBACK_NANOS),
        ))
        .bind(BigDecimal::from(block_timestamp))
        .fetch_all(&self.pg_pool)
        .await?;
        Ok(rows)
    }

    async fn get_tx_hashes_by_converted_transactions(
        &self,
        receipt_ids: Vec<String>,
        block_timestamp: u64,
    ) -> anyhow::Result<Vec<(String, String)>> {
        crate::metrics::DATABASE_QUERIES
            .with_label_values(&["get_tx_hashes_by_converted_transactions", "transactions"])
            .inc();
        let rows: Vec<(String, String)> = sqlx::query_as(
            "
            SELECT converted_into_receipt_id, transaction_hash
            FROM transactions
            WHERE converted_into_receipt_id = ANY($1)
              AND block_timestamp BETWEEN $2 AND $3;
            ",
        )
        .bind(&receipt_ids)
        .bind(BigDecimal::from(
            block_timestamp.saturating_sub(PARENT_TX_LOOKBACK_NANOS),
        ))
        .bind(BigDecimal::from(block_timestamp))
        .fetch_all(&self.pg_pool)
        .await?;
        Ok(rows)
    }

    async fn get_dex_pairs(
        &self,
        contract: &str,
        pools: Vec<BigDecimal>,
    ) -> anyhow::Result<Vec<models::DexPairPrice>> {
        crate::metrics::DATABASE_QUERIES
            .with_label_values(&["get_dex_pairs", "dex_pairs"])
            .inc();
        let rows: Vec<(
            i64,
            BigDecimal,
            String,
            String,
            i32,
            i32,
            Option<BigDecimal>,
            Option<BigDecimal>,
        )> = sqlx::query_as(
            "
            SELECT d.id, d.pool, d.base, d.quote, b.decimals, q.decimals, d.price_token, d.price_usd
            FROM dex_pairs d
            JOIN ft_meta b ON d.base = b.contract
            JOIN ft_meta q ON d.quote = q.contract
            WHERE d.contract = $1
              AND d.pool = ANY($2);
            ",
        )
        .bind(contract)
        .bind(&pools)
        .fetch_all(&self.pg_pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(
                |(id, pool, base, quote, base_decimal, quote_decimal, price_token, price_usd)| {
                    models::DexPairPrice {
                        id,
                        pool,
                        base,
                        quote,
                        base_decimal,
                        quote_decimal,
                        price_token,
                        price_usd,
                    }
                },
            )
            .collect())
    }

    async fn get_reference_price_token(
        &self,
        contract: &str,
        base: &str,
        quotes: Vec<String>,
    ) -> anyhow::Result<Option<BigDecimal>> {
        crate::metrics::DATABASE_QUERIES
            .with_label_values(&["get_reference_price_token", "dex_pairs"])
            .inc();
        let row: Option<(BigDecimal,)> = sqlx::query_as(
            "
            SELECT price_token
            FROM dex_pairs
            WHERE contract = $1
              AND base = $2
              AND quote = ANY($3)
              AND price_token IS NOT NULL
            ORDER BY updated_at DESC
            LIMIT 1;
            ",
        )
        .bind(contract)
        .bind(base)
        .bind(&quotes)
        .fetch_optional(&self.pg_pool)
        .await?;
        Ok(row.map(|(price_token,)| price_token))
    }

    async fn update_meta(&self, indexer_id: &str, block_height: u64) -> anyhow::Result<()> {
        sqlx::query(
            "
            INSERT INTO meta (indexer_id, last_processed_block_height)
            VALUES ($1, $2)
            ON CONFLICT (indexer_id)
            DO UPDATE SET last_processed_block_height = $2;
            ",
        )
        .bind(indexer_id)
        .bind(BigDecimal::from(block_height))
        .execute(&self.pg_pool)
        .await?;
        Ok(())
    }

    async fn get_last_processed_block_height(&self, indexer_id: &str) -> anyhow::Result<u64> {
        let (last_processed_block_height,): (BigDecimal,) = sqlx::query_as(
            "
            SELECT last_processed_block_height
            FROM meta
            WHERE indexer_id = $1
            LIMIT 1;
            ",
        )
        .bind(indexer_id)
        .fetch_one(&self.pg_pool)
        .await?;
        last_processed_block_height
            .to_u64()
            .ok_or_else(|| anyhow::anyhow!("Failed to parse `last_processed_block_height` to u64"))
    }
}
