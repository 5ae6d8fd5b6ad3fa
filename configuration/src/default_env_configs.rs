// This file to present all confiuration around th environment variables
// Not present environment variables will be set to default values
// See more details and information about each parameter in configuration/example.config.toml

pub const DEFAULT_CONFIG: &str = r#"
[general]
chain_id = "${CHAIN_ID}"

[general.events_indexer]
indexer_id = "${EVENTS_INDEXER_ID}"
metrics_server_port = "${EVENTS_SERVER_PORT}"
tx_hash_cache_size = "${TX_HASH_CACHE_SIZE}"

[block_stream]
blocks_url = "${BLOCKS_URL}"
channel_size = "${BLOCKS_CHANNEL_SIZE}"

[database]
database_url = "${DATABASE_URL}"
max_connections = "${MAX_CONNECTIONS}"
insert_batch_size = "${INSERT_BATCH_SIZE}"
"#;
