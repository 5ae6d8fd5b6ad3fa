use std::str::FromStr;

use serde_derive::Deserialize;

use crate::configs::{deserialize_data_or_env, deserialize_optional_data_or_env};

#[derive(Debug, Clone)]
pub struct GeneralEventsIndexerConfig {
    pub chain_id: ChainId,
    pub indexer_id: String,
    pub metrics_server_port: u16,
    pub tx_hash_cache_size: usize,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CommonGeneralConfig {
    #[serde(deserialize_with = "deserialize_data_or_env")]
    pub chain_id: ChainId,
    #[serde(default)]
    pub events_indexer: CommonGeneralEventsIndexerConfig,
}

#[derive(Deserialize, PartialEq, Debug, Clone, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    #[default]
    Mainnet,
    Testnet,
    Betanet,
    Localnet,
}

impl FromStr for ChainId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(ChainId::Mainnet),
            "testnet" => Ok(ChainId::Testnet),
            "localnet" => Ok(ChainId::Localnet),
            "betanet" => Ok(ChainId::Betanet),
            _ => Err(anyhow::anyhow!("Invalid chain id")),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommonGeneralEventsIndexerConfig {
    #[serde(deserialize_with = "deserialize_optional_data_or_env", default)]
    pub indexer_id: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_data_or_env", default)]
    pub metrics_server_port: Option<u16>,
    #[serde(deserialize_with = "deserialize_optional_data_or_env", default)]
    pub tx_hash_cache_size: Option<usize>,
}

impl CommonGeneralEventsIndexerConfig {
    pub fn default_indexer_id() -> String {
        "events-indexer".to_string()
    }

    pub fn default_metrics_server_port() -> u16 {
        8080
    }

    pub fn default_tx_hash_cache_size() -> usize {
        100_000
    }
}

impl Default for CommonGeneralEventsIndexerConfig {
    fn default() -> Self {
        Self {
            indexer_id: Some(Self::default_indexer_id()),
            metrics_server_port: Some(Self::default_metrics_server_port()),
            tx_hash_cache_size: Some(Self::default_tx_hash_cache_size()),
        }
    }
}

impl From<CommonGeneralConfig> for GeneralEventsIndexerConfig {
    fn from(common_config: CommonGeneralConfig) -> Self {
        Self {
            chain_id: common_config.chain_id,
            indexer_id: common_config
                .events_indexer
                .indexer_id
                .unwrap_or_else(CommonGeneralEventsIndexerConfig::default_indexer_id),
            metrics_server_port: common_config
                .events_indexer
                .metrics_server_port
                .unwrap_or_else(CommonGeneralEventsIndexerConfig::default_metrics_server_port),
            tx_hash_cache_size: common_config
                .events_indexer
                .tx_hash_cache_size
                .unwrap_or_else(CommonGeneralEventsIndexerConfig::default_tx_hash_cache_size),
        }
    }
}
