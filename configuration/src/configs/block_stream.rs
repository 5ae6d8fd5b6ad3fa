use serde_derive::Deserialize;

use crate::configs::deserialize_optional_data_or_env;
use crate::configs::general::ChainId;

#[derive(Debug, Clone)]
pub struct BlockStreamConfig {
    pub blocks_url: String,
    pub channel_size: usize,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommonBlockStreamConfig {
    #[serde(deserialize_with = "deserialize_optional_data_or_env", default)]
    pub blocks_url: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_data_or_env", default)]
    pub channel_size: Option<usize>,
}

impl CommonBlockStreamConfig {
    pub fn default_blocks_url(chain_id: ChainId) -> String {
        match chain_id {
            ChainId::Testnet => "https://testnet.neardata.xyz".to_string(),
            _ => "https://mainnet.neardata.xyz".to_string(),
        }
    }

    pub fn default_channel_size() -> usize {
        100
    }

    pub fn to_block_stream_config(&self, chain_id: ChainId) -> BlockStreamConfig {
        BlockStreamConfig {
            blocks_url: self
                .blocks_url
                .clone()
                .unwrap_or_else(|| Self::default_blocks_url(chain_id)),
            channel_size: self.channel_size.unwrap_or_else(Self::default_channel_size),
        }
    }
}

impl Default for CommonBlockStreamConfig {
    fn default() -> Self {
        Self {
            blocks_url: None,
            channel_size: Some(Self::default_channel_size()),
        }
    }
}
