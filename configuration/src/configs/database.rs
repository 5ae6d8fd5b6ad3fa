use serde_derive::Deserialize;

use crate::configs::{deserialize_optional_data_or_env, required_value_or_panic};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub insert_batch_size: usize,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommonDatabaseConfig {
    #[serde(deserialize_with = "deserialize_optional_data_or_env", default)]
    pub database_url: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_data_or_env", default)]
    pub max_connections: Option<u32>,
    #[serde(deserialize_with = "deserialize_optional_data_or_env", default)]
    pub insert_batch_size: Option<usize>,
}

impl CommonDatabaseConfig {
    pub fn default_max_connections() -> u32 {
        10
    }

    pub fn default_insert_batch_size() -> usize {
        1000
    }
}

impl Default for CommonDatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: Some(Self::default_max_connections()),
            insert_batch_size: Some(Self::default_insert_batch_size()),
        }
    }
}

impl From<CommonDatabaseConfig> for DatabaseConfig {
    fn from(common_config: CommonDatabaseConfig) -> Self {
        Self {
            database_url: required_value_or_panic("database_url", common_config.database_url),
            max_connections: common_config
                .max_connections
                .unwrap_or_else(CommonDatabaseConfig::default_max_connections),
            insert_batch_size: common_config
                .insert_batch_size
                .unwrap_or_else(CommonDatabaseConfig::default_insert_batch_size),
        }
    }
}
