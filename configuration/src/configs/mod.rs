use std::str::FromStr;

use serde::Deserialize;

pub(crate) mod block_stream;
pub(crate) mod database;
pub(crate) mod general;

lazy_static::lazy_static! {
    static ref RE_NAME_ENV: regex::Regex = regex::Regex::new(r"\$\{(?<env_name>\w+)}").unwrap();
}

fn get_env_var<T>(env_var_name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Debug,
{
    let var = dotenv::var(env_var_name).map_err(|err| {
        anyhow::anyhow!(
            "Failed to get env var: {:?}. Error: {:?}",
            env_var_name,
            err
        )
    })?;
    var.parse::<T>().map_err(|err| {
        anyhow::anyhow!(
            "Failed to parse env var: {:?}. Error: {:?}",
            env_var_name,
            err
        )
    })
}

fn deserialize_data_or_env<'de, D, T>(data: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned + FromStr,
    <T as FromStr>::Err: std::fmt::Debug,
{
    let value = serde_json::Value::deserialize(data)?;
    if let serde_json::Value::String(value) = &value {
        if let Some(caps) = RE_NAME_ENV.captures(value) {
            return get_env_var::<T>(&caps["env_name"]).map_err(serde::de::Error::custom);
        }
    }
    serde_json::from_value::<T>(value).map_err(serde::de::Error::custom)
}

fn deserialize_optional_data_or_env<'de, D, T>(data: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned + FromStr,
    <T as FromStr>::Err: std::fmt::Debug,
{
    Ok(match deserialize_data_or_env(data) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("Failed to deserialize_optional_data_or_env: {:?}", err);
            None
        }
    })
}

pub(crate) fn required_value_or_panic<T>(parameter_name: &str, value: Option<T>) -> T {
    if let Some(value) = value {
        value
    } else {
        panic!("Failed to get required parameter: {parameter_name}. Please check your configuration file or environment variables.")
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CommonConfig {
    pub general: general::CommonGeneralConfig,
    #[serde(default)]
    pub block_stream: block_stream::CommonBlockStreamConfig,
    pub database: database::CommonDatabaseConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_toml_with_env_substitution() {
        std::env::set_var("TEST_EVENTS_DATABASE_URL", "postgres://localhost:5432/events");
        std::env::set_var("TEST_EVENTS_CHAIN_ID", "testnet");

        let toml_str = r#"
            [general]
            chain_id = "${TEST_EVENTS_CHAIN_ID}"

            [general.events_indexer]
            indexer_id = "events-indexer-test"

            [block_stream]
            blocks_url = "https://testnet.neardata.xyz"

            [database]
            database_url = "${TEST_EVENTS_DATABASE_URL}"
        "#;

        let config: CommonConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.chain_id, general::ChainId::Testnet);
        assert_eq!(
            config.database.database_url,
            Some("postgres://localhost:5432/events".to_string())
        );
        assert_eq!(
            config.general.events_indexer.indexer_id,
            Some("events-indexer-test".to_string())
        );
    }

    #[test]
    fn missing_optional_values_fall_back_to_defaults() {
        let toml_str = r#"
            [general]
            chain_id = "mainnet"

            [database]
            database_url = "postgres://localhost:5432/events"
        "#;

        let config: CommonConfig = toml::from_str(toml_str).unwrap();
        let config: crate::EventsIndexerConfig = config.into();
        assert_eq!(config.general.indexer_id, "events-indexer");
        assert_eq!(config.general.metrics_server_port, 8080);
        assert_eq!(config.database.insert_batch_size, 1000);
        assert_eq!(config.block_stream.blocks_url, "https://mainnet.neardata.xyz");
    }
}
