use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod configs;
mod default_env_configs;

pub use crate::configs::block_stream::BlockStreamConfig;
pub use crate::configs::database::DatabaseConfig;
pub use crate::configs::general::{ChainId, GeneralEventsIndexerConfig};
pub use crate::configs::CommonConfig;

#[derive(Debug, Clone)]
pub struct EventsIndexerConfig {
    pub general: GeneralEventsIndexerConfig,
    pub block_stream: BlockStreamConfig,
    pub database: DatabaseConfig,
}

impl From<CommonConfig> for EventsIndexerConfig {
    fn from(common_config: CommonConfig) -> Self {
        let chain_id = common_config.general.chain_id.clone();
        Self {
            general: common_config.general.into(),
            block_stream: common_config
                .block_stream
                .to_block_stream_config(chain_id),
            database: common_config.database.into(),
        }
    }
}

async fn read_toml_file(path_file: &std::path::Path) -> anyhow::Result<CommonConfig> {
    match std::fs::read_to_string(path_file) {
        Ok(content) => match toml::from_str::<CommonConfig>(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                anyhow::bail!(
                    "Unable to load data from: {:?}.\n Error: {}",
                    path_file.to_str(),
                    err
                );
            }
        },
        Err(err) => {
            anyhow::bail!(
                "Could not read file: {:?}.\n Error: {}",
                path_file.to_str(),
                err
            );
        }
    }
}

/// Reads `config.toml` from the current directory or falls back to the
/// env-driven default configuration.
pub async fn read_configuration<T>() -> anyhow::Result<T>
where
    T: From<CommonConfig>,
{
    let path_root = std::path::Path::new("config.toml");
    let common_config = if path_root.exists() {
        read_toml_file(path_root).await?
    } else {
        toml::from_str::<CommonConfig>(default_env_configs::DEFAULT_CONFIG)
            .map_err(|err| anyhow::anyhow!("Unable to load default configuration: {}", err))?
    };
    Ok(T::from(common_config))
}

pub fn init_tracing(indexer: &str) -> anyhow::Result<()> {
    let mut env_filter = tracing_subscriber::EnvFilter::new(format!("{indexer}=info"));

    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        if !rust_log.is_empty() {
            for directive in rust_log.split(',').filter_map(|s| match s.parse() {
                Ok(directive) => Some(directive),
                Err(err) => {
                    eprintln!("Ignoring directive `{}`: {}", s, err);
                    None
                }
            }) {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }

    let subscriber = tracing_subscriber::Registry::default().with(env_filter);
    subscriber
        .with(tracing_subscriber::fmt::Layer::default().compact())
        .try_init()?;

    Ok(())
}
