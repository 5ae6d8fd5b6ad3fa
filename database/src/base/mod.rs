mod events_indexer;
pub use crate::base::events_indexer::EventsIndexerDbManager;

#[async_trait::async_trait]
pub trait BaseDbManager {
    async fn new(config: &configuration::DatabaseConfig) -> anyhow::Result<Box<Self>>;
}
