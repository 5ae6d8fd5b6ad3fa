#[macro_use]
extern crate lazy_static;

mod base;
pub mod models;
pub mod postgres;

pub(crate) mod metrics;

use crate::base::BaseDbManager;
pub use crate::base::EventsIndexerDbManager;
pub use crate::postgres::PostgresDBManager;

pub async fn prepare_db_manager<T>(config: &configuration::DatabaseConfig) -> anyhow::Result<T>
where
    T: BaseDbManager + Send + Sync + 'static,
{
    Ok(*T::new(config).await?)
}
