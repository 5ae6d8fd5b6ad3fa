use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

mod events_indexer;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("src/postgres/migrations");

pub struct PostgresDBManager {
    pg_pool: sqlx::Pool<sqlx::Postgres>,
    insert_batch_size: usize,
}

impl PostgresDBManager {
    async fn create_pool(
        database_url: &str,
        max_connections: u32,
    ) -> anyhow::Result<sqlx::Pool<sqlx::Postgres>> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Self::run_migrations(&MIGRATOR, &pool).await?;
        Ok(pool)
    }

    async fn run_migrations(
        migrator: &sqlx::migrate::Migrator,
        pool: &sqlx::Pool<sqlx::Postgres>,
    ) -> anyhow::Result<()> {
        migrator.run(pool).await?;
        Ok(())
    }

    /// Runs a write until it succeeds or fails with a non-transient error.
    /// Transient connectivity errors back off exponentially, capped at 30s
    /// between attempts, with no limit on the number of attempts.
    async fn retry_write<T, A, F>(&self, table_name: &str, action: A) -> anyhow::Result<T>
    where
        A: FnMut() -> F,
        F: std::future::Future<Output = Result<T, sqlx::Error>>,
    {
        let retry_strategy =
            ExponentialBackoff::from_millis(10).max_delay(std::time::Duration::from_secs(30));
        let result = RetryIf::spawn(retry_strategy, action, |err: &sqlx::Error| {
            let transient = is_transient_error(err);
            if transient {
                crate::metrics::DATABASE_WRITE_RETRIES
                    .with_label_values(&[table_name])
                    .inc();
                tracing::warn!(
                    "Transient database error on `{}`, retrying: {:?}",
                    table_name,
                    err
                );
            }
            transient
        })
        .await?;
        Ok(result)
    }
}

fn is_transient_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed
    )
}

#[async_trait::async_trait]
impl crate::BaseDbManager for PostgresDBManager {
    async fn new(config: &configuration::DatabaseConfig) -> anyhow::Result<Box<Self>> {
        let pg_pool = Self::create_pool(&config.database_url, config.max_connections).await?;
        Ok(Box::new(Self {
            pg_pool,
            insert_batch_size: config.insert_batch_size,
        }))
    }
}
