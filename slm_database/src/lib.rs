#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use serde_json::Value;
use tokio_postgres::{types::ToSql, NoTls, Row};

pub use crate::error::{DatabaseError, ErrorKind};
pub use crate::memory::MemoryStore;

mod error;
mod memory;

/// Named values persisted across restarts.
#[async_trait]
pub trait OptionStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<Value>, DatabaseError>;

    /// Inserts the option or replaces its current value.
    async fn set(&self, name: &str, value: Value) -> Result<(), DatabaseError>;

    /// Removes the option. Deleting an option which does not exist is not an error.
    async fn delete(&self, name: &str) -> Result<(), DatabaseError>;
}

/// Options kept in a Postgres `options` table.
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Connects to the database and creates the `options` table if it is missing.
    pub async fn new(connection_string: &str) -> Result<Self, DatabaseError> {
        let config = connection_string.parse::<tokio_postgres::Config>()?;
        let manager = Manager::from_config(
            config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager).max_size(4).build()?;

        let database = Self { pool };
        database.migrate().await?;
        Ok(database)
    }

    async fn migrate(&self) -> Result<(), DatabaseError> {
        let client = self.pool.get().await?;
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS options (name TEXT PRIMARY KEY, value JSONB NOT NULL)",
            )
            .await?;
        tracing::debug!("options table ready");
        Ok(())
    }

    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, DatabaseError> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(statement).await?;
        let res = client.execute(&statement, params).await?;
        Ok(res)
    }

    pub async fn query_opt(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, DatabaseError> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(statement).await?;
        let row = client.query_opt(&statement, params).await?;
        Ok(row)
    }
}

#[async_trait]
impl OptionStore for Database {
    async fn get(&self, name: &str) -> Result<Option<Value>, DatabaseError> {
        let row = self
            .query_opt("SELECT value FROM options WHERE name = $1", &[&name])
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<_, Value>("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, name: &str, value: Value) -> Result<(), DatabaseError> {
        self.execute(
            r"INSERT INTO options(name, value) VALUES($1, $2)
            ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value",
            &[&name, &value],
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), DatabaseError> {
        self.execute("DELETE FROM options WHERE name = $1", &[&name])
            .await?;
        Ok(())
    }
}
