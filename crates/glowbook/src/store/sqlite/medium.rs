//! SQLite storage medium.

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use glowbook_core::cache::{CacheError, Result, StorageMedium};

use super::error::{map_tokio_rusqlite_error, wrap_err};
use super::schema;

/// SQLite-backed medium. Values survive restarts; batches run in a single
/// transaction.
pub struct SqliteMedium {
    conn: Connection,
}

impl SqliteMedium {
    /// Opens (or creates) the database file at `path`.
    pub async fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Opens an in-memory database. Data is lost when the medium is dropped.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(map_tokio_rusqlite_error)
    }
}

#[async_trait]
impl StorageMedium for SqliteMedium {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_VALUE, [&key], |row| row.get(0))
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(schema::UPSERT_VALUE, [&key, &value])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(schema::DELETE_VALUE, [&key])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_KEYS).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([], |row| row.get::<_, String>(0))
                    .map_err(wrap_err)?;

                let mut keys = Vec::new();
                for row_result in rows {
                    keys.push(row_result.map_err(wrap_err)?);
                }
                Ok(keys)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let keys = keys.to_vec();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_VALUE).map_err(wrap_err)?;
                let mut values = Vec::with_capacity(keys.len());
                for key in &keys {
                    let value = stmt
                        .query_row([key], |row| row.get(0))
                        .optional()
                        .map_err(wrap_err)?;
                    values.push(value);
                }
                Ok(values)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<()> {
        let pairs = pairs.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                {
                    let mut stmt = tx.prepare(schema::UPSERT_VALUE).map_err(wrap_err)?;
                    for (key, value) in &pairs {
                        stmt.execute([key, value]).map_err(wrap_err)?;
                    }
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<()> {
        let keys = keys.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                {
                    let mut stmt = tx.prepare(schema::DELETE_VALUE).map_err(wrap_err)?;
                    for key in &keys {
                        stmt.execute([key]).map_err(wrap_err)?;
                    }
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }
}
