//! `SQLite` implementation of [`ValueStore`].
//!
//! Values are stored as JSON text under their `{device_id}-{property_name}`
//! key, so any property value round-trips losslessly.

use sqlx::SqlitePool;

use simthings_app::ports::ValueStore;
use simthings_domain::error::SimThingsError;
use simthings_domain::value::Value;

use crate::error::StorageError;

const UPSERT: &str = r"
    INSERT INTO property_values (key, value) VALUES (?, ?)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value
";

const SELECT: &str = "SELECT value FROM property_values WHERE key = ?";

/// `SQLite`-backed value store.
pub struct SqliteValueRepository {
    pool: SqlitePool,
}

impl SqliteValueRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ValueStore for SqliteValueRepository {
    async fn load(&self, key: &str) -> Result<Option<Value>, SimThingsError> {
        let row: Option<(String,)> = sqlx::query_as(SELECT)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let value = row
            .map(|(json,)| serde_json::from_str(&json).map_err(StorageError::from))
            .transpose()?;
        Ok(value)
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), SimThingsError> {
        let json = serde_json::to_string(value).map_err(StorageError::from)?;

        sqlx::query(UPSERT)
            .bind(key)
            .bind(&json)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }
}
