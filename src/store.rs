//! Opaque string key-value stores backing the pending buffer.

use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Mutex;

use crate::error::StoreError;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[("001_kv_store.sql", include_str!("migrations/001_kv_store.sql"))];

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Process-local store, used by tests and by embedders that bring their own
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.to_string());
        MemoryStore {
            values: Mutex::new(values),
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key-value store on a local libsql database file.
pub struct SqlStore {
    conn: Connection,
    _db: LibsqlDatabase,
}

impl SqlStore {
    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool, StoreError> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name.to_string()]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name.to_string()]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<(), StoreError> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql).await.map_err(|e| StoreError::Migration {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        Self::record_migration(conn, name).await
    }

    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS.iter().chain(MIGRATIONS) {
            Self::run_migration(&conn, filename, sql).await?;
        }

        tracing::info!(path = ?path, "[store] opened local database");
        Ok(SqlStore { conn, _db: db })
    }
}

impl KeyValueStore for SqlStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let query = "SELECT value FROM kv_store WHERE key = ?";
        let mut rows = self.conn.query(query, libsql::params![key.to_string()]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get::<String>(0)?))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO kv_store (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#;
        self.conn
            .execute(query, libsql::params![key.to_string(), value.to_string()])
            .await?;
        Ok(())
    }
}
