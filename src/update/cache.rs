use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::CACHE_KEY_NAMESPACE;
use crate::update::error::CacheError;
use crate::update::types::UpdateManifest;

/// A cached manifest together with its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub manifest: UpdateManifest,
    pub expires_at: DateTime<Utc>,
}

/// Trait for storing and retrieving manifests with a time-to-live
#[cfg_attr(test, automock)]
pub trait ManifestStore: Send + Sync {
    /// Get the entry for `key`, or `None` if absent or expired
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Store `manifest` under `key`, replacing any previous entry
    fn set(&self, key: &str, manifest: &UpdateManifest, ttl: Duration) -> Result<(), CacheError>;
}

/// Cache key for a package file identifier (e.g. "my-plugin/my-plugin.php")
pub fn cache_key(package_file: &str) -> String {
    format!("{}{}", CACHE_KEY_NAMESPACE, package_file)
}

/// SQLite-backed manifest store that survives process restarts
pub struct Cache {
    conn: Mutex<Connection>,
}

impl Cache {
    pub fn new(db_path: &Path) -> Result<Self, CacheError> {
        info!("Initializing cache database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        debug!("Database connection established");

        let cache = Self {
            conn: Mutex::new(conn),
        };

        cache.create_schema()?;
        info!("Cache initialized successfully");

        Ok(cache)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Get current timestamp in milliseconds since UNIX epoch
    fn current_timestamp_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS manifests (
                cache_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_expires_at ON manifests(expires_at)",
            [],
        )?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Get the entry for `key` if it is still valid at `now_ms`
    fn get_at(&self, key: &str, now_ms: i64) -> Result<Option<CacheEntry>, CacheError> {
        let conn = self.lock_conn()?;
        let result = conn.query_row(
            "SELECT payload, expires_at FROM manifests WHERE cache_key = ?1 AND expires_at > ?2",
            (key, now_ms),
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        );

        let (payload, expires_at) = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let manifest: UpdateManifest = serde_json::from_str(&payload)?;

        Ok(Some(CacheEntry {
            key: key.to_string(),
            manifest,
            expires_at: DateTime::from_timestamp_millis(expires_at).unwrap_or_default(),
        }))
    }

    fn set_at(
        &self,
        key: &str,
        manifest: &UpdateManifest,
        ttl: Duration,
        now_ms: i64,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(manifest)?;
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now_ms.saturating_add(ttl_ms);

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO manifests (cache_key, payload, expires_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
            (key, &payload, expires_at, now_ms),
        )?;

        debug!(
            "Cached manifest for {} ({} {}) for {}s",
            key,
            manifest.provider_id,
            manifest.remote_version,
            ttl.as_secs()
        );
        Ok(())
    }

    /// Remove the entry for `key`. Returns true if an entry existed.
    pub fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        let conn = self.lock_conn()?;
        let rows = conn.execute("DELETE FROM manifests WHERE cache_key = ?1", [key])?;
        Ok(rows > 0)
    }

    /// Delete every expired entry. Returns the number of removed entries.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Self::current_timestamp_ms();
        let conn = self.lock_conn()?;
        let rows = conn.execute("DELETE FROM manifests WHERE expires_at <= ?1", [now])?;
        if rows > 0 {
            info!("Purged {} expired manifests", rows);
        }
        Ok(rows)
    }
}

impl ManifestStore for Cache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        self.get_at(key, Self::current_timestamp_ms())
    }

    fn set(&self, key: &str, manifest: &UpdateManifest, ttl: Duration) -> Result<(), CacheError> {
        self.set_at(key, manifest, ttl, Self::current_timestamp_ms())
    }
}
