//! Entry Table
//!
//! SQLite-backed storage for feed entries. Every successful insert is
//! announced on a broadcast change feed, which the server bridges to
//! WebSocket subscribers and `LocalEntryStore` exposes as a `Subscription`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::store::{EntryStore, Subscription};
use super::types::{FeedEntry, NewEntry};

/// Capacity of the insert change feed
const CHANGE_FEED_CAPACITY: usize = 1024;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entries (
    id         TEXT PRIMARY KEY,
    content    TEXT NOT NULL,
    author     TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS entries_created_at ON entries (created_at);
";

/// The entries table and its change feed
pub struct EntryTable {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<FeedEntry>,
}

impl EntryTable {
    /// Open (or create) the table in a database file
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        tracing::info!(path = ?path, "Opened entry table");
        Self::with_connection(conn)
    }

    /// Table that lives only as long as the process
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        Ok(Self {
            conn: Mutex::new(conn),
            changes,
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> StoreResult<Vec<FeedEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, content, author, created_at FROM entries
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, content, author, created_at) = row?;
            entries.push(FeedEntry {
                id: Uuid::parse_str(&id)
                    .map_err(|e| StoreError::Corruption(format!("id {}: {}", id, e)))?,
                content,
                author,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| {
                        StoreError::Corruption(format!("created_at {}: {}", created_at, e))
                    })?
                    .with_timezone(&Utc),
            });
        }

        Ok(entries)
    }

    /// Insert with the current time as `created_at`
    pub fn insert(&self, entry: NewEntry) -> StoreResult<FeedEntry> {
        self.insert_at(entry, Utc::now())
    }

    /// Insert with an explicit `created_at` (imports, seeding)
    pub fn insert_at(&self, entry: NewEntry, created_at: DateTime<Utc>) -> StoreResult<FeedEntry> {
        let stored = FeedEntry {
            id: Uuid::new_v4(),
            content: entry.content,
            author: entry.author,
            created_at,
        };

        self.conn()?.execute(
            "INSERT INTO entries (id, content, author, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                stored.id.to_string(),
                stored.content,
                stored.author,
                // Fixed-width UTC so text order matches time order
                stored.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;

        tracing::debug!(id = %stored.id, author = %stored.author, "Entry inserted");

        // No receivers is fine
        let _ = self.changes.send(stored.clone());

        Ok(stored)
    }

    /// Number of stored entries
    pub fn count(&self) -> StoreResult<usize> {
        let n: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Receiver for entries inserted from now on
    pub fn subscribe_changes(&self) -> broadcast::Receiver<FeedEntry> {
        self.changes.subscribe()
    }

    /// Number of live change-feed receivers
    pub fn change_subscribers(&self) -> usize {
        self.changes.receiver_count()
    }
}

/// In-process `EntryStore` over an `EntryTable`
#[derive(Clone)]
pub struct LocalEntryStore {
    table: Arc<EntryTable>,
}

impl LocalEntryStore {
    pub fn new(table: Arc<EntryTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<EntryTable> {
        &self.table
    }
}

#[async_trait]
impl EntryStore for LocalEntryStore {
    async fn recent(&self, limit: usize) -> StoreResult<Vec<FeedEntry>> {
        self.table.recent(limit)
    }

    async fn insert(&self, entry: NewEntry) -> StoreResult<FeedEntry> {
        self.table.insert(entry)
    }

    async fn subscribe(&self) -> StoreResult<Subscription> {
        // Register before returning so no later insert is missed
        let mut changes = self.table.subscribe_changes();

        Ok(Subscription::spawn(|tx| async move {
            loop {
                match changes.recv().await {
                    Ok(entry) => {
                        if tx.send(entry).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Local subscription lagged, entries skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }
}
