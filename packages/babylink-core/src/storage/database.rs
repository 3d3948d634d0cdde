//! # Database
//!
//! SQLite-backed message store and user directory mirror.
//!
//! ## Database Operations
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DATABASE OPERATIONS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │   ChatService   │                                                   │
//! │  └────────┬────────┘                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                   │
//! │  │    Database     │  High-level API                                   │
//! │  │   (this file)   │  - User lookups                                   │
//! │  │                 │  - Message insert + pair index                    │
//! │  │                 │  - Read flags                                     │
//! │  └────────┬────────┘                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                   │
//! │  │   SQLite DB     │  - In-memory for tests                            │
//! │  │                 │  - File for production                            │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, types::Type, Connection, Row};
use serde::{Deserialize, Serialize};

use super::schema;
use crate::error::{Error, Result};
use crate::time;
use crate::users::{Role, UserRecord};

/// Columns selected for every user query, in `user_from_row` order.
const USER_COLUMNS: &str = "id, full_name, email, profile_picture, role";

/// Columns selected for every message query, in `message_from_row` order.
const MESSAGE_COLUMNS: &str = "id, sender, receiver, text, read, created_at";

/// A stored direct message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Message ID (UUID v4)
    pub id: String,
    /// Sender's user ID
    pub sender: String,
    /// Receiver's user ID
    pub receiver: String,
    /// Text as submitted, untrimmed
    pub text: String,
    /// Whether the receiver has read it
    pub read: bool,
    /// Creation time, millisecond precision
    pub created_at: DateTime<Utc>,
}

/// Unread message count from one counterparty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    /// Counterparty who sent the unread messages
    pub user_id: String,
    /// Number of unread messages
    pub count: u64,
}

/// The main database handle
///
/// Wraps a single SQLite connection. Cloning shares the connection.
#[derive(Clone)]
pub struct Database {
    /// The underlying SQLite connection
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database
    ///
    /// If path is None, creates an in-memory database (useful for testing).
    pub fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| Error::DatabaseError(format!("Failed to open database: {}", e)))?,
            None => Connection::open_in_memory().map_err(|e| {
                Error::DatabaseError(format!("Failed to create in-memory database: {}", e))
            })?,
        };

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        let version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .ok();

        match version {
            None => {
                conn.execute_batch(schema::CREATE_TABLES)
                    .map_err(|e| Error::DatabaseError(format!("Failed to create tables: {}", e)))?;

                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?)",
                    params![schema::SCHEMA_VERSION],
                )
                .map_err(|e| Error::DatabaseError(format!("Failed to set schema version: {}", e)))?;

                tracing::info!("Database schema created (version {})", schema::SCHEMA_VERSION);
            }
            Some(v) if v < schema::SCHEMA_VERSION => {
                tracing::info!(
                    "Database schema version {} is older than current {}, running migrations",
                    v,
                    schema::SCHEMA_VERSION
                );

                if v < 2 {
                    tracing::info!("Running migration v1 → v2 (conversation index)");
                    conn.execute_batch(schema::MIGRATE_V1_TO_V2)
                        .map_err(|e| Error::DatabaseError(format!("Migration v1→v2 failed: {}", e)))?;
                }

                tracing::info!("All migrations complete (now at version {})", schema::SCHEMA_VERSION);
            }
            Some(v) => {
                tracing::debug!("Database schema version: {}", v);
            }
        }

        Ok(())
    }

    // ========================================================================
    // USER OPERATIONS
    // ========================================================================

    /// Insert or replace a user
    pub fn upsert_user(&self, user: &UserRecord) -> Result<()> {
        let conn = self.conn.lock();
        insert_user(&conn, user)
    }

    /// Insert or replace many users in one transaction
    pub fn upsert_users(&self, users: &[UserRecord]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        for user in users {
            insert_user(&tx, user)?;
        }

        tx.commit()
            .map_err(|e| Error::DatabaseError(format!("Failed to commit users: {}", e)))?;

        Ok(users.len())
    }

    /// Get a user by ID
    pub fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
            params![id],
            user_from_row,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseError(format!("Failed to get user: {}", e))),
        }
    }

    /// Get every user with the given role, ordered by name
    pub fn get_users_by_role(&self, role: Role) -> Result<Vec<UserRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users WHERE role = ? ORDER BY full_name, id",
                USER_COLUMNS
            ))
            .map_err(|e| Error::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![role.as_str()], user_from_row)
            .map_err(|e| Error::DatabaseError(format!("Failed to query users: {}", e)))?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row.map_err(|e| Error::DatabaseError(format!("Failed to read user: {}", e)))?);
        }

        Ok(users)
    }

    /// Get the users with the given IDs
    ///
    /// Unknown IDs are skipped. Order follows the database, not `ids`.
    pub fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<UserRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users WHERE id IN ({})",
                USER_COLUMNS, placeholders
            ))
            .map_err(|e| Error::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params_from_iter(ids.iter()), user_from_row)
            .map_err(|e| Error::DatabaseError(format!("Failed to query users: {}", e)))?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row.map_err(|e| Error::DatabaseError(format!("Failed to read user: {}", e)))?);
        }

        Ok(users)
    }

    // ========================================================================
    // MESSAGE OPERATIONS
    // ========================================================================

    /// Store a message and touch the pair's conversation row
    ///
    /// Both writes share one transaction.
    pub fn store_message(&self, message: &MessageRecord) -> Result<()> {
        let mut conn = self.conn.lock();
        let created_at = message.created_at.timestamp_millis();
        let (low, high) = ordered_pair(&message.sender, &message.receiver);

        let tx = conn
            .transaction()
            .map_err(|e| Error::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        tx.execute(
            "INSERT INTO messages (id, sender, receiver, text, read, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                message.id,
                message.sender,
                message.receiver,
                message.text,
                message.read,
                created_at,
            ],
        )
        .map_err(|e| Error::DatabaseError(format!("Failed to store message: {}", e)))?;

        tx.execute(
            "INSERT INTO conversations (user_low, user_high, created_at, last_message_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(user_low, user_high)
             DO UPDATE SET last_message_at = MAX(last_message_at, excluded.last_message_at)",
            params![low, high, created_at],
        )
        .map_err(|e| Error::DatabaseError(format!("Failed to update conversation: {}", e)))?;

        tx.commit()
            .map_err(|e| Error::DatabaseError(format!("Failed to commit message: {}", e)))?;

        Ok(())
    }

    /// Get the messages exchanged between two users, oldest first
    ///
    /// With `limit`, only the most recent `limit` messages are returned.
    pub fn get_conversation(
        &self,
        user_a: &str,
        user_b: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MessageRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM messages
                 WHERE (sender = ?1 AND receiver = ?2) OR (sender = ?2 AND receiver = ?1)
                 ORDER BY created_at DESC, seq DESC LIMIT ?3",
                MESSAGE_COLUMNS
            ))
            .map_err(|e| Error::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let rows = stmt
            .query_map(params![user_a, user_b, limit], message_from_row)
            .map_err(|e| Error::DatabaseError(format!("Failed to query messages: {}", e)))?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row.map_err(|e| Error::DatabaseError(format!("Failed to read message: {}", e)))?);
        }

        // Reverse to get chronological order
        messages.reverse();

        Ok(messages)
    }

    /// Get a single message by ID
    pub fn get_message(&self, id: &str) -> Result<Option<MessageRecord>> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            &format!("SELECT {} FROM messages WHERE id = ?", MESSAGE_COLUMNS),
            params![id],
            message_from_row,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseError(format!("Failed to get message: {}", e))),
        }
    }

    /// Mark every unread message from `sender` to `receiver` as read
    ///
    /// Returns the number of messages changed.
    pub fn mark_conversation_read(&self, sender: &str, receiver: &str) -> Result<usize> {
        let conn = self.conn.lock();

        let count = conn
            .execute(
                "UPDATE messages SET read = 1 WHERE sender = ? AND receiver = ? AND read = 0",
                params![sender, receiver],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to mark messages read: {}", e)))?;

        Ok(count)
    }

    /// Get the IDs of everyone `user_id` has exchanged messages with
    ///
    /// Most recent conversation first, ties broken by pair key. Never
    /// includes `user_id` itself.
    pub fn get_counterparties(&self, user_id: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT CASE WHEN user_low = ?1 THEN user_high ELSE user_low END
                 FROM conversations
                 WHERE (user_low = ?1 OR user_high = ?1) AND user_low != user_high
                 ORDER BY last_message_at DESC, user_low, user_high",
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))
            .map_err(|e| Error::DatabaseError(format!("Failed to query conversations: {}", e)))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(|e| Error::DatabaseError(format!("Failed to read conversation: {}", e)))?);
        }

        Ok(ids)
    }

    /// Count unread messages addressed to `receiver`, per sender
    ///
    /// Self-addressed messages are not counted.
    pub fn get_unread_counts(&self, receiver: &str) -> Result<Vec<UnreadCount>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT sender, COUNT(*) FROM messages
                 WHERE receiver = ?1 AND read = 0 AND sender != ?1
                 GROUP BY sender ORDER BY sender",
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![receiver], |row| {
                Ok(UnreadCount {
                    user_id: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })
            .map_err(|e| Error::DatabaseError(format!("Failed to query unread counts: {}", e)))?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row.map_err(|e| Error::DatabaseError(format!("Failed to read unread count: {}", e)))?);
        }

        Ok(counts)
    }

    /// Total number of stored messages
    pub fn count_messages(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .map_err(|e| Error::DatabaseError(format!("Failed to count messages: {}", e)))?;
        Ok(count as u64)
    }
}

// ============================================================================
// ROW HELPERS
// ============================================================================

fn insert_user(conn: &Connection, user: &UserRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, full_name, email, profile_picture, role)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            full_name = excluded.full_name,
            email = excluded.email,
            profile_picture = excluded.profile_picture,
            role = excluded.role",
        params![
            user.id,
            user.full_name,
            user.email,
            user.profile_picture,
            user.role.as_str(),
        ],
    )
    .map_err(|e| Error::DatabaseError(format!("Failed to upsert user: {}", e)))?;

    Ok(())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        profile_picture: row.get(3)?,
        role: Role::from(row.get::<_, String>(4)?),
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRecord> {
    let millis: i64 = row.get(5)?;
    let created_at = time::from_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Integer,
            Box::new(Error::StorageCorrupted(format!("timestamp out of range: {}", millis))),
        )
    })?;

    Ok(MessageRecord {
        id: row.get(0)?,
        sender: row.get(1)?,
        receiver: row.get(2)?,
        text: row.get(3)?,
        read: row.get(4)?,
        created_at,
    })
}

/// Order a pair so each unordered pair has one conversation key.
fn ordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
