//! # Database Schema
//!
//! SQL schema definitions for the Babylink message store.
//!
//! ## Schema Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DATABASE SCHEMA                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐    ┌─────────────────┐      ┌─────────────────┐    │
//! │  │     users       │    │    messages     │      │  conversations  │    │
//! │  ├─────────────────┤    ├─────────────────┤      ├─────────────────┤    │
//! │  │ id              │◄───│ sender          │      │ user_low        │    │
//! │  │ full_name       │◄───│ receiver        │      │ user_high       │    │
//! │  │ email           │    │ seq             │      │ created_at      │    │
//! │  │ profile_picture │    │ id              │      │ last_message_at │    │
//! │  │ role            │    │ text            │      └─────────────────┘    │
//! │  └─────────────────┘    │ read            │                             │
//! │                         │ created_at      │                             │
//! │                         └─────────────────┘                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `conversations` holds one row per unordered pair with `user_low <=
//! user_high`, so a contact list is an index lookup instead of a scan over
//! every message the user touched.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL to create all tables
pub const CREATE_TABLES: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Users table
-- Mirror of the account system; written only by seeding
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL,
    profile_picture TEXT,
    -- 'parent', 'midwife' or 'admin'
    role TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

-- Messages table
-- Direct messages; only `read` changes after insert
CREATE TABLE IF NOT EXISTS messages (
    -- Insertion order, breaks created_at ties
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    sender TEXT NOT NULL,
    receiver TEXT NOT NULL,
    text TEXT NOT NULL,
    read INTEGER NOT NULL DEFAULT 0,
    -- Unix timestamp ms
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_pair ON messages(sender, receiver, created_at);
CREATE INDEX IF NOT EXISTS idx_messages_unread ON messages(receiver, read);

-- Conversations table
-- One row per unordered pair that has exchanged a message
CREATE TABLE IF NOT EXISTS conversations (
    user_low TEXT NOT NULL,
    user_high TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    last_message_at INTEGER NOT NULL,
    PRIMARY KEY (user_low, user_high),
    CONSTRAINT pair_order CHECK (user_low <= user_high)
);
CREATE INDEX IF NOT EXISTS idx_conversations_high ON conversations(user_high);
"#;

/// Migration from schema v1 to v2:
/// - Add the conversations pair index
/// - Backfill it from existing messages
pub const MIGRATE_V1_TO_V2: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    user_low TEXT NOT NULL,
    user_high TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    last_message_at INTEGER NOT NULL,
    PRIMARY KEY (user_low, user_high),
    CONSTRAINT pair_order CHECK (user_low <= user_high)
);
CREATE INDEX IF NOT EXISTS idx_conversations_high ON conversations(user_high);

INSERT OR IGNORE INTO conversations (user_low, user_high, created_at, last_message_at)
SELECT
    MIN(sender, receiver),
    MAX(sender, receiver),
    MIN(created_at),
    MAX(created_at)
FROM messages
GROUP BY MIN(sender, receiver), MAX(sender, receiver);

CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);
CREATE INDEX IF NOT EXISTS idx_messages_pair ON messages(sender, receiver, created_at);
CREATE INDEX IF NOT EXISTS idx_messages_unread ON messages(receiver, read);

UPDATE schema_version SET version = 2;
"#;

/// Schema v1, kept so migration tests can build an old database.
#[cfg(test)]
pub const CREATE_TABLES_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL,
    profile_picture TEXT,
    role TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS messages (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    sender TEXT NOT NULL,
    receiver TEXT NOT NULL,
    text TEXT NOT NULL,
    read INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);
INSERT INTO schema_version (version) VALUES (1);
"#;
