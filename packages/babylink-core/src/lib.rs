//! # Babylink Core
//!
//! Direct messaging between parents and midwives for the Babylink
//! baby-health tracker.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       BABYLINK CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │  Chat (ChatService)                                               │ │
//! │  │  - history        - send         - mark read                      │ │
//! │  │  - contacts       - midwives     - unread counts                  │ │
//! │  └───────────────────────────────┬───────────────────────────────────┘ │
//! │                                  │                                      │
//! │  ┌─────────────┐  ┌──────────────▼──────────────┐  ┌────────────────┐  │
//! │  │   Users     │  │          Storage            │  │     Error      │  │
//! │  │             │  │                             │  │                │  │
//! │  │ - Role      │  │ - SQLite (users, messages)  │  │ - Taxonomy     │  │
//! │  │ - Summary   │  │ - Conversation pair index   │  │ - Public text  │  │
//! │  └─────────────┘  └─────────────────────────────┘  └────────────────┘  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`users`] - Read-side user directory types
//! - [`storage`] - SQLite message store
//! - [`chat`] - The chat access layer
//! - [`time`] - Millisecond timestamps
//!
//! Authentication is not handled here: callers pass an already verified
//! user ID, and [`ChatService::authenticate`] only checks that it names a
//! known user.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod chat;
pub mod error;
pub mod storage;
pub mod time;
pub mod users;

pub use chat::{ChatConfig, ChatService};
pub use error::{Error, ErrorKind, Result};
pub use storage::{Database, MessageRecord, StorageConfig, UnreadCount};
pub use users::{Role, UserRecord, UserSummary};
