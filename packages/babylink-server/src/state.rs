//! Server state management.
//!
//! Holds the chat service and the resolved configuration. Cloned into every
//! handler; the database connection is shared behind an `Arc`.

use std::sync::Arc;

use babylink_core::{storage, ChatConfig, ChatService, StorageConfig};

use crate::config::ServerConfig;

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// Chat access layer
    pub chat: ChatService,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Open storage, seed the user directory if configured, and build the
    /// chat service.
    pub fn new(config: ServerConfig) -> babylink_core::Result<Self> {
        let db = storage::init(&StorageConfig {
            database_path: config.database_path.clone(),
        })?;

        match &config.users_file {
            Some(path) => {
                storage::seed_users(&db, path)?;
            }
            None => tracing::info!("No users file configured, using existing directory"),
        }

        let chat = ChatService::new(
            db,
            ChatConfig {
                max_message_len: config.max_message_len,
            },
        );

        Ok(Self {
            chat,
            config: Arc::new(config),
        })
    }
}
