//! # Chat
//!
//! The access layer behind the `/api/chats` endpoints.
//!
//! Every operation receives the caller's user ID from the authentication
//! collaborator and runs one short storage call.
//!
//! ## Read State
//!
//! ```text
//!   send_message ──► ┌──────────┐   mark_as_read    ┌──────────┐
//!                    │  unread  │ ────────────────► │   read   │
//!                    └──────────┘  (receiver only)  └──────────┘
//! ```
//!
//! A message never returns to unread.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::storage::{Database, MessageRecord, UnreadCount};
use crate::time;
use crate::users::{Role, UserRecord, UserSummary};

/// Default cap on message text, in characters.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 5000;

/// Chat access layer configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Maximum message length in characters
    pub max_message_len: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

/// Chat operations over a [`Database`].
#[derive(Clone)]
pub struct ChatService {
    db: Database,
    config: ChatConfig,
}

impl ChatService {
    /// Create a chat service backed by `db`.
    pub fn new(db: Database, config: ChatConfig) -> Self {
        Self { db, config }
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Resolve a caller identity to a known user.
    pub fn authenticate(&self, user_id: &str) -> Result<UserRecord> {
        if user_id.trim().is_empty() {
            return Err(Error::Unauthorized);
        }

        self.db.get_user(user_id)?.ok_or_else(|| {
            tracing::debug!(user_id = user_id, "Rejected unknown caller identity");
            Error::Unauthorized
        })
    }

    /// All messages between `current_user` and `other_user`, oldest first.
    ///
    /// `limit` keeps only the most recent messages; `None` returns the whole
    /// history.
    pub fn chat_history(
        &self,
        current_user: &str,
        other_user: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MessageRecord>> {
        if other_user.trim().is_empty() {
            return Err(Error::MissingField("userId"));
        }
        if limit == Some(0) {
            return Err(Error::InvalidLimit);
        }

        let messages = self.db.get_conversation(current_user, other_user, limit)?;
        tracing::debug!(
            user = current_user,
            other = other_user,
            count = messages.len(),
            "Loaded chat history"
        );
        Ok(messages)
    }

    /// Send `text` from `current_user` to `receiver_id`.
    ///
    /// The text is stored as given; trimming is only used to reject blank
    /// messages.
    pub fn send_message(
        &self,
        current_user: &str,
        receiver_id: &str,
        text: &str,
    ) -> Result<MessageRecord> {
        if receiver_id.trim().is_empty() {
            return Err(Error::MissingField("receiverId"));
        }
        if text.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }
        if text.chars().count() > self.config.max_message_len {
            return Err(Error::MessageTooLong {
                max: self.config.max_message_len,
            });
        }

        if self.db.get_user(receiver_id)?.is_none() {
            return Err(Error::UserNotFound(receiver_id.to_string()));
        }

        // Truncate to storage precision so the returned record matches a re-read
        let created_at = time::from_millis(time::now_timestamp_millis())
            .ok_or_else(|| Error::Internal("clock out of range".to_string()))?;

        let message = MessageRecord {
            id: uuid::Uuid::new_v4().to_string(),
            sender: current_user.to_string(),
            receiver: receiver_id.to_string(),
            text: text.to_string(),
            read: false,
            created_at,
        };

        self.db.store_message(&message)?;

        tracing::info!(
            message_id = message.id.as_str(),
            sender = current_user,
            receiver = receiver_id,
            "Message stored"
        );

        Ok(message)
    }

    /// Every midwife, as summaries ordered by name.
    pub fn midwives(&self) -> Result<Vec<UserSummary>> {
        let midwives = self.db.get_users_by_role(Role::Midwife)?;
        Ok(midwives.into_iter().map(UserSummary::from).collect())
    }

    /// Mark everything `other_user` sent to `current_user` as read.
    ///
    /// Returns how many messages changed; zero on a repeat call.
    pub fn mark_as_read(&self, current_user: &str, other_user: &str) -> Result<usize> {
        if other_user.trim().is_empty() {
            return Err(Error::MissingField("userId"));
        }

        let count = self.db.mark_conversation_read(other_user, current_user)?;
        tracing::debug!(
            user = current_user,
            other = other_user,
            count = count,
            "Marked messages as read"
        );
        Ok(count)
    }

    /// Users `current_user` has exchanged messages with.
    ///
    /// Most recent conversation first; never includes `current_user`.
    /// Counterparties missing from the directory are skipped.
    pub fn contacts(&self, current_user: &str) -> Result<Vec<UserSummary>> {
        let ids = self.db.get_counterparties(current_user)?;
        let mut by_id: HashMap<String, UserRecord> = self
            .db
            .get_users_by_ids(&ids)?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let contacts: Vec<UserSummary> = ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(UserSummary::from)
            .collect();

        if contacts.len() < ids.len() {
            tracing::warn!(
                user = current_user,
                missing = ids.len() - contacts.len(),
                "Contact list references users missing from the directory"
            );
        }

        Ok(contacts)
    }

    /// Unread message counts addressed to `current_user`, per sender.
    pub fn unread_counts(&self, current_user: &str) -> Result<Vec<UnreadCount>> {
        self.db.get_unread_counts(current_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str, role: Role) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            full_name: name.to_string(),
            email: format!("{}@example.com", id),
            profile_picture: None,
            role,
        }
    }

    fn service() -> ChatService {
        let db = Database::open(None).unwrap();
        db.upsert_users(&[
            user("alice", "Alice", Role::Parent),
            user("bob", "Bob", Role::Parent),
            user("maja", "Maja", Role::Midwife),
            user("sara", "Sara", Role::Midwife),
            user("root", "Root", Role::Admin),
            user("holm", "Holm", Role::Other("doctor".to_string())),
        ])
        .unwrap();
        ChatService::new(db, ChatConfig::default())
    }

    #[test]
    fn test_send_then_history() {
        let chat = service();
        let sent = chat.send_message("alice", "maja", "hi").unwrap();
        assert_eq!(sent.sender, "alice");
        assert_eq!(sent.receiver, "maja");
        assert!(!sent.read);

        let history = chat.chat_history("alice", "maja", None).unwrap();
        assert_eq!(history, vec![sent.clone()]);
        assert_eq!(chat.chat_history("maja", "alice", None).unwrap(), vec![sent]);
    }

    #[test]
    fn test_history_only_contains_the_pair() {
        let chat = service();
        chat.send_message("alice", "maja", "1").unwrap();
        chat.send_message("maja", "alice", "2").unwrap();
        chat.send_message("bob", "maja", "other parent").unwrap();
        chat.send_message("alice", "sara", "other midwife").unwrap();

        let history = chat.chat_history("alice", "maja", None).unwrap();
        let texts: Vec<_> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2"]);
        assert!(history
            .windows(2)
            .all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn test_history_limit() {
        let chat = service();
        for i in 0..5 {
            chat.send_message("alice", "maja", &format!("m{}", i)).unwrap();
        }

        let recent = chat.chat_history("alice", "maja", Some(2)).unwrap();
        let texts: Vec<_> = recent.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m3", "m4"]);

        assert!(matches!(
            chat.chat_history("alice", "maja", Some(0)),
            Err(Error::InvalidLimit)
        ));
    }

    #[test]
    fn test_send_rejects_blank_text() {
        let chat = service();
        for text in ["", "   ", "\n\t "] {
            let err = chat.send_message("alice", "maja", text).unwrap_err();
            assert!(matches!(err, Error::EmptyMessage));
        }
        assert_eq!(chat.database().count_messages().unwrap(), 0);
    }

    #[test]
    fn test_send_keeps_untrimmed_text() {
        let chat = service();
        let sent = chat.send_message("alice", "maja", "  hello  ").unwrap();
        assert_eq!(sent.text, "  hello  ");
    }

    #[test]
    fn test_send_rejects_missing_receiver() {
        let chat = service();
        assert!(matches!(
            chat.send_message("alice", " ", "hi"),
            Err(Error::MissingField("receiverId"))
        ));

        let err = chat.send_message("alice", "ghost", "hi").unwrap_err();
        assert!(matches!(err, Error::UserNotFound(ref id) if id == "ghost"));
        assert_eq!(chat.database().count_messages().unwrap(), 0);
    }

    #[test]
    fn test_send_rejects_oversized_text() {
        let db = Database::open(None).unwrap();
        db.upsert_user(&user("maja", "Maja", Role::Midwife)).unwrap();
        let chat = ChatService::new(db, ChatConfig { max_message_len: 4 });

        assert!(chat.send_message("alice", "maja", "four").is_ok());
        assert!(matches!(
            chat.send_message("alice", "maja", "five!"),
            Err(Error::MessageTooLong { max: 4 })
        ));
    }

    #[test]
    fn test_mark_as_read_only_touches_incoming() {
        let chat = service();
        let incoming = chat.send_message("maja", "alice", "how is the baby?").unwrap();
        let outgoing = chat.send_message("alice", "maja", "sleeping well").unwrap();

        assert_eq!(chat.mark_as_read("alice", "maja").unwrap(), 1);
        assert_eq!(chat.mark_as_read("alice", "maja").unwrap(), 0);

        let db = chat.database();
        assert!(db.get_message(&incoming.id).unwrap().unwrap().read);
        assert!(!db.get_message(&outgoing.id).unwrap().unwrap().read);
    }

    #[test]
    fn test_contacts_exclude_self() {
        let chat = service();
        chat.send_message("alice", "maja", "hi").unwrap();
        chat.send_message("bob", "alice", "hey").unwrap();
        chat.send_message("alice", "alice", "reminder").unwrap();

        let contacts = chat.contacts("alice").unwrap();
        let ids: Vec<_> = contacts.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"maja"));
        assert!(ids.contains(&"bob"));
        assert!(!ids.contains(&"alice"));

        assert!(chat.contacts("sara").unwrap().is_empty());
    }

    #[test]
    fn test_contacts_skip_unknown_users() {
        let chat = service();
        chat.send_message("alice", "maja", "hi").unwrap();
        // A message from an account that was later removed upstream
        chat.database()
            .store_message(&MessageRecord {
                id: "legacy".to_string(),
                sender: "deleted-user".to_string(),
                receiver: "alice".to_string(),
                text: "old".to_string(),
                read: false,
                created_at: time::from_millis(1_000).unwrap(),
            })
            .unwrap();

        let contacts = chat.contacts("alice").unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, "maja");
    }

    #[test]
    fn test_midwives_only() {
        let chat = service();
        let midwives = chat.midwives().unwrap();
        let ids: Vec<_> = midwives.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["maja", "sara"]);

        // Repeated calls give the same answer
        assert_eq!(chat.midwives().unwrap(), midwives);
    }

    #[test]
    fn test_unread_counts_follow_read_state() {
        let chat = service();
        chat.send_message("maja", "alice", "1").unwrap();
        chat.send_message("maja", "alice", "2").unwrap();
        chat.send_message("bob", "alice", "3").unwrap();

        let counts = chat.unread_counts("alice").unwrap();
        assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), 3);

        chat.mark_as_read("alice", "maja").unwrap();
        let counts = chat.unread_counts("alice").unwrap();
        assert_eq!(counts, vec![UnreadCount { user_id: "bob".into(), count: 1 }]);
    }

    #[test]
    fn test_authenticate() {
        let chat = service();
        assert_eq!(chat.authenticate("alice").unwrap().full_name, "Alice");
        assert!(matches!(chat.authenticate("ghost"), Err(Error::Unauthorized)));
        assert!(matches!(chat.authenticate(""), Err(Error::Unauthorized)));
    }
}
