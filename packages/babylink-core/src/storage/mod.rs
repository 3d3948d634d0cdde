//! # Storage Module
//!
//! Persistent storage for Babylink chat data.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE SYSTEM                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite Database                                                │   │
//! │  │  ───────────────                                                 │   │
//! │  │                                                                 │   │
//! │  │  Tables:                                                       │   │
//! │  │  • users - Mirror of the account directory                     │   │
//! │  │  • messages - Direct messages with read flag                   │   │
//! │  │  • conversations - Distinct user pairs, for contact lists      │   │
//! │  │                                                                 │   │
//! │  │  File-backed in production, in-memory for tests                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod database;
mod schema;

pub use database::{Database, MessageRecord, UnreadCount};

use std::path::Path;

use crate::error::Result;
use crate::users::UserRecord;

/// Storage configuration
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Path to the database file (None for in-memory)
    pub database_path: Option<String>,
}

/// Open the database described by `config`
pub fn init(config: &StorageConfig) -> Result<Database> {
    Database::open(config.database_path.as_deref())
}

/// Load a JSON array of users from `path` and upsert them into `db`.
///
/// Returns the number of users written.
pub fn seed_users(db: &Database, path: &Path) -> Result<usize> {
    let contents = std::fs::read_to_string(path)?;
    let users: Vec<UserRecord> = serde_json::from_str(&contents)?;
    let count = db.upsert_users(&users)?;

    tracing::info!(count = count, path = %path.display(), "Seeded user directory");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::users::Role;
    use std::io::Write;

    #[test]
    fn test_seed_users_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id":"m1","fullName":"Maja","email":"maja@example.com","role":"midwife"}},
                {{"id":"p1","fullName":"Pia","email":"pia@example.com","role":"parent",
                  "profilePicture":"https://img.example.com/p1.png"}}
            ]"#
        )
        .unwrap();

        let db = init(&StorageConfig::default()).unwrap();
        assert_eq!(seed_users(&db, file.path()).unwrap(), 2);

        let pia = db.get_user("p1").unwrap().unwrap();
        assert_eq!(pia.role, Role::Parent);
        assert_eq!(pia.profile_picture.as_deref(), Some("https://img.example.com/p1.png"));
    }

    #[test]
    fn test_seed_users_keeps_unknown_roles() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id":"m1","fullName":"Maja","email":"maja@example.com","role":"midwife"}},
                {{"id":"d1","fullName":"Holm","email":"holm@example.com","role":"doctor"}}
            ]"#
        )
        .unwrap();

        let db = init(&StorageConfig::default()).unwrap();
        assert_eq!(seed_users(&db, file.path()).unwrap(), 2);

        assert!(db.get_user("m1").unwrap().is_some());
        let doctor = db.get_user("d1").unwrap().unwrap();
        assert_eq!(doctor.role, Role::Other("doctor".to_string()));

        let midwives = db.get_users_by_role(Role::Midwife).unwrap();
        let ids: Vec<_> = midwives.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["m1"]);
    }

    #[test]
    fn test_seed_users_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id":"x","role":"midwife"}}]"#).unwrap();

        let db = init(&StorageConfig::default()).unwrap();
        let err = seed_users(&db, file.path()).unwrap_err();
        assert!(matches!(err, Error::SerializationError(_)));
    }
}
