//! # Error Handling
//!
//! Error types for Babylink Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Client Input Errors (HTTP 400)                                    │
//! │  │   ├── MissingField          - Required field absent or blank        │
//! │  │   ├── EmptyMessage          - Text empty after trimming             │
//! │  │   ├── MessageTooLong        - Text exceeds configured maximum       │
//! │  │   ├── InvalidLimit          - History limit of zero                 │
//! │  │   ├── NotAString            - Field has the wrong JSON type         │
//! │  │   └── InvalidRequest        - Malformed body or query               │
//! │  │                                                                      │
//! │  ├── Lookup Errors (HTTP 404)                                          │
//! │  │   └── UserNotFound          - Referenced user does not exist        │
//! │  │                                                                      │
//! │  ├── Auth Errors (HTTP 401)                                            │
//! │  │   └── Unauthorized          - Caller identity missing or unknown    │
//! │  │                                                                      │
//! │  ├── Storage Errors (HTTP 500)                                         │
//! │  │   ├── DatabaseError         - SQLite failure                        │
//! │  │   └── StorageCorrupted      - Row failed to decode                  │
//! │  │                                                                      │
//! │  └── Internal Errors (HTTP 500)                                        │
//! │      ├── Internal              - Should not happen                     │
//! │      └── SerializationError    - JSON encode/decode failure            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage and internal errors carry diagnostic detail that must stay in
//! the logs. [`Error::public_message`] gives the text safe to hand to a
//! client.

use thiserror::Error;

/// Result type alias for Babylink Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Text returned to clients in place of storage and internal failures.
pub const OPAQUE_INTERNAL_MESSAGE: &str = "Internal server error";

/// Main error type for Babylink Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Client Input Errors (100-199)
    // ========================================================================

    /// A required field is missing or blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Message text is empty after trimming whitespace
    #[error("Message text cannot be empty")]
    EmptyMessage,

    /// Message text exceeds the configured maximum length
    #[error("Message text exceeds {max} characters")]
    MessageTooLong {
        /// Configured limit in characters
        max: usize,
    },

    /// History limit must be positive
    #[error("limit must be greater than zero")]
    InvalidLimit,

    /// A field had the wrong JSON type
    #[error("{0} must be a string")]
    NotAString(&'static str),

    /// Request body or query string could not be parsed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ========================================================================
    // Lookup Errors (200-299)
    // ========================================================================

    /// Referenced user does not exist
    #[error("User not found")]
    UserNotFound(String),

    // ========================================================================
    // Auth Errors (300-399)
    // ========================================================================

    /// Caller identity is missing or does not resolve to a user
    #[error("Not authorized")]
    Unauthorized,

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be decoded
    #[error("Data corruption detected: {0}")]
    StorageCorrupted(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Coarse error category, used by transports to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller sent bad input
    InvalidInput,
    /// A referenced entity does not exist
    NotFound,
    /// Caller identity was rejected
    Unauthorized,
    /// Anything the caller cannot fix
    Internal,
}

impl Error {
    /// Numeric error code
    ///
    /// - 100-199: Client input
    /// - 200-299: Lookup
    /// - 300-399: Auth
    /// - 400-499: Storage
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            Error::MissingField(_) => 100,
            Error::EmptyMessage => 101,
            Error::MessageTooLong { .. } => 102,
            Error::InvalidLimit => 103,
            Error::NotAString(_) => 105,
            Error::InvalidRequest(_) => 106,

            Error::UserNotFound(_) => 200,

            Error::Unauthorized => 300,

            Error::DatabaseError(_) => 400,
            Error::StorageCorrupted(_) => 401,

            Error::Internal(_) => 900,
            Error::SerializationError(_) => 901,
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self.code() {
            100..=199 => ErrorKind::InvalidInput,
            200..=299 => ErrorKind::NotFound,
            300..=399 => ErrorKind::Unauthorized,
            _ => ErrorKind::Internal,
        }
    }

    /// Message safe to return to a client.
    ///
    /// Storage and internal failures collapse to [`OPAQUE_INTERNAL_MESSAGE`].
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => OPAQUE_INTERNAL_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::MissingField("receiverId").code(), 100);
        assert_eq!(Error::EmptyMessage.code(), 101);
        assert_eq!(Error::UserNotFound("u1".into()).code(), 200);
        assert_eq!(Error::Unauthorized.code(), 300);
        assert_eq!(Error::DatabaseError("boom".into()).code(), 400);
        assert_eq!(Error::Internal("test".into()).code(), 900);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::EmptyMessage.kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::MessageTooLong { max: 10 }.kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::UserNotFound("u1".into()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(Error::StorageCorrupted("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(Error::SerializationError("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_public_message_hides_storage_detail() {
        let err = Error::DatabaseError("no such table: messages".into());
        assert_eq!(err.public_message(), OPAQUE_INTERNAL_MESSAGE);
        assert!(err.to_string().contains("no such table"));

        let err = Error::MissingField("receiverId");
        assert_eq!(err.public_message(), "receiverId is required");
    }

    #[test]
    fn test_rusqlite_conversion() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.code(), 400);
    }
}
