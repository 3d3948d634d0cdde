//! Server configuration.
//!
//! Every setting comes from a CLI flag with an environment variable
//! fallback. Nothing external is hardcoded.

use std::path::PathBuf;

use axum::http::{HeaderName, HeaderValue};
use babylink_core::chat::DEFAULT_MAX_MESSAGE_LEN;
use clap::Parser;

/// Header the upstream auth proxy sets to the verified user ID.
pub const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "babylink-server", version, about = "Babylink parent/midwife chat server")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "BABYLINK_PORT")]
    pub port: u16,

    /// SQLite database file. Runs in-memory when omitted.
    #[arg(long, env = "BABYLINK_DATABASE")]
    pub database: Option<String>,

    /// JSON array of users to load into the directory at startup
    #[arg(long, env = "BABYLINK_USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// Request header carrying the authenticated user ID
    #[arg(
        long,
        default_value = DEFAULT_IDENTITY_HEADER,
        env = "BABYLINK_IDENTITY_HEADER",
        value_parser = parse_header_name
    )]
    pub identity_header: HeaderName,

    /// Maximum message length in characters
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_LEN, env = "BABYLINK_MAX_MESSAGE_LEN")]
    pub max_message_len: usize,

    /// Allowed CORS origin (e.g. https://app.babylink.example). Any origin
    /// when omitted.
    #[arg(long, env = "BABYLINK_CORS_ORIGIN", value_parser = parse_origin)]
    pub cors_origin: Option<HeaderValue>,

    /// Emit logs as JSON lines
    #[arg(long, env = "BABYLINK_LOG_JSON")]
    pub log_json: bool,
}

fn parse_header_name(s: &str) -> Result<HeaderName, String> {
    HeaderName::from_bytes(s.trim().to_ascii_lowercase().as_bytes())
        .map_err(|e| format!("invalid header name '{}': {}", s, e))
}

fn parse_origin(s: &str) -> Result<HeaderValue, String> {
    HeaderValue::from_str(s.trim()).map_err(|e| format!("invalid origin '{}': {}", s, e))
}

// ── Server Config ─────────────────────────────────────────────────────────────

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: Option<String>,
    pub users_file: Option<PathBuf>,
    pub identity_header: HeaderName,
    pub max_message_len: usize,
    /// None allows any origin
    pub cors_origin: Option<HeaderValue>,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_path: None,
            users_file: None,
            identity_header: HeaderName::from_static(DEFAULT_IDENTITY_HEADER),
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            cors_origin: None,
            log_json: false,
        }
    }
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            port: args.port,
            database_path: args.database,
            users_file: args.users_file,
            identity_header: args.identity_header,
            max_message_len: args.max_message_len,
            cors_origin: args.cors_origin,
            log_json: args.log_json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.identity_header, "x-user-id");
        assert_eq!(config.max_message_len, 5000);
        assert!(config.database_path.is_none());
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_args_into_config() {
        let args = Args::try_parse_from([
            "babylink-server",
            "--port",
            "9000",
            "--database",
            "/tmp/chat.db",
            "--identity-header",
            "X-Auth-User",
            "--cors-origin",
            "https://app.example.com",
            "--log-json",
        ])
        .unwrap();

        let config = ServerConfig::from(args);
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_path.as_deref(), Some("/tmp/chat.db"));
        assert_eq!(config.identity_header, "x-auth-user");
        assert_eq!(config.cors_origin.unwrap(), "https://app.example.com");
        assert!(config.log_json);
    }

    #[test]
    fn test_rejects_bad_header_name() {
        let result = Args::try_parse_from(["babylink-server", "--identity-header", "bad header"]);
        assert!(result.is_err());
    }
}
