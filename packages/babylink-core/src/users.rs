//! # Users
//!
//! Read-side view of the user directory. Accounts are owned by the external
//! account system; the chat core only resolves display metadata and filters
//! by role.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role.
///
/// The account system may issue roles this crate does not know about; they
/// are kept verbatim in [`Role::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// A parent tracking their baby
    Parent,
    /// A midwife parents can chat with
    Midwife,
    /// Back-office account
    Admin,
    /// Any other role string
    Other(String),
}

impl Role {
    /// Storage / wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Role::Parent => "parent",
            Role::Midwife => "midwife",
            Role::Admin => "admin",
            Role::Other(role) => role,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "parent" => Role::Parent,
            "midwife" => Role::Midwife,
            "admin" => Role::Admin,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s.to_string()))
    }
}

/// A user as stored in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Identifier issued by the account system
    pub id: String,
    /// Display name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Avatar URL, if the user uploaded one
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Account role
    pub role: Role,
}

/// Public projection of a user returned by the chat endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
    pub profile_picture: Option<String>,
    pub email: String,
}

impl From<UserRecord> for UserSummary {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            profile_picture: user.profile_picture,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("midwife".parse::<Role>().unwrap(), Role::Midwife);
        assert_eq!(Role::Parent.to_string(), "parent");
        assert_eq!("doula".parse::<Role>().unwrap(), Role::Other("doula".into()));
        assert_eq!(Role::Other("doula".into()).to_string(), "doula");
    }

    #[test]
    fn test_user_record_json() {
        let user: UserRecord = serde_json::from_str(
            r#"{"id":"u1","fullName":"Anna Berg","email":"anna@example.com","role":"midwife"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Midwife);
        assert!(user.profile_picture.is_none());

        let summary = serde_json::to_value(UserSummary::from(user)).unwrap();
        assert_eq!(summary["fullName"], "Anna Berg");
        assert!(summary.get("role").is_none());
    }

    #[test]
    fn test_unknown_role_round_trips() {
        let user: UserRecord = serde_json::from_str(
            r#"{"id":"d1","fullName":"Dr. Holm","email":"holm@example.com","role":"doctor"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Other("doctor".into()));

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "doctor");

        let midwife: Role = serde_json::from_str(r#""midwife""#).unwrap();
        assert_eq!(midwife, Role::Midwife);
    }
}
