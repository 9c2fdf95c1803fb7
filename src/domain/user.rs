use crate::domain::raw::{coerce_id, coerce_number, RawUser};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Access level of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Admin,
    BoardAdmin,
    User,
}

impl SecurityLevel {
    /// Maps the numeric level used by the data source (1 = admin, 2 = board admin).
    /// Anything else is a regular user.
    pub fn from_level(level: i64) -> Self {
        match level {
            1 => Self::Admin,
            2 => Self::BoardAdmin,
            _ => Self::User,
        }
    }

    pub fn as_level(&self) -> i64 {
        match self {
            Self::Admin => 1,
            Self::BoardAdmin => 2,
            Self::User => 3,
        }
    }
}

/// A user account, as assignee, board member or the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub default_board_id: Option<u64>,
    pub security_level: SecurityLevel,
    pub user_option_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub board_access: Vec<u64>,
}

impl User {
    pub fn new(id: u64, username: String) -> Self {
        Self {
            id,
            username,
            email: String::new(),
            default_board_id: None,
            security_level: SecurityLevel::User,
            user_option_id: None,
            last_login: None,
            board_access: Vec::new(),
        }
    }

    /// Builds a user from a raw record. Returns `None` when the id is not a number.
    pub fn from_raw(raw: &RawUser) -> Option<Self> {
        let Some(id) = coerce_id(&raw.id) else {
            warn!(id = %raw.id, "Skipping user record with non-numeric id");
            return None;
        };

        Some(Self {
            id,
            username: raw.username.clone(),
            email: raw.email.clone(),
            default_board_id: coerce_id(&raw.default_board_id).filter(|id| *id != 0),
            security_level: SecurityLevel::from_level(
                coerce_number(&raw.security_level).unwrap_or_default(),
            ),
            user_option_id: coerce_id(&raw.user_option_id),
            last_login: parse_last_login(&raw.last_login),
            board_access: raw.board_access.iter().filter_map(coerce_id).collect(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.security_level == SecurityLevel::Admin
    }
}

impl From<&User> for RawUser {
    fn from(user: &User) -> Self {
        Self {
            id: Value::from(user.id),
            username: user.username.clone(),
            email: user.email.clone(),
            default_board_id: Value::from(user.default_board_id.unwrap_or(0)),
            security_level: Value::from(user.security_level.as_level()),
            user_option_id: user.user_option_id.map(Value::from).unwrap_or(Value::Null),
            last_login: user
                .last_login
                .map(|at| Value::from(at.timestamp()))
                .unwrap_or(Value::Null),
            board_access: user.board_access.iter().copied().map(Value::from).collect(),
            extra: Default::default(),
        }
    }
}

/// Last login is stored as unix seconds, either as a number or a string, or as RFC 3339 text.
fn parse_last_login(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(secs) = coerce_number(value).filter(|secs| *secs > 0) {
        return DateTime::from_timestamp(secs, 0);
    }

    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_from_raw_coerces_fields() {
        let raw: RawUser = serde_json::from_value(json!({
            "id": "2",
            "username": "jdoe",
            "email": "jdoe@example.com",
            "default_board_id": "4",
            "security_level": "1",
            "user_option_id": "2",
            "last_login": "1500000000",
            "board_access": ["1", 4]
        }))
        .unwrap();

        let user = User::from_raw(&raw).unwrap();
        assert_eq!(user.id, 2);
        assert_eq!(user.default_board_id, Some(4));
        assert!(user.is_admin());
        assert_eq!(user.user_option_id, Some(2));
        assert_eq!(user.last_login.map(|at| at.timestamp()), Some(1_500_000_000));
        assert_eq!(user.board_access, vec![1, 4]);
    }

    #[test]
    fn test_zero_default_board_is_none() {
        let raw: RawUser = serde_json::from_value(json!({ "id": 1, "default_board_id": "0" })).unwrap();
        let user = User::from_raw(&raw).unwrap();
        assert_eq!(user.default_board_id, None);
        assert_eq!(user.security_level, SecurityLevel::User);
    }

    #[test]
    fn test_last_login_rfc3339() {
        let raw: RawUser =
            serde_json::from_value(json!({ "id": 1, "last_login": "2024-01-01T00:00:00Z" })).unwrap();
        let user = User::from_raw(&raw).unwrap();
        assert!(user.last_login.is_some());
    }

    #[test]
    fn test_user_with_invalid_id_is_skipped() {
        let raw: RawUser = serde_json::from_value(json!({ "id": "nobody" })).unwrap();
        assert!(User::from_raw(&raw).is_none());
    }

    #[test]
    fn test_security_level_mapping() {
        assert_eq!(SecurityLevel::from_level(1), SecurityLevel::Admin);
        assert_eq!(SecurityLevel::from_level(2), SecurityLevel::BoardAdmin);
        assert_eq!(SecurityLevel::from_level(3), SecurityLevel::User);
        assert_eq!(SecurityLevel::from_level(0), SecurityLevel::User);
    }
}
