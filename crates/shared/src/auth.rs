//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Role a user holds in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Account holder.
    Normal,
    /// Operator allowed to block and unlock users.
    Admin,
}

impl Role {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: UserId,
    /// User's role.
    pub role: Role,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: UserId, role: Role, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.sub
    }
}

/// Signed access token returned after successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Encoded JWT.
    pub token: String,
    /// Seconds until expiry.
    pub expires_in: i64,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_fields() {
        let now = Utc::now();
        let claims = Claims::new(UserId::new(3), Role::Admin, now, now + Duration::hours(2));

        assert_eq!(claims.user_id(), UserId::new(3));
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 7200);
    }

    #[test]
    fn test_claims_serialize_numeric_subject() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::new(UserId::new(8), Role::Normal, now, now);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["sub"], 8);
        assert_eq!(json["role"], "normal");
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Normal, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }
}
