use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Absolute expiry, computed from `expires_in` when the session is issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Tokens are treated as expired 30 seconds early.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= Utc::now() + chrono::Duration::seconds(30),
            None => false,
        }
    }
}

/// Outcome of a sign-up: projects with email confirmation enabled return
/// no session until the address is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired(AuthUser),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<DateTime<Utc>>) -> AuthSession {
        AuthSession {
            access_token: "token".into(),
            refresh_token: None,
            expires_at,
            user: AuthUser {
                id: "u".into(),
                email: None,
            },
        }
    }

    #[test]
    fn test_session_expiry() {
        assert!(!session(None).is_expired());
        assert!(session(Some(Utc::now() - chrono::Duration::minutes(1))).is_expired());
        assert!(session(Some(Utc::now() + chrono::Duration::seconds(10))).is_expired());
        assert!(!session(Some(Utc::now() + chrono::Duration::hours(1))).is_expired());
    }
}
