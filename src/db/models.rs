use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A Moviebase account. Created either with a password (signup) or through
/// Google sign-in (`password_hash` null). A password account that later signs
/// in with Google gains a `google_id` and becomes dual-mode.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub organization: Option<String>,
    pub role: String,
    pub google_id: Option<String>,
    pub avatar: Option<String>,
    pub refresh_token: Option<String>,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new_local(
        name: String,
        email: String,
        password_hash: String,
        organization: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash: Some(password_hash),
            organization,
            role: "USER".to_string(),
            google_id: None,
            avatar: None,
            refresh_token: None,
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_google(
        name: String,
        email: String,
        google_id: String,
        avatar: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash: None,
            organization: None,
            role: "USER".to_string(),
            google_id: Some(google_id),
            avatar,
            refresh_token: None,
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the account can only authenticate through Google.
    pub fn is_oauth_only(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// The user summary returned in auth responses. Never carries the password
/// hash, refresh token, or reset token fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.name.clone(),
            organization: user.organization.clone(),
            role: user.role.clone(),
            avatar: user.avatar.clone(),
        }
    }
}
