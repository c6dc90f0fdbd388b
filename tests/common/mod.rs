#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use moviebase_server::auth::{AuthService, GoogleUserData, GoogleVerifier, TokenIssuer};
use moviebase_server::db::models::User;
use moviebase_server::email::Mailer;
use moviebase_server::{AppError, Result, UserStore};

/// In-memory [`UserStore`] with the same semantics as the Postgres adapter:
/// unique emails, expiry-filtered reset-token lookup, and conditional
/// refresh-token rotation under one lock.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn get_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Option<User> {
        self.users.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.get_by_email(email).await)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.get_by_id(id).await)
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>> {
        let now = Utc::now();
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| {
                u.reset_token.as_deref() == Some(token)
                    && u.reset_token_expiry.map_or(false, |exp| exp > now)
            })
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::EmailConflict);
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<()> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.get_mut(&id) {
            user.refresh_token = token.map(str::to_owned);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn rotate_refresh_token(&self, id: Uuid, current: &str, next: &str) -> Result<bool> {
        let mut users = self.users.lock().await;
        match users.get_mut(&id) {
            Some(user) if user.refresh_token.as_deref() == Some(current) => {
                user.refresh_token = Some(next.to_string());
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_reset_token(&self, id: Uuid, token: &str, expiry: DateTime<Utc>) -> Result<()> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.get_mut(&id) {
            user.reset_token = Some(token.to_string());
            user.reset_token_expiry = Some(expiry);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn reset_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.get_mut(&id) {
            user.password_hash = Some(password_hash.to_string());
            user.reset_token = None;
            user.reset_token_expiry = None;
            user.refresh_token = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn link_google_account(
        &self,
        id: Uuid,
        google_id: &str,
        avatar: Option<&str>,
    ) -> Result<User> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::Internal("no such user".into()))?;
        user.google_id = Some(google_id.to_string());
        if let Some(avatar) = avatar {
            user.avatar = Some(avatar.to_string());
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

/// Records reset emails instead of sending them.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn last_token(&self) -> Option<String> {
        self.sent.lock().await.last().map(|(_, token)| token.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_reset_email(&self, to: &str, reset_token: &str) -> Result<()> {
        self.sent
            .lock()
            .await
            .push((to.to_string(), reset_token.to_string()));
        Ok(())
    }
}

/// Mailer whose transport is always down.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send_reset_email(&self, _to: &str, _reset_token: &str) -> Result<()> {
        Err(AppError::Email("smtp connection refused".into()))
    }
}

/// Canned identity-provider verdicts for handler tests.
pub enum StaticVerifier {
    Valid(GoogleUserData),
    Invalid,
    Unreachable,
}

#[async_trait]
impl GoogleVerifier for StaticVerifier {
    async fn verify(&self, _id_token: &str) -> Result<Option<GoogleUserData>> {
        match self {
            StaticVerifier::Valid(data) => Ok(Some(data.clone())),
            StaticVerifier::Invalid => Ok(None),
            StaticVerifier::Unreachable => {
                Err(AppError::IdentityProvider("connection timed out".into()))
            }
        }
    }
}

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(
        "test-access-secret".to_string(),
        "test-refresh-secret".to_string(),
    )
}

pub fn test_service(store: Arc<MemoryStore>, mailer: Arc<dyn Mailer>) -> AuthService {
    AuthService::new(store, test_issuer(), mailer).expect("service construction")
}

pub fn google_identity(google_id: &str, email: &str) -> GoogleUserData {
    GoogleUserData {
        google_id: google_id.to_string(),
        email: email.to_string(),
        name: "Google User".to_string(),
        picture: Some("https://example.com/avatar.png".to_string()),
    }
}
