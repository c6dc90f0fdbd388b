use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::auth::google::{self, GoogleUserData};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::reset::{generate_reset_token, reset_token_expiry};
use crate::auth::token::{TokenIssuer, TokenPair};
use crate::db::models::{AuthUser, User};
use crate::db::operations::UserStore;
use crate::error::{AppError, AuthError};
use crate::email::Mailer;
use crate::Result;

/// Response body shared by signup, login, refresh, and Google sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub user: AuthUser,
    pub token: String,
    pub refresh_token: String,
}

impl AuthResponse {
    fn new(user: &User, pair: TokenPair) -> Self {
        Self {
            success: true,
            user: AuthUser::from(user),
            token: pair.access,
            refresh_token: pair.refresh,
        }
    }
}

/// Orchestrates the credential lifecycle against the injected store, token
/// issuer, and mailer. One instance is shared process-wide; all state beyond
/// configuration lives in the store.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenIssuer,
    mailer: Arc<dyn Mailer>,
    /// Digest verified against when the email is unknown, so login failures
    /// cost the same bcrypt work either way.
    phantom_hash: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: TokenIssuer,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self> {
        let phantom_hash = hash_password("phantom-credentials")?;
        Ok(Self {
            store,
            tokens,
            mailer,
            phantom_hash,
        })
    }

    /// Preconditions (owned by the HTTP layer, restated here): non-empty
    /// name, email, and password; password at least 8 characters.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        organization: Option<String>,
    ) -> Result<AuthResponse> {
        if self.store.find_by_email(email).await?.is_some() {
            return Err(AppError::EmailConflict);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .store
            .create(&User::new_local(
                full_name.to_string(),
                email.to_string(),
                password_hash,
                organization,
            ))
            .await?;

        self.issue_session(&user).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let Some(user) = self.store.find_by_email(email).await? else {
            let _ = verify_password(password, &self.phantom_hash);
            return Err(AuthError::InvalidCredentials.into());
        };

        let Some(digest) = user.password_hash.as_deref() else {
            return Err(AuthError::PasswordLoginUnavailable.into());
        };

        if !verify_password(password, digest) {
            return Err(AuthError::InvalidCredentials.into());
        }

        self.issue_session(&user).await
    }

    /// Exchanges a refresh token for a new pair. The presented token must
    /// verify AND still be the single stored value for its user; the swap is
    /// conditional on that equality at the store layer, so a token superseded
    /// by a newer issuance is rejected even though its signature verifies.
    pub async fn refresh(&self, presented: &str) -> Result<AuthResponse> {
        let claims = self
            .tokens
            .verify_refresh(presented)
            .ok_or(AuthError::InvalidRefreshToken)?;
        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let pair = self.tokens.issue_pair(&user)?;
        let rotated = self
            .store
            .rotate_refresh_token(user.id, presented, &pair.refresh)
            .await?;
        if !rotated {
            return Err(AuthError::InvalidRefreshToken.into());
        }

        Ok(AuthResponse::new(&user, pair))
    }

    /// Best-effort server-side invalidation. The client discards its tokens
    /// regardless, so no failure here may surface.
    pub async fn logout(&self, access_token: Option<&str>) {
        let Some(token) = access_token else { return };
        let Some(claims) = self.tokens.verify_access(token) else {
            return;
        };
        let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
            return;
        };

        if let Err(err) = self.store.set_refresh_token(user_id, None).await {
            warn!("logout: failed to clear refresh token: {}", err);
        }
    }

    /// Request phase of the reset flow. Unknown emails return the same Ok as
    /// known ones; the token only ever travels through the mailer.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let Some(user) = self.store.find_by_email(email).await? else {
            return Ok(());
        };

        let token = generate_reset_token();
        self.store
            .set_reset_token(user.id, &token, reset_token_expiry())
            .await?;

        self.mailer.send_reset_email(&user.email, &token).await?;

        Ok(())
    }

    /// Confirm phase. The store lookup already filters expired tokens; the
    /// password update clears the reset fields and the stored refresh token
    /// in the same write, so the token is single-use and existing sessions
    /// cannot outlive a reset.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let user = self
            .store
            .find_by_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let password_hash = hash_password(new_password)?;
        self.store.reset_password(user.id, &password_hash).await?;

        Ok(())
    }

    /// Terminal step for a verified Google identity: resolve to a local user
    /// and issue a session like every other flow.
    pub async fn google_login(&self, identity: GoogleUserData) -> Result<AuthResponse> {
        let user = google::find_or_create_google_user(self.store.as_ref(), identity).await?;
        self.issue_session(&user).await
    }

    /// Shared tail of registration, login, refresh, and Google sign-in:
    /// issue a pair and make its refresh token the single stored value.
    async fn issue_session(&self, user: &User) -> Result<AuthResponse> {
        let pair = self.tokens.issue_pair(user)?;
        self.store
            .set_refresh_token(user.id, Some(&pair.refresh))
            .await?;

        Ok(AuthResponse::new(user, pair))
    }
}
