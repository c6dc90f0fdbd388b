pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;

use std::sync::Arc;

use actix_web::HttpResponse;
use sqlx::postgres::PgPoolOptions;

pub use error::{AppError, AuthError};
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthService, GoogleVerifier, HttpGoogleVerifier, TokenIssuer};
pub use db::{PgUserStore, User, UserStore};
pub use email::{Mailer, SmtpMailer};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all handlers. Built once at startup;
/// everything inside is read-only or owns its own synchronization.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub google_verifier: Arc<dyn GoogleVerifier>,
}

impl AppState {
    pub async fn new(config: &Settings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let store = Arc::new(PgUserStore::new(Arc::new(pool)));
        let mailer = Arc::new(SmtpMailer::new(&config.email, &config.frontend_url)?);
        let tokens = TokenIssuer::new(
            config.auth.access_token_secret.clone(),
            config.auth.refresh_token_secret.clone(),
        );

        Ok(Self {
            auth: Arc::new(AuthService::new(store, tokens, mailer)?),
            google_verifier: Arc::new(HttpGoogleVerifier::new(config.google.client_id.clone())),
        })
    }
}
