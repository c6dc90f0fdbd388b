use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("User with this email already exists")]
    EmailConflict,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Email delivery error: {0}")]
    Email(String),

    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

// Token signing failures are unexpected: the secrets are validated at startup.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(err.to_string())
    }
}

// Implement actix_web::ResponseError for AppError
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Server-side failures must not leak internal detail to the client.
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(json!({
            "success": false,
            "message": message,
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::InvalidResetToken) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::EmailConflict => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Covers both unknown email and wrong password; the two cases must not
    /// be distinguishable to the caller.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account has no password hash: it was created through Google
    /// sign-in and never set a password.
    #[error("Please use Google to sign in")]
    PasswordLoginUnavailable,

    /// Bad signature, expired, unknown user, or superseded by a newer
    /// issuance. All collapse to one error.
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Google token is invalid")]
    InvalidIdentityToken,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,
}
