use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{AppError, AuthError};
use crate::AppState;

/// Minimum accepted password length, for signup and reset alike.
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub organization: Option<String>,
}

pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = req.into_inner();
    let (Some(full_name), Some(email), Some(password)) = (
        non_empty(body.full_name),
        non_empty(body.email),
        non_empty(body.password),
    ) else {
        return Err(AppError::Validation(
            "Full name, email, and password are required".into(),
        ));
    };

    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    info!("Received signup request for email: {}", email);
    let response = state
        .auth
        .register(&full_name, &email, &password, non_empty(body.organization))
        .await?;

    Ok(HttpResponse::Created().json(response))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = req.into_inner();
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password))
    else {
        return Err(AppError::Validation("Email and password are required".into()));
    };

    info!("Received login request for email: {}", email);
    match state.auth.login(&email, &password).await {
        Ok(response) => {
            info!("Login successful for email: {}", email);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            info!("Login failed for email: {}", email);
            Err(e)
        }
    }
}

pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req)
        .or_else(|| cookie_token(&req, "refresh_token"))
        .ok_or(AuthError::InvalidRefreshToken)?;

    let response = state.auth.refresh(&token).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Always answers success: the client discards its tokens either way, and
/// server-side invalidation is a courtesy.
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let token = bearer_token(&req).or_else(|| cookie_token(&req, "access_token"));
    state.auth.logout(token.as_deref()).await;

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully"
    }))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

pub async fn forgot_password(
    req: web::Json<ForgotPasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let Some(email) = non_empty(req.into_inner().email) else {
        return Err(AppError::Validation("Email is required".into()));
    };

    state.auth.forgot_password(&email).await?;

    // Identical body whether or not the account exists.
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "If an account with that email exists, a password reset link has been sent"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

pub async fn reset_password(
    req: web::Json<ResetPasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = req.into_inner();
    let (Some(token), Some(new_password)) =
        (non_empty(body.token), non_empty(body.new_password))
    else {
        return Err(AppError::Validation(
            "Token and new password are required".into(),
        ));
    };

    if new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    state.auth.reset_password(&token, &new_password).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Password has been reset successfully. You can now login with your new password."
    })))
}

#[derive(Debug, Deserialize)]
pub struct GoogleAuthRequest {
    pub token: Option<String>,
}

pub async fn google_auth(
    req: web::Json<GoogleAuthRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let Some(token) = non_empty(req.into_inner().token) else {
        return Err(AppError::Validation("Google token is not found!".into()));
    };

    let identity = state
        .google_verifier
        .verify(&token)
        .await
        .map_err(|e| {
            error!("Google token verification failed: {}", e);
            e
        })?
        .ok_or(AuthError::InvalidIdentityToken)?;

    let response = state.auth.google_login(identity).await?;

    Ok(HttpResponse::Ok().json(response))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Bearer header first, then the named cookie.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned)
}

fn cookie_token(req: &HttpRequest, name: &str) -> Option<String> {
    req.cookie(name).map(|c| c.value().to_string())
}
