use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::models::User;
use crate::Result;

/// Access tokens are never individually revocable; the short lifetime is the
/// only mitigation for leakage.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Identity payload embedded in both token kinds. Reconstructible from a
/// [`User`] row alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub role: String,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration time
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Signs and verifies the two token kinds with distinct secrets, so a leaked
/// access-token secret cannot forge refresh tokens and vice versa. Expiry is
/// embedded in the token itself; verification needs no store round-trip.
pub struct TokenIssuer {
    access_secret: String,
    refresh_secret: String,
}

impl TokenIssuer {
    pub fn new(access_secret: String, refresh_secret: String) -> Self {
        Self {
            access_secret,
            refresh_secret,
        }
    }

    pub fn issue_access(&self, user: &User) -> Result<String> {
        self.sign(
            user,
            &self.access_secret,
            Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        )
    }

    pub fn issue_refresh(&self, user: &User) -> Result<String> {
        self.sign(
            user,
            &self.refresh_secret,
            Duration::days(REFRESH_TOKEN_TTL_DAYS),
        )
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.issue_access(user)?,
            refresh: self.issue_refresh(user)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Option<Claims> {
        Self::check(token, &self.access_secret)
    }

    pub fn verify_refresh(&self, token: &str) -> Option<Claims> {
        Self::check(token, &self.refresh_secret)
    }

    fn sign(&self, user: &User, secret: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// None on bad signature, malformed structure, or expiry. Nothing past
    /// this boundary sees a decode error.
    fn check(token: &str, secret: &str) -> Option<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .ok()
        .map(|data| data.claims)
    }
}
