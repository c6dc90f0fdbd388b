use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::db::models::User;
use crate::db::operations::UserStore;
use crate::error::AppError;
use crate::Result;

const TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";

/// A Google identity the provider has vouched for.
#[derive(Debug, Clone)]
pub struct GoogleUserData {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Verifies an opaque ID-token assertion. `Ok(None)` means the assertion is
/// invalid (bad token, wrong audience); `Err` means the provider could not be
/// reached at all.
#[async_trait]
pub trait GoogleVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<Option<GoogleUserData>>;
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: String,
    name: String,
    picture: Option<String>,
}

pub struct HttpGoogleVerifier {
    http: reqwest::Client,
    client_id: String,
    endpoint: String,
}

impl HttpGoogleVerifier {
    pub fn new(client_id: String) -> Self {
        Self::with_endpoint(client_id, TOKENINFO_ENDPOINT.to_string())
    }

    pub fn with_endpoint(client_id: String, endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            endpoint,
        }
    }
}

#[async_trait]
impl GoogleVerifier for HttpGoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<Option<GoogleUserData>> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|err| AppError::IdentityProvider(err.to_string()))?;

        // Google answers non-2xx for unparseable or expired assertions.
        if !response.status().is_success() {
            return Ok(None);
        }

        let info: TokenInfo = match response.json().await {
            Ok(info) => info,
            Err(err) => {
                warn!("tokeninfo response did not parse: {}", err);
                return Ok(None);
            }
        };

        // A token minted for another application is not ours to accept.
        if info.aud != self.client_id {
            return Ok(None);
        }

        Ok(Some(GoogleUserData {
            google_id: info.sub,
            email: info.email,
            name: info.name,
            picture: info.picture,
        }))
    }
}

/// Reconciles a verified Google identity with the local user table.
/// Resolution order, first match wins: google_id, then email (links the
/// accounts, password hash untouched), then a fresh OAuth-only user.
pub async fn find_or_create_google_user(
    store: &dyn UserStore,
    data: GoogleUserData,
) -> Result<User> {
    if let Some(user) = store.find_by_google_id(&data.google_id).await? {
        return Ok(user);
    }

    if let Some(user) = store.find_by_email(&data.email).await? {
        return store
            .link_google_account(user.id, &data.google_id, data.picture.as_deref())
            .await;
    }

    store
        .create(&User::new_google(
            data.name,
            data.email,
            data.google_id,
            data.picture,
        ))
        .await
}
