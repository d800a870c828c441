use anyhow::Context;
use jsonwebtoken::{get_current_timestamp, Algorithm, EncodingKey};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{app::FirebaseAppOptions, ServiceAccount};

/// The `aud` claim of every assertion. It stays the same when the token URL
/// is pointed somewhere else.
pub const GOOGLE_TOKEN_AUDIENCE: &str = "https://accounts.google.com/o/oauth2/token";

/// Assertions and access tokens are valid for an hour.
const TOKEN_LIFETIME_SECS: u64 = 60 * 60;
/// Cached access tokens are refreshed this long before they actually expire.
const EXPIRY_BUFFER_SECS: u64 = 5 * 60;

/// Signs OAuth2 assertions with the service account's private key and
/// exchanges them for access tokens, which are cached until shortly before
/// they expire.
pub struct ServiceAccountCredential {
    service_account: ServiceAccount,
    encoding_key: EncodingKey,
    token_url: String,
    scope: String,
    current_access_token: RwLock<Option<AccessToken>>,
    http_client: reqwest::Client,
}

impl ServiceAccountCredential {
    /// Fails if the private key is not a valid PEM encoded RSA key.
    pub fn new(
        service_account: ServiceAccount,
        options: &FirebaseAppOptions,
        http_client: reqwest::Client,
    ) -> Result<Self, anyhow::Error> {
        let encoding_key = EncodingKey::from_rsa_pem(service_account.private_key.as_bytes())
            .context("Failed to create JWT encoding key from the given private key")?;

        Ok(Self {
            service_account,
            encoding_key,
            token_url: options.token_url.clone(),
            scope: options.scopes.join(" "),
            current_access_token: RwLock::new(None),
            http_client,
        })
    }

    pub fn service_account(&self) -> &ServiceAccount {
        &self.service_account
    }

    pub async fn get_access_token(&self) -> anyhow::Result<String> {
        if let Some(token) = self.get_non_expired_token().await {
            return Ok(token);
        }

        let mut token_guard = self.current_access_token.write().await;

        // Another caller may have refreshed the token while we waited for the lock.
        if let Some(token) = token_guard.as_ref().filter(|t| !t.has_expired()) {
            return Ok(token.access_token.clone());
        }

        let access_token = self.fetch_access_token().await?;
        let token = access_token.access_token.clone();
        *token_guard = Some(access_token);
        Ok(token)
    }

    async fn get_non_expired_token(&self) -> Option<String> {
        match self.current_access_token.read().await.as_ref() {
            Some(token) if !token.has_expired() => Some(token.access_token.clone()),
            _ => None,
        }
    }

    #[tracing::instrument(name = "Fetch access token", skip(self), fields(client_email = %self.service_account.client_email))]
    async fn fetch_access_token(&self) -> Result<AccessToken, anyhow::Error> {
        let jwt = self.create_auth_jwt()?;

        let post_data = format!(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer&assertion={}",
            jwt
        );

        let res = self
            .http_client
            .post(&self.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(post_data)
            .send()
            .await
            .context("Failed to send auth token request to Google")?;

        let status = res.status();
        anyhow::ensure!(
            status.is_success(),
            "Failed to get auth token from Google (status {}): {}",
            status,
            res.text().await.unwrap_or_default()
        );

        let res_body = res
            .json::<AccessTokenResponse>()
            .await
            .context("Failed to read auth token response from Google")?;

        anyhow::ensure!(
            res_body.token_type.eq_ignore_ascii_case("Bearer"),
            "Google did not return a Bearer token"
        );

        tracing::debug!(expires_in = res_body.expires_in, "Received access token");

        Ok(AccessToken {
            access_token: res_body.access_token,
            expires_at: get_current_timestamp()
                .saturating_add(res_body.expires_in)
                .saturating_sub(EXPIRY_BUFFER_SECS),
        })
    }

    /// Creates the signed JWT assertion that is exchanged for an access token.
    pub fn create_auth_jwt(&self) -> Result<String, anyhow::Error> {
        let issued_at_time = get_current_timestamp();

        let claims = Claims {
            scope: &self.scope,
            aud: GOOGLE_TOKEN_AUDIENCE,
            iss: &self.service_account.client_email,
            iat: issued_at_time,
            exp: issued_at_time + TOKEN_LIFETIME_SECS,
        };

        let mut header = jsonwebtoken::Header::new(Algorithm::RS256);
        header.kid = self.service_account.private_key_id.clone();

        let jwt = jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .context("Failed to sign JWT with the given private key")?;

        Ok(jwt)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    scope: &'a str,
    aud: &'a str,
    iss: &'a str,
    exp: u64,
    iat: u64,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    expires_in: u64,
    token_type: String,
}

#[derive(Debug, Clone)]
struct AccessToken {
    access_token: String,
    expires_at: u64,
}

impl AccessToken {
    fn has_expired(&self) -> bool {
        get_current_timestamp() >= self.expires_at
    }
}
