//! Service-account authentication: a signed RS256 assertion is exchanged for
//! a short-lived bearer token, which is cached until shortly before expiry.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::ServiceError;

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: Duration = Duration::from_secs(3600);
/// Refresh this long before the provider-reported expiry.
const EXPIRY_SLACK: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct TokenProvider {
    http: reqwest::Client,
    token_uri: String,
    service_account: String,
    key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(cfg: &ServiceConfig) -> Result<Self, ServiceError> {
        let key = EncodingKey::from_rsa_pem(cfg.private_key_pem.as_bytes())
            .map_err(|err| ServiceError::Config(format!("unusable private key: {err}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            token_uri: TOKEN_URI.to_string(),
            service_account: cfg.service_account.clone(),
            key,
            cached: Mutex::new(None),
        })
    }

    /// Current bearer token, exchanging a fresh assertion when the cached one
    /// is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, ServiceError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.value.clone());
        }

        let assertion = self.sign_assertion()?;
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| ServiceError::Credentials(err.to_string()))?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| ServiceError::Credentials(format!("malformed token response: {err}")))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_SLACK);
        debug!(expires_in = token.expires_in, "access token refreshed");
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    fn sign_assertion(&self) -> Result<String, ServiceError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| ServiceError::Credentials(err.to_string()))?
            .as_secs();
        let claims = Claims {
            iss: &self.service_account,
            scope: SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME.as_secs(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|err| ServiceError::Credentials(format!("signing assertion: {err}")))
    }
}
