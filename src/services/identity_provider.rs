// ==================== IDENTITY PROVIDER (FIREBASE AUTH) ====================
// Firebase Authentication via the Identity Toolkit REST API.
// Requests are authorised with an OAuth2 access token obtained from the
// service account key (signed JWT assertion, RS256).

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::utils::{AppError, AppResult};

pub const IDENTITY_TOOLKIT_API_BASE: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TOKEN_SCOPES: &str =
    "https://www.googleapis.com/auth/identitytoolkit https://www.googleapis.com/auth/cloud-platform";
const ASSERTION_LIFETIME_SECONDS: i64 = 3600;
// Refresh the cached access token this long before it expires
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// External service of record for authentication accounts.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the account id (uid) registered for `email`.
    async fn get_user_by_email(&self, email: &str) -> AppResult<String>;

    async fn delete_user(&self, uid: &str) -> AppResult<()>;
}

/// Google service account key, as downloaded from the console
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccount {
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| format!("Invalid service account JSON: {}", e))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECONDS as u64
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

pub struct FirebaseAuth {
    account: ServiceAccount,
    /// Identity Toolkit base URL, up to and including the version segment
    api_base: String,
    client: reqwest::Client,
    token: RwLock<Option<CachedToken>>,
}

impl FirebaseAuth {
    pub fn new(account: ServiceAccount, api_base: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            account,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
            token: RwLock::new(None),
        })
    }

    fn build_assertion(&self, now: i64) -> AppResult<String> {
        let claims = AssertionClaims {
            iss: self.account.client_email.clone(),
            scope: TOKEN_SCOPES.to_string(),
            aud: self.account.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECONDS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.account.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())?;
        Ok(encode(&header, &claims, &key)?)
    }

    async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(cached) = cached.as_ref() {
                if cached.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cached = self.token.write().await;

        // Another request may have refreshed while we waited for the lock
        if let Some(current) = cached.as_ref() {
            if current.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(current.token.clone());
            }
        }

        log::debug!("🔑 Requesting identity provider access token");

        let assertion = self.build_assertion(chrono::Utc::now().timestamp())?;
        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::IdentityProviderError(format!(
                "Token endpoint error {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(token.access_token)
    }

    async fn call(&self, action: &str, body: serde_json::Value) -> AppResult<reqwest::Response> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/projects/{}/accounts:{}",
            self.api_base, self.account.project_id, action
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::IdentityProviderError(format!(
                "accounts:{} failed with {}: {}",
                action, status, body
            )));
        }

        Ok(response)
    }
}

fn first_local_id(lookup: LookupResponse, email: &str) -> AppResult<String> {
    lookup
        .users
        .into_iter()
        .next()
        .map(|u| u.local_id)
        .ok_or_else(|| {
            AppError::IdentityProviderError(format!(
                "There is no user record corresponding to the provided identifier: {}",
                email
            ))
        })
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn get_user_by_email(&self, email: &str) -> AppResult<String> {
        let response = self
            .call("lookup", serde_json::json!({ "email": [email] }))
            .await?;
        let lookup: LookupResponse = response.json().await?;
        first_local_id(lookup, email)
    }

    async fn delete_user(&self, uid: &str) -> AppResult<()> {
        self.call("delete", serde_json::json!({ "localId": uid }))
            .await?;
        log::info!("✅ Identity provider account {} deleted", uid);
        Ok(())
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Identity provider double keyed by email
    #[derive(Default)]
    pub struct FakeIdentityProvider {
        accounts: Mutex<HashMap<String, String>>,
        pub fail_delete: bool,
    }

    impl FakeIdentityProvider {
        pub fn with_account(email: &str, uid: &str) -> Self {
            let provider = Self::default();
            provider
                .accounts
                .try_lock()
                .expect("fresh mutex")
                .insert(email.to_string(), uid.to_string());
            provider
        }

        pub async fn has_account(&self, email: &str) -> bool {
            self.accounts.lock().await.contains_key(email)
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentityProvider {
        async fn get_user_by_email(&self, email: &str) -> AppResult<String> {
            self.accounts
                .lock()
                .await
                .get(email)
                .cloned()
                .ok_or_else(|| AppError::IdentityProviderError(format!("no account for {}", email)))
        }

        async fn delete_user(&self, uid: &str) -> AppResult<()> {
            if self.fail_delete {
                return Err(AppError::IdentityProviderError("deleteUser unavailable".to_string()));
            }
            self.accounts.lock().await.retain(|_, v| v != uid);
            Ok(())
        }
    }
}
