//! Request authentication, delegated to the hosted identity provider.
//!
//! Handlers take an `AuthUser` argument; the extractor runs before any body is
//! read, so an unauthenticated request never reaches the store.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::state::AppState;

/// The caller as known to the identity provider. Only the id is kept; the
/// rest of the user object is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub id: Uuid,
}

/// Resolves an access token to an identity. `Ok(None)` means the token was
/// rejected; `Err` means the provider could not be asked.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, access_token: &str) -> Result<Option<Identity>, AppError>;
}

/// Identity provider reached over HTTP (`GET {auth_url}/auth/v1/user`).
#[derive(Clone)]
pub struct HostedIdentityProvider {
    client: Client,
    auth_url: String,
    anon_key: String,
}

impl HostedIdentityProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            anon_key: config.auth_anon_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn resolve(&self, access_token: &str) -> Result<Option<Identity>, AppError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.auth_url))
            .bearer_auth(access_token)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("identity provider unreachable: {e}")))?;

        match response.status() {
            StatusCode::OK => {
                let identity = response.json::<Identity>().await.map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("invalid identity provider response: {e}"))
                })?;
                Ok(Some(identity))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Identity provider rejected access token");
                Ok(None)
            }
            status => {
                warn!("Identity provider returned {status}");
                Err(AppError::Internal(anyhow::anyhow!(
                    "identity provider returned {status}"
                )))
            }
        }
    }
}

/// Authenticated caller, extracted from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthorized)?;

        let identity = state
            .identity
            .resolve(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser { id: identity.id })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
