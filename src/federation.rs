//!
//! # Federation Handshake
//!
//! The Google sign-in flow is a two-phase handshake: phase one redirects the
//! caller to the provider with the requested scopes; phase two receives the
//! provider's callback, exchanges the authorization code, and asserts a
//! [`ProviderProfile`]. The profile is the only thing the rest of the
//! pipeline trusts; client-supplied identity fields never reach the
//! resolver.
//!
//! The provider sits behind the narrow [`IdentityProvider`] trait so route
//! handlers and tests never depend on Google directly.

use crate::error::{AppError, ErrorKind};
use async_trait::async_trait;
use serde::Deserialize;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// The profile the provider asserts after its own handshake. Trusted
/// verbatim; not re-verified here.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// Provider-scoped unique identifier.
    pub provider_id: String,
    pub display_name: String,
    pub email: Option<String>,
}

/// Narrow provider-assertion interface consumed by the callback handler.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Phase 1: the URL the caller is redirected to. `state` is echoed back
    /// by the provider; round-trip correlation is the transport's concern.
    fn authorize_url(&self, state: &str) -> String;

    /// Phase 2: redeems the callback's authorization code for a profile.
    /// Any provider-side failure is reported as `FederatedAuthFailed`.
    async fn exchange(&self, code: &str) -> Result<ProviderProfile, AppError>;
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    name: Option<String>,
    email: Option<String>,
}

/// Google OAuth 2.0 implementation of the handshake.
pub struct GoogleProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleProvider {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    fn federated_failure(stage: &str, error: impl std::fmt::Display) -> AppError {
        log::error!("google {} failed: {}", stage, error);
        AppError::new(ErrorKind::FederatedAuthFailed)
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorize_url(&self, state: &str) -> String {
        // parse_with_params handles the query encoding.
        reqwest::Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "profile email"),
                ("state", state),
            ],
        )
        .expect("static authorize URL is valid")
        .into()
    }

    async fn exchange(&self, code: &str) -> Result<ProviderProfile, AppError> {
        let token_response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| Self::federated_failure("code exchange", e))?
            .error_for_status()
            .map_err(|e| Self::federated_failure("code exchange", e))?
            .json::<TokenExchangeResponse>()
            .await
            .map_err(|e| Self::federated_failure("token decode", e))?;

        let info = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token_response.access_token)
            .send()
            .await
            .map_err(|e| Self::federated_failure("userinfo fetch", e))?
            .error_for_status()
            .map_err(|e| Self::federated_failure("userinfo fetch", e))?
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| Self::federated_failure("userinfo decode", e))?;

        Ok(ProviderProfile {
            display_name: info.name.unwrap_or_else(|| info.id.clone()),
            provider_id: info.id,
            email: info.email,
        })
    }
}
