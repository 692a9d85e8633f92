//! Login and session tokens
//!
//! Login is a password grant against the identity provider followed by a
//! profile lookup. The access token authorises every later call; the first
//! membership's token selects the organisation through the `org-token`
//! header.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use core_kernel::PortError;
use domain_invoice::{LoginForm, TokenProvider};

use crate::client::{authorize, build_client, read_json, send};
use crate::config::ClientConfig;
use crate::error::HttpError;

pub const TOKEN_PATH: &str = "/oauth2/token";
pub const PROFILE_PATH: &str = "/membership-service/1.0.0/users/me";

#[derive(Debug, Clone, Default)]
struct Tokens {
    access_token: Option<String>,
    org_token: Option<String>,
}

/// In-memory token store for one signed-in user
#[derive(Debug, Default)]
pub struct SessionTokens {
    inner: RwLock<Tokens>,
}

impl SessionTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        self.write(|t| t.access_token = Some(token.into()));
    }

    pub fn set_org_token(&self, token: impl Into<String>) {
        self.write(|t| t.org_token = Some(token.into()));
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|t| t.access_token.is_some())
    }

    /// Forgets both tokens
    pub fn logout(&self) {
        self.write(|t| *t = Tokens::default());
        info!("Session tokens cleared");
    }

    fn read<R>(&self, f: impl FnOnce(&Tokens) -> R) -> R {
        f(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write(&self, f: impl FnOnce(&mut Tokens)) {
        f(&mut self.inner.write().unwrap_or_else(PoisonError::into_inner));
    }
}

impl TokenProvider for SessionTokens {
    fn access_token(&self) -> Option<String> {
        self.read(|t| t.access_token.clone())
    }

    fn org_token(&self) -> Option<String> {
        self.read(|t| t.org_token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Membership {
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileData {
    memberships: Vec<Membership>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    data: ProfileData,
}

impl ProfileResponse {
    fn org_token(self) -> Option<String> {
        self.data.memberships.into_iter().next().and_then(|m| m.token)
    }
}

/// Client for the identity provider and the profile endpoint
#[derive(Debug)]
pub struct AuthClient {
    client: Client,
    token_url: String,
    profile_url: String,
    client_id: String,
    client_secret: String,
    timeout_ms: u64,
    tokens: Arc<SessionTokens>,
}

impl AuthClient {
    pub fn new(config: &ClientConfig, tokens: Arc<SessionTokens>) -> Result<Self, HttpError> {
        Ok(Self::with_client(build_client(config)?, config, tokens))
    }

    pub fn with_client(client: Client, config: &ClientConfig, tokens: Arc<SessionTokens>) -> Self {
        Self {
            client,
            token_url: config.auth_url(TOKEN_PATH),
            profile_url: config.api_url(PROFILE_PATH),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            timeout_ms: config.timeout_ms(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<SessionTokens> {
        &self.tokens
    }

    /// Signs in with `form` and stores the resulting tokens
    ///
    /// An invalid form is refused before any request is made. If the
    /// profile lookup fails the access token is dropped again, so the store
    /// is either fully signed in or empty.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> Result<(), PortError> {
        let errors = form.validate();
        if let Some((path, messages)) = errors.iter().next() {
            let message = messages.first().map(String::as_str).unwrap_or("Invalid login");
            return Err(PortError::validation_field(message, path.to_string()));
        }

        let access_token = self.request_token(form).await?;
        self.tokens.set_access_token(access_token);

        match self.fetch_org_token().await {
            Ok(Some(org_token)) => self.tokens.set_org_token(org_token),
            Ok(None) => warn!("Profile has no memberships, continuing without an org token"),
            Err(e) => {
                self.tokens.logout();
                return Err(e.into());
            }
        }

        info!("Logged in");
        Ok(())
    }

    /// Forgets the stored tokens
    pub fn logout(&self) {
        self.tokens.logout();
    }

    async fn request_token(&self, form: &LoginForm) -> Result<String, HttpError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "password"),
            ("scope", "openid"),
            ("username", form.username.as_str()),
            ("password", form.password.as_str()),
        ];
        let request = self.client.post(&self.token_url).form(&params);
        let response = send("login", self.timeout_ms, request).await?;
        let token: TokenResponse = read_json("login", self.timeout_ms, response).await?;
        Ok(token.access_token)
    }

    async fn fetch_org_token(&self) -> Result<Option<String>, HttpError> {
        let request = authorize(self.client.get(&self.profile_url), self.tokens.as_ref());
        let response = send("fetch_profile", self.timeout_ms, request).await?;
        let profile: ProfileResponse = read_json("fetch_profile", self.timeout_ms, response).await?;
        Ok(profile.org_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_start_empty() {
        let tokens = SessionTokens::new();
        assert!(!tokens.is_authenticated());
        assert_eq!(tokens.access_token(), None);
        assert_eq!(tokens.org_token(), None);
    }

    #[test]
    fn test_logout_clears_both_tokens() {
        let tokens = SessionTokens::new();
        tokens.set_access_token("a");
        tokens.set_org_token("o");
        assert!(tokens.is_authenticated());

        tokens.logout();
        assert_eq!(tokens.access_token(), None);
        assert_eq!(tokens.org_token(), None);
    }

    #[test]
    fn test_profile_takes_first_membership_token() {
        let profile: ProfileResponse = serde_json::from_str(
            r#"{"data":{"memberships":[{"token":"org-a","role":"ADMIN"},{"token":"org-b"}]}}"#,
        )
        .unwrap();
        assert_eq!(profile.org_token(), Some("org-a".to_string()));
    }

    #[test]
    fn test_profile_without_memberships() {
        let profile: ProfileResponse = serde_json::from_str(r#"{"data":{}}"#).unwrap();
        assert_eq!(profile.org_token(), None);
    }

    #[test]
    fn test_urls() {
        let client = AuthClient::new(&ClientConfig::default(), Arc::new(SessionTokens::new())).unwrap();
        assert_eq!(client.token_url, "http://localhost:8080/auth/oauth2/token");
        assert_eq!(
            client.profile_url,
            "http://localhost:8080/api/membership-service/1.0.0/users/me"
        );
    }

    #[tokio::test]
    async fn test_blank_login_is_refused_without_a_request() {
        let config = ClientConfig {
            auth_base_url: "http://127.0.0.1:9".to_string(),
            ..ClientConfig::default()
        };
        let client = AuthClient::new(&config, Arc::new(SessionTokens::new())).unwrap();

        let error = client.login(&LoginForm::new("", "secret")).await.unwrap_err();

        match error {
            PortError::Validation { message, field } => {
                assert_eq!(message, "Username is required");
                assert_eq!(field.as_deref(), Some("username"));
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
        assert!(!client.tokens().is_authenticated());
    }
}
