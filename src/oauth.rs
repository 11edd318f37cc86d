//! OAuth 2 authorization code flow against Wave.
//!
//! [`Client`](crate::Client) never performs this flow itself. These helpers
//! obtain a token and wrap it in a `reqwest::Client` that sends it as a
//! bearer token, which is then used as the client's transport.

use std::path::Path;

use oauth2::{
    AuthUrl, AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, RedirectUrl, TokenResponse, TokenUrl,
    basic::BasicClient,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::scope::Scope;

pub const AUTH_URL: &str = "https://api.waveapps.com/oauth2/authorize/";
pub const TOKEN_URL: &str = "https://api.waveapps.com/oauth2/token/";

/// Stores the OAuth 2 client ID and client secret.
#[derive(Debug, Clone)]
pub struct KeyPair(pub(crate) oauth2::ClientId, pub(crate) Option<oauth2::ClientSecret>);

impl KeyPair {
    /// Creates a new `KeyPair` from the provided `client_id` and `client_secret` strings.
    #[must_use]
    pub fn new(client_id: String, client_secret: Option<String>) -> Self {
        Self(
            oauth2::ClientId::new(client_id),
            client_secret.map(oauth2::ClientSecret::new),
        )
    }

    /// Reads `WAVE_CLIENT_ID` and `WAVE_CLIENT_SECRET` from the environment.
    ///
    /// Returns `None` if `WAVE_CLIENT_ID` is not set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("WAVE_CLIENT_ID").ok()?;
        Some(Self::new(client_id, std::env::var("WAVE_CLIENT_SECRET").ok()))
    }
}

pub type OAuthClient = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[instrument]
fn build_oauth_client(key_pair: KeyPair, redirect_url: Url) -> Result<OAuthClient> {
    let auth_url = AuthUrl::new(AUTH_URL.to_string()).map_err(|e| Error::invalid_endpoint(AUTH_URL, e))?;
    let token_url = TokenUrl::new(TOKEN_URL.to_string()).map_err(|e| Error::invalid_endpoint(TOKEN_URL, e))?;

    let client = BasicClient::new(key_pair.0)
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(RedirectUrl::from_url(redirect_url));

    Ok(match key_pair.1 {
        Some(secret) => client.set_client_secret(secret),
        None => client,
    })
}

/// Generates the URL the user visits to authorize the application.
#[instrument(skip(scope))]
pub fn authorize_url(key_pair: KeyPair, redirect_url: Url, scope: impl Into<Scope>) -> Result<(Url, CsrfToken)> {
    let scope = scope.into();
    Ok(build_oauth_client(key_pair, redirect_url)?
        .authorize_url(CsrfToken::new_random)
        .add_scopes(scope.into_oauth2_scopes())
        .url())
}

/// Exchanges an authorization code for a token.
#[instrument(skip(code))]
pub async fn exchange_code(key_pair: KeyPair, redirect_url: Url, code: String) -> Result<Token> {
    let oauth_client = build_oauth_client(key_pair, redirect_url)?;
    let http_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let token = oauth_client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(&http_client)
        .await?;

    debug!("exchanged authorization code for a token");
    Ok(Token {
        access_token: token.access_token().secret().clone(),
        refresh_token: token.refresh_token().map(|t| t.secret().clone()),
    })
}

/// An access token, as stored in the token cache file.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl Token {
    /// Reads a token previously written with [`Token::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read(path).map_err(Error::TokenCache)?;
        serde_json::from_slice(&contents).map_err(|e| Error::TokenCache(e.into()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_vec_pretty(self).map_err(|e| Error::TokenCache(e.into()))?;
        std::fs::write(path, contents).map_err(Error::TokenCache)
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        authorized_http_client(&self.access_token)
    }
}

/// Builds a `reqwest::Client` that sends `access_token` as a bearer token
/// on every request.
pub fn authorized_http_client(access_token: &str) -> Result<reqwest::Client> {
    let mut authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);

    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_pair() -> KeyPair {
        KeyPair::new("client-id".to_string(), Some("secret".to_string()))
    }

    #[test]
    fn authorize_url_carries_client_scope_and_redirect() {
        let redirect = Url::parse("http://localhost:9001/oauth2").unwrap();
        let (url, csrf) = authorize_url(key_pair(), redirect, Scope::basic()).unwrap();

        assert!(url.as_str().starts_with(AUTH_URL));
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("client_id".into(), "client-id".into())));
        assert!(query.contains(&("scope".into(), "basic".into())));
        assert!(query.contains(&("response_type".into(), "code".into())));
        assert!(query.contains(&("redirect_uri".into(), "http://localhost:9001/oauth2".into())));
        assert!(query.contains(&("state".into(), csrf.secret().clone())));
    }

    #[test]
    fn token_cache_round_trip() {
        let path = std::env::temp_dir().join(format!("wave-rs-token-{}.json", std::process::id()));
        let token = Token {
            access_token: "abc".to_string(),
            refresh_token: None,
        };

        token.save(&path).unwrap();
        assert_eq!(Token::load(&path).unwrap(), token);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_token_cache_is_an_error() {
        let err = Token::load("/nonexistent/wave-rs/token.json").unwrap_err();
        assert!(matches!(err, Error::TokenCache(_)));
    }

    #[test]
    fn debug_redacts_secrets() {
        let token = Token {
            access_token: "abc".to_string(),
            refresh_token: Some("def".to_string()),
        };
        let debug = format!("{token:?}");
        assert!(!debug.contains("abc"));
        assert!(!debug.contains("def"));
    }

    #[test]
    fn rejects_tokens_that_cannot_be_headers() {
        let err = authorized_http_client("bad\ntoken").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader(_)));
    }
}
