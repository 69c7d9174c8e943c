//! Google OAuth: authorization-code flow against the standard Google
//! endpoints. The exchange yields only the email claim; everything else
//! about the identity lives in the users table.

use anyhow::Context;
use axum::http::{header::InvalidHeaderValue, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::auth::session::cookie_from_headers;
use crate::config::GoogleConfig;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Short-lived cookie holding the state nonce between redirect and callback.
pub const STATE_COOKIE: &str = "portfolio_oauth_state";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
}

pub fn authorize_url(config: &GoogleConfig, state: &str) -> anyhow::Result<String> {
    let url = Url::parse_with_params(
        AUTH_ENDPOINT,
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.callback_url.as_str()),
            ("scope", "openid email profile"),
            ("state", state),
        ],
    )
    .context("build google authorize url")?;
    Ok(url.into())
}

/// Trade an authorization code for the provider's email claim.
pub async fn fetch_email(
    http: &reqwest::Client,
    config: &GoogleConfig,
    code: &str,
) -> anyhow::Result<String> {
    let token: TokenResponse = http
        .post(TOKEN_ENDPOINT)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("redirect_uri", config.callback_url.as_str()),
        ])
        .send()
        .await
        .context("token exchange request")?
        .error_for_status()
        .context("token exchange rejected")?
        .json()
        .await
        .context("token exchange response")?;

    let info: UserInfo = http
        .get(USERINFO_ENDPOINT)
        .bearer_auth(&token.access_token)
        .send()
        .await
        .context("userinfo request")?
        .error_for_status()
        .context("userinfo rejected")?
        .json()
        .await
        .context("userinfo response")?;

    debug!(email = %info.email, "google identity resolved");
    Ok(info.email)
}

pub fn state_cookie(nonce: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{STATE_COOKIE}={nonce}; Path=/; HttpOnly; SameSite=Lax; Max-Age=600"
    ))
}

pub fn clear_state_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "portfolio_oauth_state=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
    )
}

pub fn state_from_headers(headers: &HeaderMap) -> Option<String> {
    cookie_from_headers(headers, STATE_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn authorize_url_carries_client_and_state() {
        let state = AppState::fake();
        let url = authorize_url(&state.config.google, "nonce-123").expect("url builds");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("state=nonce-123"));
        // redirect_uri must arrive percent-encoded
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid+email+profile"));
    }

    #[test]
    fn token_and_userinfo_payloads_deserialize() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","token_type":"Bearer","expires_in":3599}"#)
                .expect("token payload");
        assert_eq!(token.access_token, "abc");

        let info: UserInfo =
            serde_json::from_str(r#"{"sub":"1","email":"a@x.com","email_verified":true}"#)
                .expect("userinfo payload");
        assert_eq!(info.email, "a@x.com");
    }

    #[test]
    fn state_cookie_roundtrips_through_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("portfolio_oauth_state=nonce-123"),
        );
        assert_eq!(state_from_headers(&headers), Some("nonce-123".to_string()));
        assert!(clear_state_cookie().to_str().expect("ascii").contains("Max-Age=0"));
    }
}
