//! Server-side sessions. The client holds a signed cookie carrying an
//! opaque token; only the SHA-256 hash of the token is stored, alongside
//! the user's email and an expiry.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use subtle::ConstantTimeEq;
use time::{Duration, OffsetDateTime};

use crate::auth::repo_types::User;
use crate::config::SessionConfig;

pub const SESSION_COOKIE: &str = "portfolio_session";

type HmacSha256 = Hmac<Sha256>;

pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Hash a session token so raw values never touch the database.
fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

fn sign(secret: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(token.as_bytes());
    let digest = mac.finalize().into_bytes();
    Base64UrlUnpadded::encode_string(digest.as_slice())
}

/// Cookie payload: the token plus its MAC under the session secret.
fn cookie_value(config: &SessionConfig, token: &str) -> String {
    format!("{token}.{}", sign(&config.secret, token))
}

/// Check the MAC and return the bare token. A bad signature reads as
/// "no cookie", not as an error.
fn verify_cookie_value(config: &SessionConfig, value: &str) -> Option<String> {
    let (token, mac) = value.rsplit_once('.')?;
    let expected = sign(&config.secret, token);
    if bool::from(mac.as_bytes().ct_eq(expected.as_bytes())) {
        Some(token.to_string())
    } else {
        None
    }
}

/// Build the HttpOnly session cookie for a freshly issued token.
pub fn session_cookie(
    config: &SessionConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.ttl_days * 24 * 60 * 60;
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        cookie_value(config, token)
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn clear_session_cookie(config: &SessionConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read a named cookie out of the request headers.
pub(crate) fn cookie_from_headers(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        // Nameless pairs (e.g. a bare "flag") are legal in the wild; skip
        // them rather than giving up on the rest of the header.
        let Some((key, val)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.trim() == name {
            return Some(val.trim().to_string());
        }
    }
    None
}

/// Extract and authenticate the session token from the request headers.
pub fn token_from_headers(config: &SessionConfig, headers: &HeaderMap) -> Option<String> {
    let value = cookie_from_headers(headers, SESSION_COOKIE)?;
    verify_cookie_value(config, &value)
}

/// Persist a new session and return the raw token for the cookie.
pub async fn create_session(
    db: &PgPool,
    email: &str,
    ttl: Duration,
) -> Result<String, sqlx::Error> {
    // Opportunistic cleanup; expired rows are ignored by lookups anyway.
    sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
        .execute(db)
        .await?;

    let token = generate_token();
    let expires_at = OffsetDateTime::now_utc() + ttl;
    sqlx::query(
        r#"
        INSERT INTO sessions (token_hash, user_email, expires_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(hash_token(&token))
    .bind(email)
    .bind(expires_at)
    .execute(db)
    .await?;
    Ok(token)
}

/// Resolve a token back into the full user row. A session whose user no
/// longer resolves, or which has expired, yields `None` rather than an error.
pub async fn lookup_session(db: &PgPool, token: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT users.email, users.password
        FROM sessions
        JOIN users ON users.email = sessions.user_email
        WHERE sessions.token_hash = $1
          AND sessions.expires_at > NOW()
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(db)
    .await
}

/// Logout is idempotent; it's fine if no row is deleted.
pub async fn delete_session(db: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(hash_token(token))
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SessionConfig {
        SessionConfig {
            secret: "test-secret".into(),
            ttl_days: 7,
            cookie_secure: false,
        }
    }

    #[test]
    fn tokens_are_random_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43); // 32 bytes, base64url without padding
        assert!(!a.contains('='));
    }

    #[test]
    fn cookie_value_roundtrips_through_verification() {
        let config = test_config();
        let token = generate_token();
        let value = cookie_value(&config, &token);
        assert_eq!(verify_cookie_value(&config, &value), Some(token));
    }

    #[test]
    fn tampered_cookie_is_rejected() {
        let config = test_config();
        let token = generate_token();
        let value = cookie_value(&config, &token);

        let mut forged = value.clone();
        forged.insert(0, 'x');
        assert_eq!(verify_cookie_value(&config, &forged), None);

        let other = SessionConfig {
            secret: "another-secret".into(),
            ..test_config()
        };
        assert_eq!(verify_cookie_value(&other, &value), None);

        assert_eq!(verify_cookie_value(&config, "no-separator"), None);
    }

    #[test]
    fn session_cookie_carries_expected_attributes() {
        let config = test_config();
        let cookie = session_cookie(&config, "tok").expect("valid header value");
        let cookie = cookie.to_str().expect("ascii");
        assert!(cookie.starts_with("portfolio_session=tok."));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));

        let secure = SessionConfig {
            cookie_secure: true,
            ..test_config()
        };
        let cookie = session_cookie(&secure, "tok").expect("valid header value");
        assert!(cookie.to_str().expect("ascii").ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&test_config()).expect("valid header value");
        let cookie = cookie.to_str().expect("ascii");
        assert!(cookie.starts_with("portfolio_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn token_is_extracted_from_a_multi_pair_cookie_header() {
        let config = test_config();
        let token = generate_token();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!(
                "other=1; portfolio_session={}; theme=dark",
                cookie_value(&config, &token)
            ))
            .expect("ascii"),
        );
        assert_eq!(token_from_headers(&config, &headers), Some(token));
    }

    #[test]
    fn nameless_cookie_pair_does_not_hide_the_session_cookie() {
        let config = test_config();
        let token = generate_token();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!(
                "flagonly; portfolio_session={}",
                cookie_value(&config, &token)
            ))
            .expect("ascii"),
        );
        assert_eq!(token_from_headers(&config, &headers), Some(token));
    }

    #[test]
    fn missing_or_unsigned_cookie_yields_none() {
        let config = test_config();
        let headers = HeaderMap::new();
        assert_eq!(token_from_headers(&config, &headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("portfolio_session=raw-token-without-mac"),
        );
        assert_eq!(token_from_headers(&config, &headers), None);
    }
}
