use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::password::{self, OAUTH_SENTINEL};
use crate::auth::repo_types::User;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Callers render one generic message
    /// for both, so the client cannot probe for registered accounts.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    /// Google sign-in hit an account with a local password while
    /// auto-linking is disabled.
    #[error("account already exists with a local password")]
    NotLinked,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Local strategy: check a submitted email/password pair against the
/// users table.
pub async fn authenticate_local(
    db: &PgPool,
    email: &str,
    password_input: &str,
) -> Result<User, AuthError> {
    let Some(user) = User::find_by_email(db, email).await? else {
        warn!(email = %email, "login with unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    // OAuth-only accounts carry the sentinel, never a hash; skip Argon2.
    if user.password == OAUTH_SENTINEL {
        warn!(email = %email, "local login against oauth-only account");
        return Err(AuthError::InvalidCredentials);
    }

    let ok = password::verify_password(password_input, &user.password)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    if !ok {
        warn!(email = %email, "login with invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    info!(email = %user.email, "user logged in");
    Ok(user)
}

/// Hash the password and insert the user. The pre-check keeps the common
/// path friendly; the unique index on email is the real arbiter when two
/// registrations race.
pub async fn register_local(
    db: &PgPool,
    email: &str,
    password_input: &str,
) -> Result<User, AuthError> {
    if User::find_by_email(db, email).await?.is_some() {
        warn!(email = %email, "registration with taken email");
        return Err(AuthError::EmailTaken);
    }

    let hash = password::hash_password(password_input).map_err(|e| AuthError::Hash(e.to_string()))?;

    match User::create(db, email, &hash).await {
        Ok(user) => {
            info!(email = %user.email, "user registered");
            Ok(user)
        }
        Err(e) if is_unique_violation(&e) => Err(AuthError::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

/// Google strategy: resolve the provider's verified email claim to a local
/// row, creating a sentinel account on first sign-in. No password is ever
/// checked here.
pub async fn authenticate_google(
    db: &PgPool,
    email: &str,
    auto_link: bool,
) -> Result<User, AuthError> {
    if let Some(user) = User::find_by_email(db, email).await? {
        if user.password != OAUTH_SENTINEL && !auto_link {
            warn!(email = %email, "google sign-in refused for local-password account");
            return Err(AuthError::NotLinked);
        }
        info!(email = %user.email, "user logged in via google");
        return Ok(user);
    }

    match User::create(db, email, OAUTH_SENTINEL).await {
        Ok(user) => {
            info!(email = %user.email, "user created via google");
            Ok(user)
        }
        Err(e) if is_unique_violation(&e) => {
            // Lost a race against a concurrent first sign-in; the row exists now.
            User::find_by_email(db, email)
                .await?
                .ok_or(AuthError::InvalidCredentials)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_junk() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("spaces in@name.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn auth_error_messages_do_not_leak_which_check_failed() {
        // Unknown email and wrong password collapse to one variant.
        let not_found = AuthError::InvalidCredentials;
        let mismatch = AuthError::InvalidCredentials;
        assert_eq!(not_found.to_string(), mismatch.to_string());
    }
}
