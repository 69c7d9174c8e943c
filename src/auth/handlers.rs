use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use time::Duration;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, OAuthCallback, RegisterForm},
        extractors::SessionUser,
        oauth,
        services::{self, AuthError},
        session,
    },
    state::AppState,
    views,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/auth/google", get(google_start))
        .route("/auth/google/callback", get(google_callback))
        .route("/secrets", get(secrets))
        .route("/logout", get(logout))
}

async fn login_page() -> Html<String> {
    views::login_page(None)
}

async fn register_page() -> Html<String> {
    views::register_page(None)
}

/// Issue a session for an authenticated user and return its cookie.
async fn establish_session(state: &AppState, email: &str) -> anyhow::Result<HeaderValue> {
    let ttl = Duration::days(state.config.session.ttl_days);
    let token = session::create_session(&state.db, email, ttl).await?;
    let cookie = session::session_cookie(&state.config.session, &token)?;
    Ok(cookie)
}

fn redirect_with_cookie(cookie: HeaderValue, to: &str) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    (headers, Redirect::to(to)).into_response()
}

#[instrument(skip(state, form))]
async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match services::authenticate_local(&state.db, form.username.trim(), &form.password).await {
        Ok(user) => match establish_session(&state, &user.email).await {
            Ok(cookie) => redirect_with_cookie(cookie, "/secrets"),
            Err(e) => {
                error!(error = %e, email = %user.email, "session create failed after login");
                views::login_page(Some("Login failed. Please try again.")).into_response()
            }
        },
        Err(AuthError::InvalidCredentials) => {
            views::login_page(Some("Invalid email or password.")).into_response()
        }
        Err(e) => {
            error!(error = %e, "login failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::login_page(Some("An error occurred. Please try again.")),
            )
                .into_response()
        }
    }
}

#[instrument(skip(state, form))]
async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let email = form.username.trim();
    if email.is_empty() || form.password.is_empty() {
        return views::register_page(Some("Email and password are required.")).into_response();
    }

    match services::register_local(&state.db, email, &form.password).await {
        Ok(user) => match establish_session(&state, &user.email).await {
            Ok(cookie) => redirect_with_cookie(cookie, "/secrets"),
            Err(e) => {
                // The insert stands; only the auto-login failed.
                error!(error = %e, email = %user.email, "session create failed after registration");
                views::register_page(Some(
                    "Registration succeeded but login failed. Please log in manually.",
                ))
                .into_response()
            }
        },
        Err(AuthError::EmailTaken) => {
            views::register_page(Some("Email is already registered. Please log in."))
                .into_response()
        }
        Err(AuthError::Hash(e)) => {
            error!(error = %e, "hash_password failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::register_page(Some("Error hashing password. Please try again.")),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "register failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::register_page(Some("An error occurred. Please try again.")),
            )
                .into_response()
        }
    }
}

#[instrument(skip(state))]
async fn google_start(State(state): State<AppState>) -> Response {
    let nonce = session::generate_token();
    let url = match oauth::authorize_url(&state.config.google, &nonce) {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "authorize url build failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::login_page(Some("An error occurred. Please try again.")),
            )
                .into_response();
        }
    };
    match oauth::state_cookie(&nonce) {
        Ok(cookie) => redirect_with_cookie(cookie, &url),
        Err(e) => {
            error!(error = %e, "state cookie build failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::login_page(Some("An error occurred. Please try again.")),
            )
                .into_response()
        }
    }
}

#[instrument(skip(state, query, headers))]
async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallback>,
    headers: HeaderMap,
) -> Response {
    // The state nonce is single-use regardless of the outcome.
    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, oauth::clear_state_cookie());
    let to_login = |headers: HeaderMap| (headers, Redirect::to("/login")).into_response();

    let (Some(code), Some(echoed)) = (query.code, query.state) else {
        warn!("google callback missing code or state");
        return to_login(response_headers);
    };
    if oauth::state_from_headers(&headers).as_deref() != Some(echoed.as_str()) {
        warn!("google callback state mismatch");
        return to_login(response_headers);
    }

    let email = match oauth::fetch_email(&state.http, &state.config.google, &code).await {
        Ok(email) => email,
        Err(e) => {
            error!(error = %e, "google code exchange failed");
            return to_login(response_headers);
        }
    };

    match services::authenticate_google(&state.db, &email, state.config.google.auto_link).await {
        Ok(user) => match establish_session(&state, &user.email).await {
            Ok(cookie) => {
                response_headers.append(SET_COOKIE, cookie);
                (response_headers, Redirect::to("/secrets")).into_response()
            }
            Err(e) => {
                error!(error = %e, email = %user.email, "session create failed after google login");
                to_login(response_headers)
            }
        },
        Err(AuthError::NotLinked) => {
            warn!(email = %email, "google login refused; local account exists");
            to_login(response_headers)
        }
        Err(e) => {
            error!(error = %e, "google login failed");
            to_login(response_headers)
        }
    }
}

/// The one guarded route: a plain redirect to the configured external link.
#[instrument(skip(state, user))]
async fn secrets(State(state): State<AppState>, SessionUser(user): SessionUser) -> Redirect {
    info!(email = %user.email, "guarded redirect served");
    Redirect::to(&state.config.secret_link)
}

#[instrument(skip(state, headers))]
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session::token_from_headers(&state.config.session, &headers) {
        if let Err(e) = session::delete_session(&state.db, &token).await {
            error!(error = %e, "session delete failed");
        }
    }

    // Always clear the cookie, even if the session record was missing.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = session::clear_session_cookie(&state.config.session) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (response_headers, Redirect::to("/login")).into_response()
}
