use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::auth::repo_types::User;
use crate::auth::session;
use crate::state::AppState;

/// Identity attached to the request when a valid session cookie resolves to
/// an existing user. Never rejects on missing or stale sessions; those are
/// simply `None`. Only a database failure during resolution is an error.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session::token_from_headers(&state.config.session, &parts.headers)
        else {
            return Ok(MaybeUser(None));
        };

        match session::lookup_session(&state.db, &token).await {
            Ok(user) => Ok(MaybeUser(user)),
            Err(e) => {
                error!(error = %e, "session lookup failed");
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.",
                )
                    .into_response())
            }
        }
    }
}

/// Route guard: requires a resolved session identity and redirects to the
/// login page otherwise. Performs no credential check of its own.
pub struct SessionUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) => Ok(SessionUser(user)),
            MaybeUser(None) => Err(Redirect::to("/login").into_response()),
        }
    }
}
