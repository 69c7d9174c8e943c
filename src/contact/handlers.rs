use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use tracing::{error, info, instrument};

use crate::auth::services::is_valid_email;
use crate::contact::{dto::ContactForm, repo};
use crate::state::AppState;
use crate::views;

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contact", get(contact_page))
        .route("/submit", post(submit))
}

async fn contact_page() -> Html<String> {
    views::contact_page(None)
}

#[instrument(skip(state, form))]
async fn submit(State(state): State<AppState>, Form(form): Form<ContactForm>) -> Response {
    let name = form.name.trim();
    let email = form.email.trim();
    let comment = form.comment.trim();

    if name.is_empty() {
        return views::contact_page(Some("Name cannot be empty.")).into_response();
    }
    if email.is_empty() {
        return views::contact_page(Some("Email cannot be empty.")).into_response();
    }
    if !is_valid_email(email) {
        return views::contact_page(Some("Email should contain youremail@email.com"))
            .into_response();
    }

    match repo::insert_submission(&state.db, name, email, comment).await {
        Ok(()) => {
            info!(email = %email, "contact form submitted");
            views::submit_page("Contact form submitted successfully!").into_response()
        }
        Err(e) => {
            error!(error = %e, "contact insert failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::submit_page("Something went wrong. Please try again."),
            )
                .into_response()
        }
    }
}
