use axum::{response::Html, routing::get, Router};

use crate::auth::extractors::MaybeUser;
use crate::state::AppState;
use crate::views;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index(MaybeUser(user): MaybeUser) -> Html<String> {
    views::index_page(user.as_ref().map(|u| u.email.as_str()))
}
