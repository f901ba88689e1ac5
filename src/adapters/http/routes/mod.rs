pub mod auth;
pub mod meeting;
pub mod place;
pub mod user;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", user::router())
        .nest("/meetings", meeting::router())
        .nest("/places", place::router())
}
