use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::extract::CookieJar;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::jwt,
};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Identity resolved from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

/// Resolves the caller from `Authorization: Bearer <token>`, falling back to
/// the access token cookie. The header wins when both are present.
pub fn current_user(headers: &HeaderMap, jar: &CookieJar, app_state: &AppState) -> AppResult<AuthUser> {
    let token = bearer_token(headers)
        .or_else(|| jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_owned()))
        .ok_or(AppError::InvalidCredentials)?;

    let claims = jwt::verify(&token, &app_state.config.jwt_secret)?;
    Ok(AuthUser {
        id: claims.user_id()?,
        email: claims.email,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
