use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, identity::ACCESS_TOKEN_COOKIE},
    app_error::AppResult,
    application::jwt,
    domain::entities::user::User,
    use_cases::auth::{RegisterInput, UserProfile},
};

#[derive(Deserialize)]
struct RegisterPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    name: String,
    phone: Option<String>,
    interests: Option<String>,
}

#[derive(Deserialize)]
struct LoginPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct AuthResponse {
    token: String,
    user: UserProfile,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

async fn register(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<impl IntoResponse> {
    let user = app_state
        .auth_use_cases
        .register(RegisterInput {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            phone: payload.phone,
            interests: payload.interests,
        })
        .await?;

    let (jar, body) = start_session(&app_state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, Json(body)))
}

async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let user = app_state
        .auth_use_cases
        .login(&payload.email, &payload.password)
        .await?;

    let (jar, body) = start_session(&app_state, jar, &user)?;
    Ok((StatusCode::OK, jar, Json(body)))
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    let access = Cookie::build((ACCESS_TOKEN_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();
    (StatusCode::OK, jar.add(access))
}

/// Issues an access token, returned in the body and as an HttpOnly cookie.
fn start_session(
    app_state: &AppState,
    jar: CookieJar,
    user: &User,
) -> AppResult<(CookieJar, AuthResponse)> {
    let token = jwt::issue(
        user.id,
        &user.email,
        &app_state.config.jwt_secret,
        app_state.config.access_token_ttl,
    )?;

    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(app_state.config.access_token_ttl)
        .build();

    Ok((
        jar.add(cookie),
        AuthResponse {
            token,
            user: UserProfile::from(user),
        },
    ))
}
