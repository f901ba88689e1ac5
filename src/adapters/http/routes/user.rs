use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    adapters::http::{app_state::AppState, extract::IdPath, identity::current_user},
    app_error::AppResult,
    use_cases::auth::{ProfileUpdate, UserProfile},
};

#[derive(Deserialize)]
struct UpdateProfilePayload {
    name: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/{id}", get(get_profile))
        .route("/{id}/meetings/created", get(created_meetings))
        .route("/{id}/meetings/joined", get(joined_meetings))
}

async fn get_me(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let auth = current_user(&headers, &jar, &app_state)?;
    let user = app_state.auth_use_cases.me(auth.id).await?;
    Ok(Json(UserProfile::from(&user)))
}

async fn update_me(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<UpdateProfilePayload>,
) -> AppResult<impl IntoResponse> {
    let auth = current_user(&headers, &jar, &app_state)?;
    let user = app_state
        .auth_use_cases
        .update_profile(
            auth.id,
            ProfileUpdate {
                name: payload.name,
                bio: payload.bio,
                avatar_url: payload.avatar_url,
            },
        )
        .await?;
    Ok(Json(UserProfile::from(&user)))
}

async fn get_profile(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<impl IntoResponse> {
    let profile = app_state.auth_use_cases.public_profile(user_id).await?;
    Ok(Json(profile))
}

async fn created_meetings(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<impl IntoResponse> {
    let meetings = app_state.meeting_use_cases.list_created(user_id).await?;
    Ok(Json(meetings))
}

async fn joined_meetings(
    State(app_state): State<AppState>,
    IdPath(user_id): IdPath,
) -> AppResult<impl IntoResponse> {
    let meetings = app_state.meeting_use_cases.list_joined(user_id).await?;
    Ok(Json(meetings))
}
