use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    adapters::http::{app_state::AppState, extract::IdPath, identity::current_user},
    app_error::AppResult,
    use_cases::meeting::CreateMeetingInput,
};

/// Organizer comes from the token; any organizer id in the body is ignored.
#[derive(Deserialize)]
struct CreateMeetingPayload {
    #[serde(default)]
    title: String,
    description: Option<String>,
    place_id: Option<i64>,
    category: Option<String>,
    budget: Option<f64>,
    start_time: Option<DateTime<Utc>>,
    duration_minutes: Option<i64>,
    end_time: Option<DateTime<Utc>>,
    max_participants: Option<i32>,
}

#[derive(Deserialize)]
struct StatusPayload {
    #[serde(default)]
    status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_meetings).post(create_meeting))
        .route("/{id}", get(get_meeting).delete(delete_meeting))
        .route("/{id}/status", put(update_status))
        .route("/{id}/join", post(join_meeting))
        .route("/{id}/leave", post(leave_meeting))
}

async fn list_meetings(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let listing = app_state.listing_use_cases.get_listing().await?;
    Ok(Json(listing))
}

async fn create_meeting(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<CreateMeetingPayload>,
) -> AppResult<impl IntoResponse> {
    let auth = current_user(&headers, &jar, &app_state)?;

    let view = app_state
        .meeting_use_cases
        .create(
            auth.id,
            CreateMeetingInput {
                title: payload.title,
                description: payload.description,
                place_id: payload.place_id,
                category: payload.category,
                budget: payload.budget,
                start_time: payload.start_time.map(|t| t.naive_utc()),
                duration_minutes: payload.duration_minutes,
                end_time: payload.end_time.map(|t| t.naive_utc()),
                max_participants: payload.max_participants,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_meeting(
    State(app_state): State<AppState>,
    IdPath(meeting_id): IdPath,
) -> AppResult<impl IntoResponse> {
    let view = app_state.meeting_use_cases.get(meeting_id).await?;
    Ok(Json(view))
}

async fn delete_meeting(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    IdPath(meeting_id): IdPath,
) -> AppResult<StatusCode> {
    let auth = current_user(&headers, &jar, &app_state)?;
    app_state
        .meeting_use_cases
        .delete(auth.id, meeting_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_status(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    IdPath(meeting_id): IdPath,
    Json(payload): Json<StatusPayload>,
) -> AppResult<impl IntoResponse> {
    let auth = current_user(&headers, &jar, &app_state)?;
    let view = app_state
        .meeting_use_cases
        .update_status(auth.id, meeting_id, &payload.status)
        .await?;
    Ok(Json(view))
}

async fn join_meeting(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    IdPath(meeting_id): IdPath,
) -> AppResult<impl IntoResponse> {
    let auth = current_user(&headers, &jar, &app_state)?;
    let result = app_state
        .membership_use_cases
        .join(meeting_id, auth.id)
        .await?;
    Ok(Json(result))
}

async fn leave_meeting(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    IdPath(meeting_id): IdPath,
) -> AppResult<impl IntoResponse> {
    let auth = current_user(&headers, &jar, &app_state)?;
    let result = app_state
        .membership_use_cases
        .leave(meeting_id, auth.id)
        .await?;
    Ok(Json(result))
}
