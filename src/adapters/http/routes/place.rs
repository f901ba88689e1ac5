use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    adapters::http::{app_state::AppState, identity::current_user},
    app_error::AppResult,
    use_cases::place::NewPlace,
};

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    query: String,
}

#[derive(Deserialize)]
struct CreatePlacePayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    description: Option<String>,
    image_url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_places).post(create_place))
        .route("/search", get(search_places))
}

async fn list_places(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let places = app_state.place_use_cases.list().await?;
    Ok(Json(places))
}

async fn search_places(
    State(app_state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<impl IntoResponse> {
    let places = app_state.place_use_cases.search(&params.query).await?;
    Ok(Json(places))
}

async fn create_place(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<CreatePlacePayload>,
) -> AppResult<impl IntoResponse> {
    current_user(&headers, &jar, &app_state)?;

    let place = app_state
        .place_use_cases
        .create(NewPlace {
            name: payload.name,
            address: payload.address,
            latitude: payload.latitude,
            longitude: payload.longitude,
            description: payload.description,
            image_url: payload.image_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(place)))
}
