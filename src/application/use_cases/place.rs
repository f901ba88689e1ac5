use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::{
        is_valid_latitude, is_valid_longitude, normalize_optional, require_text,
    },
    domain::entities::place::Place,
};

pub const SEARCH_LIMIT: i64 = 10;

#[async_trait]
pub trait PlaceRepo: Send + Sync {
    /// All places, newest first.
    async fn list(&self) -> AppResult<Vec<Place>>;
    /// Case-insensitive substring match on name or address.
    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Place>>;
    async fn create(&self, place: NewPlace) -> AppResult<Place>;
    async fn exists(&self, place_id: i64) -> AppResult<bool>;
}

#[derive(Debug, Clone, Default)]
pub struct NewPlace {
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct PlaceUseCases {
    repo: Arc<dyn PlaceRepo>,
}

impl PlaceUseCases {
    pub fn new(repo: Arc<dyn PlaceRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<Place>> {
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> AppResult<Vec<Place>> {
        let term = query.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.search(term, SEARCH_LIMIT).await
    }

    #[instrument(skip(self, place), fields(name = %place.name))]
    pub async fn create(&self, place: NewPlace) -> AppResult<Place> {
        let name = require_text("Name", &place.name, 255).map_err(AppError::InvalidInput)?;
        let address = require_text("Address", &place.address, 1000).map_err(AppError::InvalidInput)?;

        match (place.latitude, place.longitude) {
            (Some(lat), Some(lon)) => {
                if !is_valid_latitude(lat) || !is_valid_longitude(lon) {
                    return Err(AppError::InvalidInput("Coordinates are out of range".into()));
                }
            }
            (None, None) => {}
            _ => {
                return Err(AppError::InvalidInput(
                    "Latitude and longitude must be given together".into(),
                ));
            }
        }

        let place = self
            .repo
            .create(NewPlace {
                name,
                address,
                description: normalize_optional(place.description.as_deref()),
                image_url: normalize_optional(place.image_url.as_deref()),
                ..place
            })
            .await?;

        tracing::info!(place_id = place.id, "Place created");
        Ok(place)
    }
}
