use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use crate::{
    app_error::AppResult,
    use_cases::meeting::{MeetingRepo, MeetingSummary},
};

/// Cache key holding the serialized active-meetings listing.
pub const ACTIVE_MEETINGS_CACHE_KEY: &str = "meetings:all";

#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> AppResult<()>;
    async fn delete(&self, key: &str) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    Cache,
    #[serde(rename = "database")]
    Store,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub source: ListingSource,
    pub data: Vec<MeetingSummary>,
}

/// Read-through cache over the active meetings listing.
///
/// The cache is advisory: read failures fall back to the store and write
/// failures are logged, never surfaced to the caller.
pub struct ListingUseCases {
    repo: Arc<dyn MeetingRepo>,
    cache: Arc<dyn KeyValueCache>,
    ttl_secs: u64,
}

impl ListingUseCases {
    pub fn new(repo: Arc<dyn MeetingRepo>, cache: Arc<dyn KeyValueCache>, ttl_secs: u64) -> Self {
        Self {
            repo,
            cache,
            ttl_secs,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_listing(&self) -> AppResult<Listing> {
        match self.cache.get(ACTIVE_MEETINGS_CACHE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<MeetingSummary>>(&raw) {
                Ok(data) => {
                    return Ok(Listing {
                        source: ListingSource::Cache,
                        data,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable cached listing");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Listing cache read failed, falling back to store");
            }
        }

        let data = self.repo.list_active().await?;

        match serde_json::to_string(&data) {
            Ok(raw) => {
                if let Err(e) = self
                    .cache
                    .set_ex(ACTIVE_MEETINGS_CACHE_KEY, &raw, self.ttl_secs)
                    .await
                {
                    tracing::warn!(error = %e, "Failed to populate listing cache");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize listing for cache"),
        }

        Ok(Listing {
            source: ListingSource::Store,
            data,
        })
    }

    /// Drops the cached listing. Failures are logged and swallowed.
    #[instrument(skip(self))]
    pub async fn invalidate(&self) {
        if let Err(e) = self.cache.delete(ACTIVE_MEETINGS_CACHE_KEY).await {
            tracing::warn!(error = %e, key = ACTIVE_MEETINGS_CACHE_KEY, "Failed to invalidate listing cache");
        }
    }
}
