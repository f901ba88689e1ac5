//! Test app state builder for HTTP-level testing.
//!
//! Creates an `AppState` backed by `InMemoryStore` and `InMemoryCache`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;

use crate::{
    adapters::http::app_state::AppState,
    application::jwt,
    domain::entities::{meeting::Meeting, place::Place, user::User},
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
    test_utils::{InMemoryCache, InMemoryRateLimiter, InMemoryStore, PlainPasswordHasher},
    use_cases::{
        auth::AuthUseCases,
        health::{DependencyProbe, HealthUseCases},
        listing::{KeyValueCache, ListingUseCases},
        meeting::MeetingUseCases,
        membership::MembershipUseCases,
        place::PlaceUseCases,
    },
};

pub const TEST_JWT_SECRET: &str = "test_jwt_secret";

/// `Authorization` header value for the given user.
pub fn bearer_for(user: &User) -> String {
    let token = jwt::issue(
        user.id,
        &user.email,
        &SecretString::new(TEST_JWT_SECRET.into()),
        Duration::hours(1),
    )
    .unwrap();
    format!("Bearer {token}")
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
        access_token_ttl: Duration::hours(1),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        redis_url: "redis://unused".to_string(),
        listing_cache_ttl_secs: 300,
        rate_limit_window_secs: 60,
        rate_limit_per_ip: 1_000,
        trust_proxy: false,
        log_file: String::new(),
    }
}

/// Builder for creating `AppState` with in-memory mocks.
///
/// # Example
///
/// ```ignore
/// let app_state = TestAppStateBuilder::new()
///     .with_user(create_test_user(1, |_| {}))
///     .with_meeting(create_test_meeting(10, 1, |m| m.max_participants = Some(2)))
///     .with_participant(10, 1)
///     .build();
/// ```
pub struct TestAppStateBuilder {
    store: Arc<InMemoryStore>,
    cache: Arc<dyn KeyValueCache>,
    rate_limiter: Arc<dyn RateLimiterTrait>,
    probes: Vec<Arc<dyn DependencyProbe>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            cache: Arc::new(InMemoryCache::new()),
            rate_limiter: Arc::new(InMemoryRateLimiter::permissive()),
            probes: vec![],
        }
    }

    pub fn with_user(self, user: User) -> Self {
        self.store.seed_user(user);
        self
    }

    pub fn with_place(self, place: Place) -> Self {
        self.store.seed_place(place);
        self
    }

    pub fn with_meeting(self, meeting: Meeting) -> Self {
        self.store.seed_meeting(meeting);
        self
    }

    pub fn with_participant(self, meeting_id: i64, user_id: i64) -> Self {
        self.store.seed_participant(meeting_id, user_id);
        self
    }

    /// Share a store with the test so it can assert on persisted state.
    pub fn with_store(mut self, store: Arc<InMemoryStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn KeyValueCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiterTrait>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn DependencyProbe>) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn build(self) -> AppState {
        let store = self.store;

        let listing_use_cases = Arc::new(ListingUseCases::new(
            store.clone(),
            self.cache,
            300,
        ));

        let auth_use_cases = AuthUseCases::new(store.clone(), Arc::new(PlainPasswordHasher));
        let meeting_use_cases = MeetingUseCases::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            listing_use_cases.clone(),
        );
        let membership_use_cases = MembershipUseCases::new(
            store.clone(),
            store.clone(),
            store.clone(),
            listing_use_cases.clone(),
        );
        let place_use_cases = PlaceUseCases::new(store);

        AppState {
            config: Arc::new(test_config()),
            auth_use_cases: Arc::new(auth_use_cases),
            meeting_use_cases: Arc::new(meeting_use_cases),
            membership_use_cases: Arc::new(membership_use_cases),
            listing_use_cases,
            place_use_cases: Arc::new(place_use_cases),
            health_use_cases: Arc::new(HealthUseCases::new(self.probes)),
            rate_limiter: self.rate_limiter,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
