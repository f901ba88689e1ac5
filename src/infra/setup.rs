use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    infra::{
        InfraError, config::AppConfig, password::Argon2PasswordHasher, postgres_persistence,
        rate_limit::RedisRateLimiter, redis_cache::RedisCache,
    },
    use_cases::{
        auth::{AuthUseCases, UserRepo},
        health::{DependencyProbe, HealthUseCases},
        listing::{KeyValueCache, ListingUseCases},
        meeting::{MeetingRepo, MeetingUseCases},
        membership::{MembershipUseCases, ParticipantRepo},
        place::{PlaceRepo, PlaceUseCases},
    },
};

pub async fn init_app_state() -> Result<AppState, InfraError> {
    let config = AppConfig::from_env()?;

    let postgres_arc =
        Arc::new(postgres_persistence(&config.database_url, config.db_max_connections).await?);
    let cache = RedisCache::new(&config.redis_url).await?;

    let rate_limiter = Arc::new(RedisRateLimiter::from_manager(
        cache.manager(),
        config.rate_limit_window_secs,
        config.rate_limit_per_ip,
    ));
    let cache_arc = Arc::new(cache);

    let user_repo_arc = postgres_arc.clone() as Arc<dyn UserRepo>;
    let meeting_repo_arc = postgres_arc.clone() as Arc<dyn MeetingRepo>;
    let participant_repo_arc = postgres_arc.clone() as Arc<dyn ParticipantRepo>;
    let place_repo_arc = postgres_arc.clone() as Arc<dyn PlaceRepo>;

    let listing_use_cases = Arc::new(ListingUseCases::new(
        meeting_repo_arc.clone(),
        cache_arc.clone() as Arc<dyn KeyValueCache>,
        config.listing_cache_ttl_secs,
    ));

    let auth_use_cases = AuthUseCases::new(user_repo_arc.clone(), Arc::new(Argon2PasswordHasher));

    let meeting_use_cases = MeetingUseCases::new(
        meeting_repo_arc.clone(),
        participant_repo_arc.clone(),
        place_repo_arc.clone(),
        user_repo_arc.clone(),
        listing_use_cases.clone(),
    );

    let membership_use_cases = MembershipUseCases::new(
        meeting_repo_arc,
        participant_repo_arc,
        user_repo_arc,
        listing_use_cases.clone(),
    );

    let place_use_cases = PlaceUseCases::new(place_repo_arc);

    let health_use_cases = HealthUseCases::new(vec![
        postgres_arc as Arc<dyn DependencyProbe>,
        cache_arc as Arc<dyn DependencyProbe>,
    ]);

    Ok(AppState {
        config: Arc::new(config),
        auth_use_cases: Arc::new(auth_use_cases),
        meeting_use_cases: Arc::new(meeting_use_cases),
        membership_use_cases: Arc::new(membership_use_cases),
        listing_use_cases,
        place_use_cases: Arc::new(place_use_cases),
        health_use_cases: Arc::new(health_use_cases),
        rate_limiter,
    })
}

pub fn init_tracing(log_file: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "meetup_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs). Falls back to console only if the file can't be opened.
    let json_layer = if log_file.is_empty() {
        None
    } else {
        match File::create(log_file).map_err(InfraError::LogFile) {
            Ok(file) => Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(true)
                    .with_span_list(true),
            ),
            Err(e) => {
                eprintln!("{e}, logging to console only");
                None
            }
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
