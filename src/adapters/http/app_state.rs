use std::sync::Arc;

use crate::{
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
    use_cases::{
        auth::AuthUseCases, health::HealthUseCases, listing::ListingUseCases,
        meeting::MeetingUseCases, membership::MembershipUseCases, place::PlaceUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub meeting_use_cases: Arc<MeetingUseCases>,
    pub membership_use_cases: Arc<MembershipUseCases>,
    pub listing_use_cases: Arc<ListingUseCases>,
    pub place_use_cases: Arc<PlaceUseCases>,
    pub health_use_cases: Arc<HealthUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
