pub mod auth;
pub mod health;
pub mod listing;
pub mod meeting;
pub mod membership;
pub mod place;
