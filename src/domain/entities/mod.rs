pub mod meeting;
pub mod place;
pub mod user;
