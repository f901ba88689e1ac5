pub mod app_error_impl;
pub mod app_state;
pub mod extract;
pub mod identity;
pub mod middleware;
pub mod routes;
