//! JSON API, one router per entity under `/api`.
//!
//! Reads are anonymous; every mutation resolves the acting user from the
//! `x-user-id` header first. The whole API is wrapped in a permissive CORS
//! layer so external clients can call it.

pub mod classes;
pub mod links;
pub mod members;
pub mod projects;
pub mod registrations;
pub mod users;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(projects::router())
        .merge(members::router())
        .merge(links::router())
        .merge(classes::router())
        .merge(registrations::router())
        .layer(CorsLayer::permissive())
}
