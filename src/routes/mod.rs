pub mod api;
pub mod assets;
pub mod home;
pub mod views;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Full application router: HTML pages at the root, the JSON API under
/// `/api`, the embedded stylesheet under `/assets` and uploaded class images
/// under `/uploads`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .route("/uploads/{*path}", get(assets::serve_upload))
        .merge(views::router())
        .nest("/api", api::router())
        .with_state(state)
}
