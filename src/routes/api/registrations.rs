use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::ClassRegistration;
use crate::error::AppResult;
use crate::extractors::Actor;
use crate::service::registrations::{self, NewClassRegistration};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/class-registrations",
            get(list_registrations).post(create_registration),
        )
        .route(
            "/class-registrations/{id}",
            get(get_registration)
                .put(update_registration)
                .delete(delete_registration),
        )
}

async fn list_registrations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ClassRegistration>>> {
    Ok(Json(registrations::list_registrations(&state.db)?))
}

async fn get_registration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ClassRegistration>> {
    Ok(Json(registrations::get_registration(&state.db, id)?))
}

async fn create_registration(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(new): Json<NewClassRegistration>,
) -> AppResult<(StatusCode, Json<ClassRegistration>)> {
    let registration = registrations::create_registration(&state.db, new, actor)?;
    Ok((StatusCode::CREATED, Json(registration)))
}

async fn update_registration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
    Json(registration): Json<ClassRegistration>,
) -> AppResult<StatusCode> {
    registrations::update_registration(&state.db, id, registration, actor)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_registration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
) -> AppResult<StatusCode> {
    registrations::delete_registration(&state.db, id, actor)?;
    Ok(StatusCode::NO_CONTENT)
}
