use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::GymClass;
use crate::error::AppResult;
use crate::extractors::Actor;
use crate::service::classes::{self, NewGymClass};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gym-classes", get(list_classes).post(create_class))
        .route(
            "/gym-classes/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
}

async fn list_classes(State(state): State<AppState>) -> AppResult<Json<Vec<GymClass>>> {
    Ok(Json(classes::list_classes(&state.db)?))
}

async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<GymClass>> {
    Ok(Json(classes::get_class(&state.db, id)?))
}

async fn create_class(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(new): Json<NewGymClass>,
) -> AppResult<(StatusCode, Json<GymClass>)> {
    let class = classes::create_class(&state.db, new, actor)?;
    Ok((StatusCode::CREATED, Json(class)))
}

async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
    Json(class): Json<GymClass>,
) -> AppResult<StatusCode> {
    classes::update_class(&state.db, id, class, actor)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
) -> AppResult<StatusCode> {
    classes::delete_class(&state.db, id, actor)?;
    Ok(StatusCode::NO_CONTENT)
}
