use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::User;
use crate::error::AppResult;
use crate::extractors::Actor;
use crate::service::users::{self, NewUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(users::list_users(&state.db)?))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<User>> {
    Ok(Json(users::get_user(&state.db, id)?))
}

async fn create_user(
    State(state): State<AppState>,
    _actor: Actor,
    Json(new): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = users::create_user(&state.db, new)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
    Json(user): Json<User>,
) -> AppResult<StatusCode> {
    users::update_user(&state.db, id, user, actor)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
) -> AppResult<StatusCode> {
    users::delete_user(&state.db, id, actor)?;
    Ok(StatusCode::NO_CONTENT)
}
