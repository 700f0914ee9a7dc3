use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::ProjectMember;
use crate::error::AppResult;
use crate::extractors::Actor;
use crate::service::members::{self, NewProjectMember};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/project-members", get(list_members).post(create_member))
        .route(
            "/project-members/{id}",
            get(get_member).put(update_member).delete(delete_member),
        )
}

async fn list_members(State(state): State<AppState>) -> AppResult<Json<Vec<ProjectMember>>> {
    Ok(Json(members::list_members(&state.db)?))
}

async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProjectMember>> {
    Ok(Json(members::get_member(&state.db, id)?))
}

async fn create_member(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(new): Json<NewProjectMember>,
) -> AppResult<(StatusCode, Json<ProjectMember>)> {
    let member = members::create_member(&state.db, new, actor)?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
    Json(member): Json<ProjectMember>,
) -> AppResult<StatusCode> {
    members::update_member(&state.db, id, member, actor)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
) -> AppResult<StatusCode> {
    members::delete_member(&state.db, id, actor)?;
    Ok(StatusCode::NO_CONTENT)
}
