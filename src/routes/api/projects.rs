use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::Project;
use crate::error::AppResult;
use crate::extractors::Actor;
use crate::service::projects::{self, NewProject};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
}

async fn list_projects(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(projects::list_projects(&state.db)?))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Project>> {
    Ok(Json(projects::get_project(&state.db, id)?))
}

async fn create_project(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(new): Json<NewProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let project = projects::create_project(&state.db, new, actor)?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
    Json(project): Json<Project>,
) -> AppResult<StatusCode> {
    projects::update_project(&state.db, id, project, actor)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
) -> AppResult<StatusCode> {
    projects::delete_project(&state.db, id, actor)?;
    Ok(StatusCode::NO_CONTENT)
}
