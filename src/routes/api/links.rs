use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::ProjectLink;
use crate::error::AppResult;
use crate::extractors::Actor;
use crate::service::links::{self, NewProjectLink};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/project-links", get(list_links).post(create_link))
        .route(
            "/project-links/{id}",
            get(get_link).put(update_link).delete(delete_link),
        )
}

async fn list_links(State(state): State<AppState>) -> AppResult<Json<Vec<ProjectLink>>> {
    Ok(Json(links::list_links(&state.db)?))
}

async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProjectLink>> {
    Ok(Json(links::get_link(&state.db, id)?))
}

async fn create_link(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(new): Json<NewProjectLink>,
) -> AppResult<(StatusCode, Json<ProjectLink>)> {
    let link = links::create_link(&state.db, new, actor)?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn update_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
    Json(link): Json<ProjectLink>,
) -> AppResult<StatusCode> {
    links::update_link(&state.db, id, link, actor)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Actor(actor): Actor,
) -> AppResult<StatusCode> {
    links::delete_link(&state.db, id, actor)?;
    Ok(StatusCode::NO_CONTENT)
}
