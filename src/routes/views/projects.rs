use askama::Template;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use super::{name_of, user_names};
use crate::db::models::Project;
use crate::error::AppResult;
use crate::extractors::Actor;
use crate::routes::home::Html;
use crate::service::projects::{self, NewProject};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(index))
        .route("/projects/new", get(new_form).post(create))
        .route("/projects/{id}", get(detail))
        .route("/projects/{id}/edit", get(edit_form).post(update))
        .route("/projects/{id}/delete", get(delete_form).post(delete))
}

struct ProjectRow {
    project_id: i64,
    name: String,
    description: String,
    creator: String,
}

fn to_row(project: Project, users: &[(i64, String)]) -> ProjectRow {
    ProjectRow {
        project_id: project.project_id,
        name: project.name,
        description: project.description,
        creator: name_of(users, project.creator_id),
    }
}

#[derive(Template)]
#[template(path = "pages/projects/index.html")]
struct IndexTemplate {
    projects: Vec<ProjectRow>,
}

#[derive(Template)]
#[template(path = "pages/projects/detail.html")]
struct DetailTemplate {
    project: ProjectRow,
}

#[derive(Template)]
#[template(path = "pages/projects/new.html")]
struct NewTemplate;

#[derive(Template)]
#[template(path = "pages/projects/edit.html")]
struct EditTemplate {
    project: ProjectRow,
}

#[derive(Template)]
#[template(path = "pages/projects/delete.html")]
struct DeleteTemplate {
    project: ProjectRow,
}

#[derive(Deserialize)]
struct ProjectForm {
    name: String,
    description: String,
}

#[derive(Deserialize)]
struct ProjectEditForm {
    project_id: i64,
    name: String,
    description: String,
}

async fn index(State(state): State<AppState>, _actor: Actor) -> AppResult<Html<IndexTemplate>> {
    let projects = projects::list_projects(&state.db)?;
    let users = user_names(&*state.db.get()?)?;
    let rows = projects.into_iter().map(|p| to_row(p, &users)).collect();
    Ok(Html(IndexTemplate { projects: rows }))
}

async fn detail(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DetailTemplate>> {
    let project = projects::get_project(&state.db, id)?;
    let users = user_names(&*state.db.get()?)?;
    Ok(Html(DetailTemplate {
        project: to_row(project, &users),
    }))
}

async fn new_form(_actor: Actor) -> Html<NewTemplate> {
    Html(NewTemplate)
}

/// The form has no creator picker; the project is created for the actor,
/// who also becomes its Admin member.
async fn create(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Form(form): Form<ProjectForm>,
) -> AppResult<Redirect> {
    let new = NewProject {
        name: form.name,
        description: form.description,
    };
    projects::create_project(&state.db, new, actor)?;
    Ok(Redirect::to("/projects"))
}

async fn edit_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<EditTemplate>> {
    let project = projects::get_project(&state.db, id)?;
    let users = user_names(&*state.db.get()?)?;
    Ok(Html(EditTemplate {
        project: to_row(project, &users),
    }))
}

async fn update(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Form(form): Form<ProjectEditForm>,
) -> AppResult<Redirect> {
    // The creator is never edited; carry the stored value through.
    let stored = projects::get_project(&state.db, id)?;
    let project = Project {
        project_id: form.project_id,
        name: form.name,
        description: form.description,
        ..stored
    };
    projects::update_project(&state.db, id, project, actor)?;
    Ok(Redirect::to("/projects"))
}

async fn delete_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DeleteTemplate>> {
    let project = projects::get_project(&state.db, id)?;
    let users = user_names(&*state.db.get()?)?;
    Ok(Html(DeleteTemplate {
        project: to_row(project, &users),
    }))
}

async fn delete(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    projects::delete_project(&state.db, id, actor)?;
    Ok(Redirect::to("/projects"))
}
