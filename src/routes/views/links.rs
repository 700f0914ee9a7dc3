use askama::Template;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use super::{id_options, name_of, project_names, SelectOption};
use crate::db::models::ProjectLink;
use crate::error::AppResult;
use crate::extractors::Actor;
use crate::routes::home::Html;
use crate::service::links::{self, NewProjectLink};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/links", get(index))
        .route("/links/new", get(new_form).post(create))
        .route("/links/{id}", get(detail))
        .route("/links/{id}/edit", get(edit_form).post(update))
        .route("/links/{id}/delete", get(delete_form).post(delete))
}

struct LinkRow {
    project_link_id: i64,
    project: String,
    url: String,
    description: String,
    category: String,
}

fn to_row(link: ProjectLink, projects: &[(i64, String)]) -> LinkRow {
    LinkRow {
        project_link_id: link.project_link_id,
        project: name_of(projects, link.project_id),
        url: link.url,
        description: link.description,
        category: link.category,
    }
}

#[derive(Template)]
#[template(path = "pages/links/index.html")]
struct IndexTemplate {
    links: Vec<LinkRow>,
}

#[derive(Template)]
#[template(path = "pages/links/detail.html")]
struct DetailTemplate {
    link: LinkRow,
}

#[derive(Template)]
#[template(path = "pages/links/new.html")]
struct NewTemplate {
    projects: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/links/edit.html")]
struct EditTemplate {
    link: ProjectLink,
    projects: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/links/delete.html")]
struct DeleteTemplate {
    link: LinkRow,
}

#[derive(Deserialize)]
struct LinkForm {
    project_id: i64,
    url: String,
    description: String,
    category: String,
}

#[derive(Deserialize)]
struct LinkEditForm {
    project_link_id: i64,
    project_id: i64,
    url: String,
    description: String,
    category: String,
}

async fn index(State(state): State<AppState>, _actor: Actor) -> AppResult<Html<IndexTemplate>> {
    let links = links::list_links(&state.db)?;
    let projects = project_names(&*state.db.get()?)?;
    let rows = links.into_iter().map(|l| to_row(l, &projects)).collect();
    Ok(Html(IndexTemplate { links: rows }))
}

async fn detail(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DetailTemplate>> {
    let link = links::get_link(&state.db, id)?;
    let projects = project_names(&*state.db.get()?)?;
    Ok(Html(DetailTemplate {
        link: to_row(link, &projects),
    }))
}

async fn new_form(State(state): State<AppState>, _actor: Actor) -> AppResult<Html<NewTemplate>> {
    let projects = project_names(&*state.db.get()?)?;
    Ok(Html(NewTemplate {
        projects: id_options(&projects, None),
    }))
}

async fn create(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Form(form): Form<LinkForm>,
) -> AppResult<Redirect> {
    let new = NewProjectLink {
        project_id: form.project_id,
        url: form.url,
        description: form.description,
        category: form.category,
    };
    links::create_link(&state.db, new, actor)?;
    Ok(Redirect::to("/links"))
}

async fn edit_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<EditTemplate>> {
    let link = links::get_link(&state.db, id)?;
    let projects = project_names(&*state.db.get()?)?;
    let options = id_options(&projects, Some(link.project_id));
    Ok(Html(EditTemplate {
        link,
        projects: options,
    }))
}

async fn update(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Form(form): Form<LinkEditForm>,
) -> AppResult<Redirect> {
    // Whoever added the link stays on record.
    let stored = links::get_link(&state.db, id)?;
    let link = ProjectLink {
        project_link_id: form.project_link_id,
        project_id: form.project_id,
        url: form.url,
        description: form.description,
        category: form.category,
        ..stored
    };
    links::update_link(&state.db, id, link, actor)?;
    Ok(Redirect::to("/links"))
}

async fn delete_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DeleteTemplate>> {
    let link = links::get_link(&state.db, id)?;
    let projects = project_names(&*state.db.get()?)?;
    Ok(Html(DeleteTemplate {
        link: to_row(link, &projects),
    }))
}

async fn delete(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    links::delete_link(&state.db, id, actor)?;
    Ok(Redirect::to("/links"))
}
