use askama::Template;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Form, Router};
use rusqlite::Connection;
use serde::Deserialize;

use super::{id_options, name_of, project_names, str_options, user_names, SelectOption};
use crate::db::models::{ProjectMember, ProjectRole};
use crate::error::{AppError, AppResult};
use crate::extractors::Actor;
use crate::routes::home::Html;
use crate::service::members::{self, NewProjectMember};
use crate::state::AppState;

const ROLES: &[&str] = &["Admin", "Member"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/members", get(index))
        .route("/members/new", get(new_form).post(create))
        .route("/members/{id}", get(detail))
        .route("/members/{id}/edit", get(edit_form).post(update))
        .route("/members/{id}/delete", get(delete_form).post(delete))
}

struct MemberRow {
    project_member_id: i64,
    project: String,
    member: String,
    role: String,
}

fn to_row(
    member: ProjectMember,
    projects: &[(i64, String)],
    users: &[(i64, String)],
) -> MemberRow {
    MemberRow {
        project_member_id: member.project_member_id,
        project: name_of(projects, member.project_id),
        member: name_of(users, member.member_id),
        role: member.role.to_string(),
    }
}

#[derive(Template)]
#[template(path = "pages/members/index.html")]
struct IndexTemplate {
    members: Vec<MemberRow>,
}

#[derive(Template)]
#[template(path = "pages/members/detail.html")]
struct DetailTemplate {
    member: MemberRow,
}

#[derive(Template)]
#[template(path = "pages/members/new.html")]
struct NewTemplate {
    projects: Vec<SelectOption>,
    users: Vec<SelectOption>,
    roles: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/members/edit.html")]
struct EditTemplate {
    project_member_id: i64,
    projects: Vec<SelectOption>,
    users: Vec<SelectOption>,
    roles: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/members/delete.html")]
struct DeleteTemplate {
    member: MemberRow,
}

#[derive(Deserialize)]
struct MemberForm {
    project_id: i64,
    member_id: i64,
    role: String,
}

#[derive(Deserialize)]
struct MemberEditForm {
    project_member_id: i64,
    project_id: i64,
    member_id: i64,
    role: String,
}

fn parse_role(raw: &str) -> AppResult<ProjectRole> {
    raw.parse().map_err(|_| AppError::BadRequest(format!("unknown role: {raw}")))
}

/// Users already in the given project, for reassigning a membership row.
fn project_member_names(conn: &Connection, project_id: i64) -> AppResult<Vec<(i64, String)>> {
    let mut stmt = conn.prepare(
        "SELECT u.user_id, u.first_name || ' ' || u.last_name \
         FROM project_members pm JOIN users u ON u.user_id = pm.member_id \
         WHERE pm.project_id = ?1 ORDER BY u.user_id",
    )?;
    let pairs = stmt
        .query_map([project_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pairs)
}

async fn index(State(state): State<AppState>, _actor: Actor) -> AppResult<Html<IndexTemplate>> {
    let members = members::list_members(&state.db)?;
    let conn = state.db.get()?;
    let projects = project_names(&conn)?;
    let users = user_names(&conn)?;
    let rows = members
        .into_iter()
        .map(|m| to_row(m, &projects, &users))
        .collect();
    Ok(Html(IndexTemplate { members: rows }))
}

async fn detail(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DetailTemplate>> {
    let member = members::get_member(&state.db, id)?;
    let conn = state.db.get()?;
    let projects = project_names(&conn)?;
    let users = user_names(&conn)?;
    Ok(Html(DetailTemplate {
        member: to_row(member, &projects, &users),
    }))
}

async fn new_form(State(state): State<AppState>, _actor: Actor) -> AppResult<Html<NewTemplate>> {
    let conn = state.db.get()?;
    Ok(Html(NewTemplate {
        projects: id_options(&project_names(&conn)?, None),
        users: id_options(&user_names(&conn)?, None),
        roles: str_options(ROLES, Some("Member")),
    }))
}

async fn create(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Form(form): Form<MemberForm>,
) -> AppResult<Redirect> {
    let new = NewProjectMember {
        project_id: form.project_id,
        member_id: form.member_id,
        role: parse_role(&form.role)?,
    };
    members::create_member(&state.db, new, actor)?;
    Ok(Redirect::to("/members"))
}

async fn edit_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<EditTemplate>> {
    let member = members::get_member(&state.db, id)?;
    let conn = state.db.get()?;
    // The user dropdown only offers people already in the row's project.
    let users = project_member_names(&conn, member.project_id)?;
    Ok(Html(EditTemplate {
        project_member_id: member.project_member_id,
        projects: id_options(&project_names(&conn)?, Some(member.project_id)),
        users: id_options(&users, Some(member.member_id)),
        roles: str_options(ROLES, Some(&member.role.to_string())),
    }))
}

async fn update(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Form(form): Form<MemberEditForm>,
) -> AppResult<Redirect> {
    let member = ProjectMember {
        project_member_id: form.project_member_id,
        project_id: form.project_id,
        member_id: form.member_id,
        role: parse_role(&form.role)?,
    };
    members::update_member(&state.db, id, member, actor)?;
    Ok(Redirect::to("/members"))
}

async fn delete_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DeleteTemplate>> {
    let member = members::get_member(&state.db, id)?;
    let conn = state.db.get()?;
    let projects = project_names(&conn)?;
    let users = user_names(&conn)?;
    Ok(Html(DeleteTemplate {
        member: to_row(member, &projects, &users),
    }))
}

async fn delete(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    members::delete_member(&state.db, id, actor)?;
    Ok(Redirect::to("/members"))
}
