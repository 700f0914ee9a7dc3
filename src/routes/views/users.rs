use askama::Template;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use super::{str_options, SelectOption};
use crate::db::models::{GlobalRole, User};
use crate::error::{AppError, AppResult};
use crate::extractors::Actor;
use crate::routes::home::Html;
use crate::service::users::{self, NewUser};
use crate::state::AppState;

const ROLES: &[&str] = &["Member", "Admin", "Trainer"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(index))
        .route("/users/new", get(new_form).post(create))
        .route("/users/{id}", get(detail))
        .route("/users/{id}/edit", get(edit_form).post(update))
        .route("/users/{id}/delete", get(delete_form).post(delete))
}

#[derive(Template)]
#[template(path = "pages/users/index.html")]
struct IndexTemplate {
    users: Vec<User>,
}

#[derive(Template)]
#[template(path = "pages/users/detail.html")]
struct DetailTemplate {
    user: User,
}

#[derive(Template)]
#[template(path = "pages/users/new.html")]
struct NewTemplate {
    roles: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/users/edit.html")]
struct EditTemplate {
    user: User,
    roles: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/users/delete.html")]
struct DeleteTemplate {
    user: User,
}

#[derive(Deserialize)]
struct UserForm {
    first_name: String,
    last_name: String,
    email: String,
    role: String,
}

#[derive(Deserialize)]
struct UserEditForm {
    user_id: i64,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
}

fn parse_role(raw: &str) -> AppResult<GlobalRole> {
    raw.parse().map_err(|_| AppError::BadRequest(format!("unknown role: {raw}")))
}

async fn index(State(state): State<AppState>, _actor: Actor) -> AppResult<Html<IndexTemplate>> {
    let users = users::list_users(&state.db)?;
    Ok(Html(IndexTemplate { users }))
}

async fn detail(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DetailTemplate>> {
    let user = users::get_user(&state.db, id)?;
    Ok(Html(DetailTemplate { user }))
}

async fn new_form(_actor: Actor) -> Html<NewTemplate> {
    Html(NewTemplate {
        roles: str_options(ROLES, Some("Member")),
    })
}

async fn create(
    State(state): State<AppState>,
    _actor: Actor,
    Form(form): Form<UserForm>,
) -> AppResult<Redirect> {
    let new = NewUser {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        role: parse_role(&form.role)?,
    };
    users::create_user(&state.db, new)?;
    Ok(Redirect::to("/users"))
}

async fn edit_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<EditTemplate>> {
    let user = users::get_user(&state.db, id)?;
    let roles = str_options(ROLES, Some(&user.role.to_string()));
    Ok(Html(EditTemplate { user, roles }))
}

async fn update(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Form(form): Form<UserEditForm>,
) -> AppResult<Redirect> {
    let user = User {
        user_id: form.user_id,
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        role: parse_role(&form.role)?,
    };
    users::update_user(&state.db, id, user, actor)?;
    Ok(Redirect::to("/users"))
}

async fn delete_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DeleteTemplate>> {
    let user = users::get_user(&state.db, id)?;
    Ok(Html(DeleteTemplate { user }))
}

async fn delete(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    users::delete_user(&state.db, id, actor)?;
    Ok(Redirect::to("/users"))
}
