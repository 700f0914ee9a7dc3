use askama::Template;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use super::{
    class_names, fmt_datetime, fmt_datetime_input, id_options, name_of, parse_datetime,
    str_options, user_names, SelectOption,
};
use crate::db::models::{ClassRegistration, RegistrationStatus};
use crate::error::{AppError, AppResult};
use crate::extractors::Actor;
use crate::routes::home::Html;
use crate::service::registrations::{self, NewClassRegistration};
use crate::state::AppState;

const STATUSES: &[&str] = &["Pending", "Confirmed", "Canceled"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/registrations", get(index))
        .route("/registrations/new", get(new_form).post(create))
        .route("/registrations/{id}", get(detail))
        .route("/registrations/{id}/edit", get(edit_form).post(update))
        .route("/registrations/{id}/delete", get(delete_form).post(delete))
}

struct RegistrationRow {
    class_registration_id: i64,
    member: String,
    class: String,
    status: String,
    registered_at: String,
}

fn to_row(
    registration: ClassRegistration,
    users: &[(i64, String)],
    classes: &[(i64, String)],
) -> RegistrationRow {
    RegistrationRow {
        class_registration_id: registration.class_registration_id,
        member: name_of(users, registration.member_id),
        class: name_of(classes, registration.class_id),
        status: registration.status.to_string(),
        registered_at: fmt_datetime(&registration.registration_date),
    }
}

#[derive(Template)]
#[template(path = "pages/registrations/index.html")]
struct IndexTemplate {
    registrations: Vec<RegistrationRow>,
}

#[derive(Template)]
#[template(path = "pages/registrations/detail.html")]
struct DetailTemplate {
    registration: RegistrationRow,
}

#[derive(Template)]
#[template(path = "pages/registrations/new.html")]
struct NewTemplate {
    classes: Vec<SelectOption>,
    statuses: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/registrations/edit.html")]
struct EditTemplate {
    class_registration_id: i64,
    users: Vec<SelectOption>,
    classes: Vec<SelectOption>,
    statuses: Vec<SelectOption>,
    registration_date: String,
}

#[derive(Template)]
#[template(path = "pages/registrations/delete.html")]
struct DeleteTemplate {
    registration: RegistrationRow,
}

#[derive(Deserialize)]
struct RegistrationForm {
    class_id: i64,
    status: String,
    registration_date: String,
}

#[derive(Deserialize)]
struct RegistrationEditForm {
    class_registration_id: i64,
    member_id: i64,
    class_id: i64,
    status: String,
    registration_date: String,
}

fn parse_status(raw: &str) -> AppResult<RegistrationStatus> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("unknown status: {raw}")))
}

async fn index(State(state): State<AppState>, _actor: Actor) -> AppResult<Html<IndexTemplate>> {
    let registrations = registrations::list_registrations(&state.db)?;
    let conn = state.db.get()?;
    let users = user_names(&conn)?;
    let classes = class_names(&conn)?;
    let rows = registrations
        .into_iter()
        .map(|r| to_row(r, &users, &classes))
        .collect();
    Ok(Html(IndexTemplate {
        registrations: rows,
    }))
}

async fn detail(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DetailTemplate>> {
    let registration = registrations::get_registration(&state.db, id)?;
    let conn = state.db.get()?;
    let users = user_names(&conn)?;
    let classes = class_names(&conn)?;
    Ok(Html(DetailTemplate {
        registration: to_row(registration, &users, &classes),
    }))
}

/// The form has no member picker; the registration is the actor's own.
async fn new_form(State(state): State<AppState>, _actor: Actor) -> AppResult<Html<NewTemplate>> {
    let conn = state.db.get()?;
    Ok(Html(NewTemplate {
        classes: id_options(&class_names(&conn)?, None),
        statuses: str_options(STATUSES, Some("Pending")),
    }))
}

async fn create(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Form(form): Form<RegistrationForm>,
) -> AppResult<Redirect> {
    let new = NewClassRegistration {
        class_id: form.class_id,
        status: parse_status(&form.status)?,
        registration_date: parse_datetime(&form.registration_date)?,
    };
    registrations::create_registration(&state.db, new, actor)?;
    Ok(Redirect::to("/registrations"))
}

async fn edit_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<EditTemplate>> {
    let registration = registrations::get_registration(&state.db, id)?;
    let conn = state.db.get()?;
    Ok(Html(EditTemplate {
        class_registration_id: registration.class_registration_id,
        users: id_options(&user_names(&conn)?, Some(registration.member_id)),
        classes: id_options(&class_names(&conn)?, Some(registration.class_id)),
        statuses: str_options(STATUSES, Some(&registration.status.to_string())),
        registration_date: fmt_datetime_input(&registration.registration_date),
    }))
}

async fn update(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    Form(form): Form<RegistrationEditForm>,
) -> AppResult<Redirect> {
    let registration = ClassRegistration {
        class_registration_id: form.class_registration_id,
        member_id: form.member_id,
        class_id: form.class_id,
        status: parse_status(&form.status)?,
        registration_date: parse_datetime(&form.registration_date)?,
    };
    registrations::update_registration(&state.db, id, registration, actor)?;
    Ok(Redirect::to("/registrations"))
}

async fn delete_form(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DeleteTemplate>> {
    let registration = registrations::get_registration(&state.db, id)?;
    let conn = state.db.get()?;
    let users = user_names(&conn)?;
    let classes = class_names(&conn)?;
    Ok(Html(DeleteTemplate {
        registration: to_row(registration, &users, &classes),
    }))
}

async fn delete(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    registrations::delete_registration(&state.db, id, actor)?;
    Ok(Redirect::to("/registrations"))
}
