//! Server-rendered HTML surface.
//!
//! One submodule per entity, each offering index, detail, create, edit and
//! delete-confirm pages. Every page requires an actor; form posts go through
//! the same service layer as the JSON API and redirect back to the entity
//! index. Display names shown in tables are looked up here, not stored.

pub mod classes;
pub mod links;
pub mod members;
pub mod projects;
pub mod registrations;
pub mod users;

use axum::Router;
use chrono::{NaiveDateTime, NaiveTime};
use rusqlite::Connection;

use crate::authz;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(projects::router())
        .merge(members::router())
        .merge(links::router())
        .merge(classes::router())
        .merge(registrations::router())
}

/// The gym class pages are for global Admins only; everyone else gets 403.
pub(crate) fn ensure_admin(conn: &Connection, actor: i64) -> AppResult<()> {
    if authz::is_admin(conn, actor)? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// One `<option>` in a form dropdown, preformatted so templates stay dumb.
pub(crate) struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub(crate) fn id_options(pairs: &[(i64, String)], selected: Option<i64>) -> Vec<SelectOption> {
    pairs
        .iter()
        .map(|(id, label)| SelectOption {
            value: id.to_string(),
            label: label.clone(),
            selected: selected == Some(*id),
        })
        .collect()
}

pub(crate) fn str_options(values: &[&str], selected: Option<&str>) -> Vec<SelectOption> {
    values
        .iter()
        .map(|value| SelectOption {
            value: value.to_string(),
            label: value.to_string(),
            selected: selected == Some(*value),
        })
        .collect()
}

// --- Display-name lookups (the dropdowns and tables share these) ---

fn name_pairs(conn: &Connection, sql: &str) -> AppResult<Vec<(i64, String)>> {
    let mut stmt = conn.prepare(sql)?;
    let pairs = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pairs)
}

pub(crate) fn user_names(conn: &Connection) -> AppResult<Vec<(i64, String)>> {
    name_pairs(
        conn,
        "SELECT user_id, first_name || ' ' || last_name FROM users ORDER BY user_id",
    )
}

pub(crate) fn trainer_names(conn: &Connection) -> AppResult<Vec<(i64, String)>> {
    name_pairs(
        conn,
        "SELECT user_id, first_name || ' ' || last_name FROM users \
         WHERE role = 'Trainer' ORDER BY user_id",
    )
}

pub(crate) fn project_names(conn: &Connection) -> AppResult<Vec<(i64, String)>> {
    name_pairs(conn, "SELECT project_id, name FROM projects ORDER BY project_id")
}

pub(crate) fn class_names(conn: &Connection) -> AppResult<Vec<(i64, String)>> {
    name_pairs(
        conn,
        "SELECT gym_class_id, name FROM gym_classes ORDER BY gym_class_id",
    )
}

/// Resolves an id against a name list; unknown ids render as `#id`.
pub(crate) fn name_of(pairs: &[(i64, String)], id: i64) -> String {
    pairs
        .iter()
        .find(|(candidate, _)| *candidate == id)
        .map(|(_, name)| name.clone())
        .unwrap_or_else(|| format!("#{id}"))
}

// --- Form value parsing and formatting ---

/// `datetime-local` inputs omit the seconds; stored values carry them.
pub(crate) fn parse_datetime(raw: &str) -> AppResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map_err(|_| AppError::BadRequest(format!("invalid date/time: {raw}")))
}

pub(crate) fn parse_time(raw: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| AppError::BadRequest(format!("invalid time: {raw}")))
}

/// Empty inputs mean the field was left blank, not malformed.
pub(crate) fn parse_optional_time(raw: &str) -> AppResult<Option<NaiveTime>> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_time(raw).map(Some)
    }
}

pub(crate) fn fmt_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

pub(crate) fn fmt_datetime_input(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M").to_string()
}

pub(crate) fn fmt_time(value: &NaiveTime) -> String {
    value.format("%H:%M").to_string()
}
