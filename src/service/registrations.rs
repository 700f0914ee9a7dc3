use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::authz;
use crate::db::models::{ClassRegistration, RegistrationStatus};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

use super::{ensure_ids_match, verify_write};

const REGISTRATION_COLUMNS: &str =
    "class_registration_id, member_id, class_id, status, registration_date";

#[derive(Debug, Clone, Deserialize)]
pub struct NewClassRegistration {
    pub class_id: i64,
    pub status: RegistrationStatus,
    pub registration_date: NaiveDateTime,
}

pub(crate) fn fetch_registration(
    conn: &Connection,
    class_registration_id: i64,
) -> AppResult<ClassRegistration> {
    conn.query_row(
        &format!(
            "SELECT {REGISTRATION_COLUMNS} FROM class_registrations \
             WHERE class_registration_id = ?1"
        ),
        params![class_registration_id],
        ClassRegistration::from_row,
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

/// The acting user becomes the registered member, whatever the payload said.
pub fn create_registration(
    pool: &DbPool,
    new: NewClassRegistration,
    actor: i64,
) -> AppResult<ClassRegistration> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO class_registrations (member_id, class_id, status, registration_date) \
         VALUES (?1, ?2, ?3, ?4)",
        params![actor, new.class_id, new.status, new.registration_date],
    )?;
    let class_registration_id = conn.last_insert_rowid();

    Ok(ClassRegistration {
        class_registration_id,
        member_id: actor,
        class_id: new.class_id,
        status: new.status,
        registration_date: new.registration_date,
    })
}

pub fn get_registration(pool: &DbPool, class_registration_id: i64) -> AppResult<ClassRegistration> {
    let conn = pool.get()?;
    fetch_registration(&conn, class_registration_id)
}

pub fn list_registrations(pool: &DbPool) -> AppResult<Vec<ClassRegistration>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {REGISTRATION_COLUMNS} FROM class_registrations ORDER BY class_registration_id"
    ))?;
    let registrations = stmt
        .query_map([], ClassRegistration::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(registrations)
}

/// Only the stored row's member (or a global Admin) may edit a
/// registration; the columns then come from the payload as the original
/// edit form allowed, `member_id` included.
pub fn update_registration(
    pool: &DbPool,
    class_registration_id: i64,
    registration: ClassRegistration,
    actor: i64,
) -> AppResult<()> {
    ensure_ids_match(class_registration_id, registration.class_registration_id)?;

    let conn = pool.get()?;
    let stored = fetch_registration(&conn, class_registration_id)?;
    authz::require(authz::can_mutate_registration(&conn, actor, stored.member_id)?)?;

    let rows = conn.execute(
        "UPDATE class_registrations SET member_id = ?2, class_id = ?3, status = ?4, \
         registration_date = ?5 WHERE class_registration_id = ?1",
        params![
            class_registration_id,
            registration.member_id,
            registration.class_id,
            registration.status,
            registration.registration_date
        ],
    )?;
    verify_write(
        &conn,
        "class_registrations",
        "class_registration_id",
        class_registration_id,
        rows,
    )
}

pub fn delete_registration(
    pool: &DbPool,
    class_registration_id: i64,
    actor: i64,
) -> AppResult<()> {
    let conn = pool.get()?;
    let stored = fetch_registration(&conn, class_registration_id)?;
    authz::require(authz::can_mutate_registration(&conn, actor, stored.member_id)?)?;

    let rows = conn.execute(
        "DELETE FROM class_registrations WHERE class_registration_id = ?1",
        params![class_registration_id],
    )?;
    verify_write(
        &conn,
        "class_registrations",
        "class_registration_id",
        class_registration_id,
        rows,
    )
}
