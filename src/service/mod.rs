//! Entity mutation service.
//!
//! One submodule per entity, each owning its create/get/list/update/delete
//! operations. Mutations run the rules in [`crate::authz`] before touching
//! storage, and every single-row write is verified afterwards so a vanished
//! row surfaces as NotFound and a concurrently-changed one as Conflict
//! instead of silently succeeding.

pub mod classes;
pub mod links;
pub mod members;
pub mod projects;
pub mod registrations;
pub mod users;

use rusqlite::{params, Connection};

use crate::error::{AppError, AppResult};

/// Updates must target the same id in path and payload. Checked before any
/// authorization or storage work.
pub(crate) fn ensure_ids_match(path_id: i64, payload_id: i64) -> AppResult<()> {
    if path_id != payload_id {
        return Err(AppError::BadRequest(format!(
            "path id {path_id} does not match payload id {payload_id}"
        )));
    }
    Ok(())
}

/// Settles a zero-row UPDATE or DELETE with one existence re-check: a row
/// that is gone is NotFound, a row still present changed underneath the
/// statement and is a Conflict. Conflicts are fatal and never retried.
pub(crate) fn verify_write(
    conn: &Connection,
    table: &str,
    id_column: &str,
    id: i64,
    rows_affected: usize,
) -> AppResult<()> {
    if rows_affected > 0 {
        return Ok(());
    }

    let exists: bool = conn.query_row(
        &format!("SELECT COUNT(*) > 0 FROM {table} WHERE {id_column} = ?1"),
        params![id],
        |row| row.get(0),
    )?;

    if exists {
        Err(AppError::Conflict(format!(
            "{table} row {id} changed during write"
        )))
    } else {
        Err(AppError::NotFound)
    }
}
