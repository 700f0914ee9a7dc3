use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::authz;
use crate::db::models::{GlobalRole, User};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

use super::{ensure_ids_match, verify_write};

const USER_COLUMNS: &str = "user_id, first_name, last_name, email, role";

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: GlobalRole,
}

pub(crate) fn fetch_user(conn: &Connection, user_id: i64) -> AppResult<User> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
        params![user_id],
        User::from_row,
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

/// Registration is open to anyone; the role comes from the payload exactly
/// as the original sign-up flow allowed.
pub fn create_user(pool: &DbPool, new: NewUser) -> AppResult<User> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO users (first_name, last_name, email, role) VALUES (?1, ?2, ?3, ?4)",
        params![new.first_name, new.last_name, new.email, new.role],
    )?;
    let user_id = conn.last_insert_rowid();

    Ok(User {
        user_id,
        first_name: new.first_name,
        last_name: new.last_name,
        email: new.email,
        role: new.role,
    })
}

pub fn get_user(pool: &DbPool, user_id: i64) -> AppResult<User> {
    let conn = pool.get()?;
    fetch_user(&conn, user_id)
}

pub fn list_users(pool: &DbPool) -> AppResult<Vec<User>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY user_id"))?;
    let users = stmt
        .query_map([], User::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Users may edit themselves; Admins may edit anyone, including the role
/// column.
pub fn update_user(pool: &DbPool, user_id: i64, user: User, actor: i64) -> AppResult<()> {
    ensure_ids_match(user_id, user.user_id)?;

    let conn = pool.get()?;
    authz::require(authz::can_update_user(&conn, actor, user_id)?)?;

    let rows = conn.execute(
        "UPDATE users SET first_name = ?2, last_name = ?3, email = ?4, role = ?5 \
         WHERE user_id = ?1",
        params![user_id, user.first_name, user.last_name, user.email, user.role],
    )?;
    verify_write(&conn, "users", "user_id", user_id, rows)
}

/// Deleting an account cascades the user's class registrations; their
/// projects, classes and links stay behind.
pub fn delete_user(pool: &DbPool, user_id: i64, actor: i64) -> AppResult<()> {
    let conn = pool.get()?;
    fetch_user(&conn, user_id)?;
    authz::require(authz::can_delete_user(&conn, actor)?)?;

    let rows = conn.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
    verify_write(&conn, "users", "user_id", user_id, rows)
}
