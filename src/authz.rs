//! Authorization rules for entity mutations.
//!
//! Decision functions evaluate the acting user against roles stored in the
//! database and return [`Access`]. They never mutate anything; callers turn
//! a `Deny` into a 403 with [`require`].

use rusqlite::{params, Connection};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

fn allow_if(condition: bool) -> Access {
    if condition {
        Access::Allow
    } else {
        Access::Deny
    }
}

/// Converts a decision into a result, mapping `Deny` to 403.
pub fn require(access: Access) -> AppResult<()> {
    match access {
        Access::Allow => Ok(()),
        Access::Deny => Err(AppError::Forbidden),
    }
}

// --- Role lookups ---

/// Whether the user holds the global Admin role. Role comparison is
/// case-sensitive; an unknown user id is simply not an admin.
pub fn is_admin(conn: &Connection, user_id: i64) -> AppResult<bool> {
    let admin: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE user_id = ?1 AND role = 'Admin'",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(admin)
}

/// Whether the user holds an Admin or Co-Admin membership in the project.
/// No membership row means no say over the project.
pub fn manages_project(conn: &Connection, project_id: i64, user_id: i64) -> AppResult<bool> {
    let manages: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM project_members \
         WHERE project_id = ?1 AND member_id = ?2 AND role IN ('Admin', 'Co-Admin')",
        params![project_id, user_id],
        |row| row.get(0),
    )?;
    Ok(manages)
}

// --- Per-entity rules ---

/// Users may edit their own profile; global Admins may edit anyone.
pub fn can_update_user(conn: &Connection, actor: i64, target_user_id: i64) -> AppResult<Access> {
    if actor == target_user_id {
        return Ok(Access::Allow);
    }
    Ok(allow_if(is_admin(conn, actor)?))
}

/// Only global Admins delete user accounts.
pub fn can_delete_user(conn: &Connection, actor: i64) -> AppResult<Access> {
    Ok(allow_if(is_admin(conn, actor)?))
}

/// Project update and delete require an Admin or Co-Admin membership.
pub fn can_mutate_project(conn: &Connection, actor: i64, project_id: i64) -> AppResult<Access> {
    Ok(allow_if(manages_project(conn, project_id, actor)?))
}

/// Membership rows are managed by the project's Admins and Co-Admins.
/// Create and update key on the payload's project; delete keys on the
/// stored row's project.
pub fn can_mutate_member(conn: &Connection, actor: i64, project_id: i64) -> AppResult<Access> {
    Ok(allow_if(manages_project(conn, project_id, actor)?))
}

/// Links may be removed by whoever added them or by the project's
/// Admins/Co-Admins. Updates carry no ownership rule at all.
pub fn can_delete_link(
    conn: &Connection,
    actor: i64,
    added_by_user_id: i64,
    project_id: i64,
) -> AppResult<Access> {
    if actor == added_by_user_id {
        return Ok(Access::Allow);
    }
    Ok(allow_if(manages_project(conn, project_id, actor)?))
}

/// Classes belong to their trainer; global Admins may also touch them.
pub fn can_mutate_class(conn: &Connection, actor: i64, trainer_id: i64) -> AppResult<Access> {
    if actor == trainer_id {
        return Ok(Access::Allow);
    }
    Ok(allow_if(is_admin(conn, actor)?))
}

/// Registrations belong to the member who holds them; global Admins may
/// also touch them.
pub fn can_mutate_registration(conn: &Connection, actor: i64, member_id: i64) -> AppResult<Access> {
    if actor == member_id {
        return Ok(Access::Allow);
    }
    Ok(allow_if(is_admin(conn, actor)?))
}
