use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::authz;
use crate::db::models::{ProjectMember, ProjectRole};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

use super::{ensure_ids_match, verify_write};

const MEMBER_COLUMNS: &str = "project_member_id, project_id, member_id, role";

#[derive(Debug, Clone, Deserialize)]
pub struct NewProjectMember {
    pub project_id: i64,
    pub member_id: i64,
    pub role: ProjectRole,
}

pub(crate) fn fetch_member(conn: &Connection, project_member_id: i64) -> AppResult<ProjectMember> {
    conn.query_row(
        &format!("SELECT {MEMBER_COLUMNS} FROM project_members WHERE project_member_id = ?1"),
        params![project_member_id],
        ProjectMember::from_row,
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

/// Memberships are granted by the target project's Admins and Co-Admins.
pub fn create_member(pool: &DbPool, new: NewProjectMember, actor: i64) -> AppResult<ProjectMember> {
    let conn = pool.get()?;
    authz::require(authz::can_mutate_member(&conn, actor, new.project_id)?)?;

    conn.execute(
        "INSERT INTO project_members (project_id, member_id, role) VALUES (?1, ?2, ?3)",
        params![new.project_id, new.member_id, new.role],
    )?;
    let project_member_id = conn.last_insert_rowid();

    Ok(ProjectMember {
        project_member_id,
        project_id: new.project_id,
        member_id: new.member_id,
        role: new.role,
    })
}

pub fn get_member(pool: &DbPool, project_member_id: i64) -> AppResult<ProjectMember> {
    let conn = pool.get()?;
    fetch_member(&conn, project_member_id)
}

pub fn list_members(pool: &DbPool) -> AppResult<Vec<ProjectMember>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMBER_COLUMNS} FROM project_members ORDER BY project_member_id"
    ))?;
    let members = stmt
        .query_map([], ProjectMember::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

/// Authorization keys on the payload's `project_id`, as the original did:
/// whoever manages the project named in the payload may write the row.
pub fn update_member(
    pool: &DbPool,
    project_member_id: i64,
    member: ProjectMember,
    actor: i64,
) -> AppResult<()> {
    ensure_ids_match(project_member_id, member.project_member_id)?;

    let conn = pool.get()?;
    authz::require(authz::can_mutate_member(&conn, actor, member.project_id)?)?;

    let rows = conn.execute(
        "UPDATE project_members SET project_id = ?2, member_id = ?3, role = ?4 \
         WHERE project_member_id = ?1",
        params![project_member_id, member.project_id, member.member_id, member.role],
    )?;
    verify_write(
        &conn,
        "project_members",
        "project_member_id",
        project_member_id,
        rows,
    )
}

/// Delete keys on the stored row's project, not on anything the client sent.
pub fn delete_member(pool: &DbPool, project_member_id: i64, actor: i64) -> AppResult<()> {
    let conn = pool.get()?;
    let member = fetch_member(&conn, project_member_id)?;
    authz::require(authz::can_mutate_member(&conn, actor, member.project_id)?)?;

    let rows = conn.execute(
        "DELETE FROM project_members WHERE project_member_id = ?1",
        params![project_member_id],
    )?;
    verify_write(
        &conn,
        "project_members",
        "project_member_id",
        project_member_id,
        rows,
    )
}
