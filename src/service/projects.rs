use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::authz;
use crate::db::models::Project;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

use super::{ensure_ids_match, verify_write};

const PROJECT_COLUMNS: &str = "project_id, creator_id, name, description";

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

pub(crate) fn fetch_project(conn: &Connection, project_id: i64) -> AppResult<Project> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE project_id = ?1"),
        params![project_id],
        Project::from_row,
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

/// Creates the project and the creator's Admin membership in one
/// transaction. A project must never exist without an Admin member, so the
/// two inserts land together or not at all.
pub fn create_project(pool: &DbPool, new: NewProject, actor: i64) -> AppResult<Project> {
    let conn = pool.get()?;

    conn.execute("BEGIN IMMEDIATE", [])?;

    let result: AppResult<i64> = (|| {
        conn.execute(
            "INSERT INTO projects (creator_id, name, description) VALUES (?1, ?2, ?3)",
            params![actor, new.name, new.description],
        )?;
        let project_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO project_members (project_id, member_id, role) VALUES (?1, ?2, 'Admin')",
            params![project_id, actor],
        )?;

        Ok(project_id)
    })();

    match result {
        Ok(project_id) => {
            conn.execute("COMMIT", [])?;
            Ok(Project {
                project_id,
                creator_id: actor,
                name: new.name,
                description: new.description,
            })
        }
        Err(e) => {
            conn.execute("ROLLBACK", [])?;
            Err(e)
        }
    }
}

pub fn get_project(pool: &DbPool, project_id: i64) -> AppResult<Project> {
    let conn = pool.get()?;
    fetch_project(&conn, project_id)
}

pub fn list_projects(pool: &DbPool) -> AppResult<Vec<Project>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY project_id"
    ))?;
    let projects = stmt
        .query_map([], Project::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(projects)
}

/// Name and description are editable by the project's Admins and Co-Admins;
/// `creator_id` is never rewritten.
pub fn update_project(pool: &DbPool, project_id: i64, project: Project, actor: i64) -> AppResult<()> {
    ensure_ids_match(project_id, project.project_id)?;

    let conn = pool.get()?;
    authz::require(authz::can_mutate_project(&conn, actor, project_id)?)?;

    let rows = conn.execute(
        "UPDATE projects SET name = ?2, description = ?3 WHERE project_id = ?1",
        params![project_id, project.name, project.description],
    )?;
    verify_write(&conn, "projects", "project_id", project_id, rows)
}

/// Deleting a project cascades its memberships and links.
pub fn delete_project(pool: &DbPool, project_id: i64, actor: i64) -> AppResult<()> {
    let conn = pool.get()?;
    fetch_project(&conn, project_id)?;
    authz::require(authz::can_mutate_project(&conn, actor, project_id)?)?;

    let rows = conn.execute(
        "DELETE FROM projects WHERE project_id = ?1",
        params![project_id],
    )?;
    verify_write(&conn, "projects", "project_id", project_id, rows)
}
