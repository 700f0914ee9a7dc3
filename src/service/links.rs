use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use url::Url;

use crate::authz;
use crate::db::models::ProjectLink;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

use super::{ensure_ids_match, verify_write};

const LINK_COLUMNS: &str = "project_link_id, project_id, url, description, category, added_by_user_id";

#[derive(Debug, Clone, Deserialize)]
pub struct NewProjectLink {
    pub project_id: i64,
    pub url: String,
    pub description: String,
    pub category: String,
}

fn validate_url(raw: &str) -> AppResult<()> {
    Url::parse(raw).map_err(|e| AppError::BadRequest(format!("invalid url: {e}")))?;
    Ok(())
}

pub(crate) fn fetch_link(conn: &Connection, project_link_id: i64) -> AppResult<ProjectLink> {
    conn.query_row(
        &format!("SELECT {LINK_COLUMNS} FROM project_links WHERE project_link_id = ?1"),
        params![project_link_id],
        ProjectLink::from_row,
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

/// `added_by_user_id` is always the acting user, never the payload.
pub fn create_link(pool: &DbPool, new: NewProjectLink, actor: i64) -> AppResult<ProjectLink> {
    validate_url(&new.url)?;

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO project_links (project_id, url, description, category, added_by_user_id) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![new.project_id, new.url, new.description, new.category, actor],
    )?;
    let project_link_id = conn.last_insert_rowid();

    Ok(ProjectLink {
        project_link_id,
        project_id: new.project_id,
        url: new.url,
        description: new.description,
        category: new.category,
        added_by_user_id: actor,
    })
}

pub fn get_link(pool: &DbPool, project_link_id: i64) -> AppResult<ProjectLink> {
    let conn = pool.get()?;
    fetch_link(&conn, project_link_id)
}

pub fn list_links(pool: &DbPool) -> AppResult<Vec<ProjectLink>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {LINK_COLUMNS} FROM project_links ORDER BY project_link_id"
    ))?;
    let links = stmt
        .query_map([], ProjectLink::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(links)
}

/// Link updates carry no ownership rule: any authenticated user may edit any
/// link. A known gap in the original, kept as observed behavior.
/// `added_by_user_id` is still never rewritten.
pub fn update_link(
    pool: &DbPool,
    project_link_id: i64,
    link: ProjectLink,
    _actor: i64,
) -> AppResult<()> {
    ensure_ids_match(project_link_id, link.project_link_id)?;
    validate_url(&link.url)?;

    let conn = pool.get()?;
    let rows = conn.execute(
        "UPDATE project_links SET project_id = ?2, url = ?3, description = ?4, category = ?5 \
         WHERE project_link_id = ?1",
        params![project_link_id, link.project_id, link.url, link.description, link.category],
    )?;
    verify_write(&conn, "project_links", "project_link_id", project_link_id, rows)
}

/// Removal is for whoever added the link, or the project's Admins/Co-Admins.
pub fn delete_link(pool: &DbPool, project_link_id: i64, actor: i64) -> AppResult<()> {
    let conn = pool.get()?;
    let link = fetch_link(&conn, project_link_id)?;
    authz::require(authz::can_delete_link(
        &conn,
        actor,
        link.added_by_user_id,
        link.project_id,
    )?)?;

    let rows = conn.execute(
        "DELETE FROM project_links WHERE project_link_id = ?1",
        params![project_link_id],
    )?;
    verify_write(&conn, "project_links", "project_link_id", project_link_id, rows)
}
