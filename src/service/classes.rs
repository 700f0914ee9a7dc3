use chrono::{NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::authz;
use crate::db::models::GymClass;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

use super::{ensure_ids_match, verify_write};

const CLASS_COLUMNS: &str = "gym_class_id, name, description, start_time, end_time, \
                             instructor, trainer_id, schedule_time, max_capacity, image_path";

#[derive(Debug, Clone, Deserialize)]
pub struct NewGymClass {
    pub name: String,
    pub description: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub instructor: Option<String>,
    pub schedule_time: NaiveDateTime,
    pub max_capacity: i64,
    pub image_path: Option<String>,
}

pub(crate) fn fetch_class(conn: &Connection, gym_class_id: i64) -> AppResult<GymClass> {
    conn.query_row(
        &format!("SELECT {CLASS_COLUMNS} FROM gym_classes WHERE gym_class_id = ?1"),
        params![gym_class_id],
        GymClass::from_row,
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

/// API-path create: the acting user becomes the trainer, whatever the
/// payload said.
pub fn create_class(pool: &DbPool, new: NewGymClass, actor: i64) -> AppResult<GymClass> {
    create_class_with_trainer(pool, new, actor)
}

/// Form-path create: the HTML surface gates this on global Admin and lets
/// the form pick the trainer, so the chosen id is stored verbatim.
pub fn create_class_with_trainer(
    pool: &DbPool,
    new: NewGymClass,
    trainer_id: i64,
) -> AppResult<GymClass> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO gym_classes \
         (name, description, start_time, end_time, instructor, trainer_id, \
          schedule_time, max_capacity, image_path) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            new.name,
            new.description,
            new.start_time,
            new.end_time,
            new.instructor,
            trainer_id,
            new.schedule_time,
            new.max_capacity,
            new.image_path
        ],
    )?;
    let gym_class_id = conn.last_insert_rowid();

    Ok(GymClass {
        gym_class_id,
        name: new.name,
        description: new.description,
        start_time: new.start_time,
        end_time: new.end_time,
        instructor: new.instructor,
        trainer_id,
        schedule_time: new.schedule_time,
        max_capacity: new.max_capacity,
        image_path: new.image_path,
    })
}

pub fn get_class(pool: &DbPool, gym_class_id: i64) -> AppResult<GymClass> {
    let conn = pool.get()?;
    fetch_class(&conn, gym_class_id)
}

pub fn list_classes(pool: &DbPool) -> AppResult<Vec<GymClass>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {CLASS_COLUMNS} FROM gym_classes ORDER BY gym_class_id"
    ))?;
    let classes = stmt
        .query_map([], GymClass::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(classes)
}

/// Only the stored row's trainer (or a global Admin) may edit a class. All
/// columns, `trainer_id` and `instructor` included, then come from the
/// payload as the original edit form allowed.
pub fn update_class(pool: &DbPool, gym_class_id: i64, class: GymClass, actor: i64) -> AppResult<()> {
    ensure_ids_match(gym_class_id, class.gym_class_id)?;

    let conn = pool.get()?;
    let stored = fetch_class(&conn, gym_class_id)?;
    authz::require(authz::can_mutate_class(&conn, actor, stored.trainer_id)?)?;

    let rows = conn.execute(
        "UPDATE gym_classes SET name = ?2, description = ?3, start_time = ?4, end_time = ?5, \
         instructor = ?6, trainer_id = ?7, schedule_time = ?8, max_capacity = ?9, image_path = ?10 \
         WHERE gym_class_id = ?1",
        params![
            gym_class_id,
            class.name,
            class.description,
            class.start_time,
            class.end_time,
            class.instructor,
            class.trainer_id,
            class.schedule_time,
            class.max_capacity,
            class.image_path
        ],
    )?;
    verify_write(&conn, "gym_classes", "gym_class_id", gym_class_id, rows)
}

/// Deleting a class cascades its registrations.
pub fn delete_class(pool: &DbPool, gym_class_id: i64, actor: i64) -> AppResult<()> {
    let conn = pool.get()?;
    let stored = fetch_class(&conn, gym_class_id)?;
    authz::require(authz::can_mutate_class(&conn, actor, stored.trainer_id)?)?;

    let rows = conn.execute(
        "DELETE FROM gym_classes WHERE gym_class_id = ?1",
        params![gym_class_id],
    )?;
    verify_write(&conn, "gym_classes", "gym_class_id", gym_class_id, rows)
}
