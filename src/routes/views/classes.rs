use std::collections::HashMap;
use std::path::Path as FsPath;

use askama::Template;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use super::{
    ensure_admin, fmt_datetime, fmt_datetime_input, fmt_time, id_options, name_of, parse_datetime,
    parse_optional_time, trainer_names, user_names, SelectOption,
};
use crate::db::models::GymClass;
use crate::error::{AppError, AppResult};
use crate::extractors::Actor;
use crate::routes::home::Html;
use crate::service::classes::{self, NewGymClass};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/classes", get(index))
        .route("/classes/new", get(new_form).post(create))
        .route("/classes/{id}", get(detail))
        .route("/classes/{id}/edit", get(edit_form).post(update))
        .route("/classes/{id}/delete", get(delete_form).post(delete))
}

#[derive(Deserialize)]
struct Pagination {
    page: Option<i64>,
    page_size: Option<i64>,
}

struct ClassRow {
    gym_class_id: i64,
    name: String,
    trainer: String,
    schedule: String,
    max_capacity: i64,
}

struct ClassDetail {
    gym_class_id: i64,
    name: String,
    description: String,
    start_time: String,
    end_time: String,
    instructor: String,
    trainer: String,
    schedule_time: String,
    max_capacity: i64,
    has_image: bool,
    image_url: String,
}

fn to_detail(class: GymClass, users: &[(i64, String)]) -> ClassDetail {
    ClassDetail {
        gym_class_id: class.gym_class_id,
        name: class.name,
        description: class.description.unwrap_or_default(),
        start_time: class.start_time.map(|t| fmt_time(&t)).unwrap_or_default(),
        end_time: class.end_time.map(|t| fmt_time(&t)).unwrap_or_default(),
        instructor: class.instructor.unwrap_or_default(),
        trainer: name_of(users, class.trainer_id),
        schedule_time: fmt_datetime(&class.schedule_time),
        max_capacity: class.max_capacity,
        has_image: class.image_path.is_some(),
        image_url: class.image_path.unwrap_or_default(),
    }
}

#[derive(Template)]
#[template(path = "pages/classes/index.html")]
struct IndexTemplate {
    classes: Vec<ClassRow>,
    page: i64,
    total_pages: i64,
    has_prev: bool,
    has_next: bool,
    prev_url: String,
    next_url: String,
}

#[derive(Template)]
#[template(path = "pages/classes/detail.html")]
struct DetailTemplate {
    class: ClassDetail,
}

#[derive(Template)]
#[template(path = "pages/classes/new.html")]
struct NewTemplate {
    trainers: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/classes/edit.html")]
struct EditTemplate {
    gym_class_id: i64,
    name: String,
    description: String,
    start_time: String,
    end_time: String,
    schedule_time: String,
    max_capacity: i64,
    has_image: bool,
    image_path: String,
    trainers: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "pages/classes/delete.html")]
struct DeleteTemplate {
    class: ClassDetail,
}

/// Text inputs from the class form, plus the raw bytes of an uploaded image
/// (kept with its original extension). Empty file inputs are ignored.
struct ClassFormData {
    fields: HashMap<String, String>,
    image: Option<(String, Bytes)>,
}

impl ClassFormData {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut fields = HashMap::new();
        let mut image = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !file_name.is_empty() && !data.is_empty() {
                    let ext = FsPath::new(&file_name)
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(|e| format!(".{e}"))
                        .unwrap_or_default();
                    image = Some((ext, data));
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                fields.insert(name, value);
            }
        }
        Ok(Self { fields, image })
    }

    fn optional(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    fn require(&self, key: &str) -> AppResult<&str> {
        self.optional(key)
            .ok_or_else(|| AppError::BadRequest(format!("missing field: {key}")))
    }

    fn require_i64(&self, key: &str) -> AppResult<i64> {
        self.require(key)?
            .parse()
            .map_err(|_| AppError::BadRequest(format!("invalid number: {key}")))
    }
}

/// Writes an uploaded image under the uploads directory and returns the URL
/// path it will be served from.
async fn store_image(state: &AppState, ext: &str, data: Bytes) -> AppResult<String> {
    let dir = state.config.uploads_path().join("gymclasses");
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("creating upload dir: {e}")))?;
    let file_name = format!("{}{ext}", uuid::Uuid::now_v7());
    tokio::fs::write(dir.join(&file_name), &data)
        .await
        .map_err(|e| AppError::Internal(format!("storing upload: {e}")))?;
    Ok(format!("/uploads/gymclasses/{file_name}"))
}

fn trainer_full_name(conn: &Connection, trainer_id: i64) -> AppResult<Option<String>> {
    let name = conn
        .query_row(
            "SELECT first_name || ' ' || last_name FROM users WHERE user_id = ?1",
            params![trainer_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name)
}

async fn index(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(pagination): Query<Pagination>,
) -> AppResult<Html<IndexTemplate>> {
    let page = pagination.page.unwrap_or(1).max(1);
    let page_size = pagination.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let conn = state.db.get()?;
    ensure_admin(&conn, actor)?;

    let total: i64 = conn.query_row("SELECT COUNT(*) FROM gym_classes", [], |row| row.get(0))?;
    let total_pages = ((total + page_size - 1) / page_size).max(1);

    let users = user_names(&conn)?;
    let mut stmt = conn.prepare(
        "SELECT gym_class_id, name, trainer_id, schedule_time, max_capacity \
         FROM gym_classes ORDER BY gym_class_id LIMIT ?1 OFFSET ?2",
    )?;
    let classes = stmt
        .query_map(params![page_size, (page - 1) * page_size], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, NaiveDateTime>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let rows = classes
        .into_iter()
        .map(|(id, name, trainer_id, schedule, capacity)| ClassRow {
            gym_class_id: id,
            name,
            trainer: name_of(&users, trainer_id),
            schedule: fmt_datetime(&schedule),
            max_capacity: capacity,
        })
        .collect();

    Ok(Html(IndexTemplate {
        classes: rows,
        page,
        total_pages,
        has_prev: page > 1,
        has_next: page < total_pages,
        prev_url: format!("/classes?page={}&page_size={page_size}", page - 1),
        next_url: format!("/classes?page={}&page_size={page_size}", page + 1),
    }))
}

async fn detail(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DetailTemplate>> {
    let conn = state.db.get()?;
    ensure_admin(&conn, actor)?;
    let class = classes::get_class(&state.db, id)?;
    let users = user_names(&conn)?;
    Ok(Html(DetailTemplate {
        class: to_detail(class, &users),
    }))
}

async fn new_form(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> AppResult<Html<NewTemplate>> {
    let conn = state.db.get()?;
    ensure_admin(&conn, actor)?;
    Ok(Html(NewTemplate {
        trainers: id_options(&trainer_names(&conn)?, None),
    }))
}

async fn create(
    State(state): State<AppState>,
    Actor(actor): Actor,
    multipart: Multipart,
) -> AppResult<Redirect> {
    ensure_admin(&*state.db.get()?, actor)?;
    let mut form = ClassFormData::read(multipart).await?;

    let image_path = match form.image.take() {
        Some((ext, data)) => Some(store_image(&state, &ext, data).await?),
        None => None,
    };
    let trainer_id = form.require_i64("trainer_id")?;

    let new = NewGymClass {
        name: form.require("name")?.to_string(),
        description: form.optional("description").map(str::to_string),
        start_time: parse_optional_time(form.optional("start_time").unwrap_or_default())?,
        end_time: parse_optional_time(form.optional("end_time").unwrap_or_default())?,
        instructor: None,
        schedule_time: parse_datetime(form.require("schedule_time")?)?,
        max_capacity: form.require_i64("max_capacity")?,
        image_path,
    };
    classes::create_class_with_trainer(&state.db, new, trainer_id)?;
    Ok(Redirect::to("/classes"))
}

async fn edit_form(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<EditTemplate>> {
    let conn = state.db.get()?;
    ensure_admin(&conn, actor)?;
    let class = classes::get_class(&state.db, id)?;
    let trainers = id_options(&trainer_names(&conn)?, Some(class.trainer_id));
    Ok(Html(EditTemplate {
        gym_class_id: class.gym_class_id,
        name: class.name,
        description: class.description.unwrap_or_default(),
        start_time: class.start_time.map(|t| fmt_time(&t)).unwrap_or_default(),
        end_time: class.end_time.map(|t| fmt_time(&t)).unwrap_or_default(),
        schedule_time: fmt_datetime_input(&class.schedule_time),
        max_capacity: class.max_capacity,
        has_image: class.image_path.is_some(),
        image_path: class.image_path.unwrap_or_default(),
        trainers,
    }))
}

async fn update(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Redirect> {
    ensure_admin(&*state.db.get()?, actor)?;
    let mut form = ClassFormData::read(multipart).await?;

    // A fresh upload replaces the image; otherwise the hidden field carries
    // the stored path through.
    let image_path = match form.image.take() {
        Some((ext, data)) => Some(store_image(&state, &ext, data).await?),
        None => form.optional("existing_image").map(str::to_string),
    };

    let trainer_id = form.require_i64("trainer_id")?;
    // The stored display name follows the chosen trainer.
    let instructor = trainer_full_name(&*state.db.get()?, trainer_id)?;

    let class = GymClass {
        gym_class_id: form.require_i64("gym_class_id")?,
        name: form.require("name")?.to_string(),
        description: form.optional("description").map(str::to_string),
        start_time: parse_optional_time(form.optional("start_time").unwrap_or_default())?,
        end_time: parse_optional_time(form.optional("end_time").unwrap_or_default())?,
        instructor,
        trainer_id,
        schedule_time: parse_datetime(form.require("schedule_time")?)?,
        max_capacity: form.require_i64("max_capacity")?,
        image_path,
    };
    classes::update_class(&state.db, id, class, actor)?;
    Ok(Redirect::to("/classes"))
}

async fn delete_form(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> AppResult<Html<DeleteTemplate>> {
    let conn = state.db.get()?;
    ensure_admin(&conn, actor)?;
    let class = classes::get_class(&state.db, id)?;
    let users = user_names(&conn)?;
    Ok(Html(DeleteTemplate {
        class: to_detail(class, &users),
    }))
}

async fn delete(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    ensure_admin(&*state.db.get()?, actor)?;
    classes::delete_class(&state.db, id, actor)?;
    Ok(Redirect::to("/classes"))
}
