use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rusqlite::Connection;

use crate::error::AppResult;
use crate::extractors::Actor;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub user_count: i64,
    pub project_count: i64,
    pub member_count: i64,
    pub link_count: i64,
    pub class_count: i64,
    pub registration_count: i64,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

fn count_rows(conn: &Connection, sql: &str) -> rusqlite::Result<i64> {
    conn.query_row(sql, [], |row| row.get(0))
}

pub async fn index(State(state): State<AppState>, _actor: Actor) -> AppResult<Html<HomeTemplate>> {
    let conn = state.db.get()?;

    Ok(Html(HomeTemplate {
        user_count: count_rows(&conn, "SELECT COUNT(*) FROM users")?,
        project_count: count_rows(&conn, "SELECT COUNT(*) FROM projects")?,
        member_count: count_rows(&conn, "SELECT COUNT(*) FROM project_members")?,
        link_count: count_rows(&conn, "SELECT COUNT(*) FROM project_links")?,
        class_count: count_rows(&conn, "SELECT COUNT(*) FROM gym_classes")?,
        registration_count: count_rows(&conn, "SELECT COUNT(*) FROM class_registrations")?,
    }))
}
