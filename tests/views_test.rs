//! HTML surface: page rendering, form posts and their redirects.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use rusqlite::params;
use tempfile::TempDir;
use tower::ServiceExt;

use gymlink::config::{Cli, Config};
use gymlink::db;
use gymlink::routes;
use gymlink::state::{AppState, DbPool};

fn test_app() -> (Router, DbPool, TempDir) {
    let tmp = TempDir::new().unwrap();
    let cli = Cli {
        config: None,
        host: None,
        port: None,
        data_dir: Some(tmp.path().to_path_buf()),
    };
    let config = Config::load(&cli).unwrap();
    let pool = db::create_pool(config.db_path()).expect("create pool");
    db::run_migrations(&pool).expect("run migrations");
    let app = routes::app(AppState {
        db: pool.clone(),
        config,
    });
    (app, pool, tmp)
}

fn seed_user(pool: &DbPool, id: i64, first: &str, role: &str) {
    let conn = pool.get().unwrap();
    conn.execute(
        "INSERT INTO users (user_id, first_name, last_name, email, role) \
         VALUES (?1, ?2, 'Tester', ?2 || '@example.com', ?3)",
        params![id, first, role],
    )
    .unwrap();
}

async fn get_page(app: &Router, uri: &str, actor: Option<i64>) -> (StatusCode, String) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(actor) = actor {
        builder = builder.header("x-user-id", actor.to_string());
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_form(
    app: &Router,
    uri: &str,
    actor: Option<i64>,
    form: &str,
) -> (StatusCode, Option<String>) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(actor) = actor {
        builder = builder.header("x-user-id", actor.to_string());
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(form.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    (status, location)
}

#[tokio::test]
async fn test_pages_require_an_actor() {
    let (app, _pool, _tmp) = test_app();

    let (status, _) = get_page(&app, "/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_page(&app, "/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_home_page_counts_entities() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 1, "Root", "Admin");

    let (status, body) = get_page(&app, "/", Some(1)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("GymLink"));
    assert!(body.contains("users"));
}

#[tokio::test]
async fn test_user_form_create_redirects_to_index() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 1, "Root", "Admin");

    let (status, location) = post_form(
        &app,
        "/users/new",
        Some(1),
        "first_name=Ana&last_name=Lopez&email=ana%40example.com&role=Member",
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/users"));

    let (status, body) = get_page(&app, "/users", Some(1)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Ana Lopez"));
    assert!(body.contains("ana@example.com"));
}

#[tokio::test]
async fn test_unknown_role_in_form_is_rejected() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 1, "Root", "Admin");

    let (status, _) = post_form(
        &app,
        "/users/new",
        Some(1),
        "first_name=Ana&last_name=Lopez&email=ana%40example.com&role=Banana",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_project_form_makes_actor_the_creator() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 7, "Paula", "Member");

    let (status, location) =
        post_form(&app, "/projects/new", Some(7), "name=Garden&description=beds").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/projects"));

    // The index resolves the creator id to a display name.
    let (_, body) = get_page(&app, "/projects", Some(7)).await;
    assert!(body.contains("Garden"));
    assert!(body.contains("Paula Tester"));

    // And the creator came out as the project's Admin member.
    let (_, body) = get_page(&app, "/members", Some(7)).await;
    assert!(body.contains("Paula Tester"));
    assert!(body.contains("Admin"));
}

#[tokio::test]
async fn test_class_pages_are_admin_only() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 1, "Root", "Admin");
    seed_user(&pool, 5, "Mia", "Member");

    let (status, _) = get_page(&app, "/classes", Some(5)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get_page(&app, "/classes", Some(1)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Gym classes"));
}

#[tokio::test]
async fn test_class_form_create_via_multipart() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 1, "Root", "Admin");
    seed_user(&pool, 3, "Tess", "Trainer");

    let boundary = "form-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nSpin\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"trainer_id\"\r\n\r\n3\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"schedule_time\"\r\n\r\n2025-09-01T18:00\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"max_capacity\"\r\n\r\n20\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/classes/new")
        .header("x-user-id", "1")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (_, page) = get_page(&app, "/classes", Some(1)).await;
    assert!(page.contains("Spin"));
    assert!(page.contains("Tess Tester"));
}

#[tokio::test]
async fn test_class_form_post_is_admin_gated_too() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 5, "Mia", "Member");

    let boundary = "form-boundary";
    let request = Request::builder()
        .method("POST")
        .uri("/classes/new")
        .header("x-user-id", "5")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(format!("--{boundary}--\r\n")))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_class_index_paginates() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 1, "Root", "Admin");
    {
        let conn = pool.get().unwrap();
        for i in 1..=12 {
            conn.execute(
                "INSERT INTO gym_classes (name, trainer_id, schedule_time, max_capacity) \
                 VALUES ('Class ' || ?1, 1, '2025-09-01T18:00:00', 20)",
                params![i],
            )
            .unwrap();
        }
    }

    let (status, body) = get_page(&app, "/classes", Some(1)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Class 1"));
    assert!(!body.contains("Class 11"));
    assert!(body.contains("Page 1 of 2"));

    let (status, body) = get_page(&app, "/classes?page=2", Some(1)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Class 11"));
    assert!(body.contains("Class 12"));
}

#[tokio::test]
async fn test_edit_form_carries_stored_values() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 1, "Root", "Admin");
    seed_user(&pool, 5, "Mia", "Member");

    let (status, body) = get_page(&app, "/users/5/edit", Some(5)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("value=\"Mia\""));
    assert!(body.contains("Mia@example.com"));
}

#[tokio::test]
async fn test_detail_of_missing_row_is_not_found() {
    let (app, pool, _tmp) = test_app();
    seed_user(&pool, 1, "Root", "Admin");

    let (status, _) = get_page(&app, "/projects/99", Some(1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
