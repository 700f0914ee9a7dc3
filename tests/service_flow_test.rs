//! End-to-end flows through the entity service layer.
//!
//! Tests cover:
//! - Project creation bootstrapping the creator's Admin membership
//! - Co-Admin promotion unlocking project writes
//! - Trainer/Admin authority over classes
//! - Registrations belonging to the member who holds them
//! - Id mismatch and repeated-delete behavior

use gymlink::db;
use gymlink::db::models::{ProjectRole, RegistrationStatus};
use gymlink::error::AppError;
use gymlink::service::classes::{self, NewGymClass};
use gymlink::service::links::{self, NewProjectLink};
use gymlink::service::members::{self, NewProjectMember};
use gymlink::service::projects::{self, NewProject};
use gymlink::service::registrations::{self, NewClassRegistration};
use gymlink::service::users;
use gymlink::state::DbPool;
use rusqlite::params;
use tempfile::TempDir;

fn create_test_db() -> (DbPool, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let pool = db::create_pool(&temp_dir.path().join("test.db")).expect("create pool");
    db::run_migrations(&pool).expect("run migrations");
    (pool, temp_dir)
}

fn seed_user(pool: &DbPool, id: i64, role: &str) {
    let conn = pool.get().unwrap();
    conn.execute(
        "INSERT INTO users (user_id, first_name, last_name, email, role) \
         VALUES (?1, 'User', ?1, 'user' || ?1 || '@example.com', ?2)",
        params![id, role],
    )
    .unwrap();
}

fn new_project(name: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: "a community project".to_string(),
    }
}

fn new_class(name: &str) -> NewGymClass {
    NewGymClass {
        name: name.to_string(),
        description: None,
        start_time: None,
        end_time: None,
        instructor: None,
        schedule_time: chrono::NaiveDateTime::parse_from_str(
            "2025-09-01T18:00:00",
            "%Y-%m-%dT%H:%M:%S",
        )
        .unwrap(),
        max_capacity: 20,
        image_path: None,
    }
}

fn new_registration(class_id: i64) -> NewClassRegistration {
    NewClassRegistration {
        class_id,
        status: RegistrationStatus::Pending,
        registration_date: chrono::NaiveDateTime::parse_from_str(
            "2025-08-20T10:00:00",
            "%Y-%m-%dT%H:%M:%S",
        )
        .unwrap(),
    }
}

#[test]
fn test_project_creation_bootstraps_admin_membership() {
    let (pool, _tmp) = create_test_db();
    seed_user(&pool, 7, "Member");

    let project = projects::create_project(&pool, new_project("Garden"), 7).unwrap();
    assert_eq!(project.creator_id, 7);

    // The creator must come out the other side as the project's Admin.
    let all = members::list_members(&pool).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].project_id, project.project_id);
    assert_eq!(all[0].member_id, 7);
    assert_eq!(all[0].role, ProjectRole::Admin);
}

#[test]
fn test_co_admin_promotion_unlocks_project_writes() {
    let (pool, _tmp) = create_test_db();
    seed_user(&pool, 7, "Member");
    seed_user(&pool, 9, "Member");

    let project = projects::create_project(&pool, new_project("Garden"), 7).unwrap();

    // Actor 9 is a stranger to the project and may not touch it.
    let mut renamed = project.clone();
    renamed.name = "Hijacked".to_string();
    assert!(matches!(
        projects::update_project(&pool, project.project_id, renamed.clone(), 9),
        Err(AppError::Forbidden)
    ));

    // Plain membership is not enough either.
    let membership = members::create_member(
        &pool,
        NewProjectMember {
            project_id: project.project_id,
            member_id: 9,
            role: ProjectRole::Member,
        },
        7,
    )
    .unwrap();
    assert!(matches!(
        projects::update_project(&pool, project.project_id, renamed.clone(), 9),
        Err(AppError::Forbidden)
    ));

    // Promotion to Co-Admin by the project Admin changes that.
    let mut promoted = membership.clone();
    promoted.role = ProjectRole::CoAdmin;
    members::update_member(&pool, membership.project_member_id, promoted, 7).unwrap();

    renamed.name = "Community garden".to_string();
    projects::update_project(&pool, project.project_id, renamed, 9).unwrap();
    assert_eq!(
        projects::get_project(&pool, project.project_id).unwrap().name,
        "Community garden"
    );
}

#[test]
fn test_global_admin_has_no_say_over_projects() {
    let (pool, _tmp) = create_test_db();
    seed_user(&pool, 1, "Admin");
    seed_user(&pool, 7, "Member");

    let project = projects::create_project(&pool, new_project("Garden"), 7).unwrap();

    // Project authority comes from membership roles only.
    assert!(matches!(
        projects::delete_project(&pool, project.project_id, 1),
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        members::create_member(
            &pool,
            NewProjectMember {
                project_id: project.project_id,
                member_id: 1,
                role: ProjectRole::Member,
            },
            1,
        ),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn test_link_removal_is_for_owner_or_manager() {
    let (pool, _tmp) = create_test_db();
    seed_user(&pool, 5, "Member");
    seed_user(&pool, 7, "Member");
    seed_user(&pool, 9, "Member");

    let project = projects::create_project(&pool, new_project("Garden"), 7).unwrap();
    let link = links::create_link(
        &pool,
        NewProjectLink {
            project_id: project.project_id,
            url: "https://example.com/plan".to_string(),
            description: "season plan".to_string(),
            category: "Docs".to_string(),
        },
        9,
    )
    .unwrap();
    assert_eq!(link.added_by_user_id, 9);

    assert!(matches!(
        links::delete_link(&pool, link.project_link_id, 5),
        Err(AppError::Forbidden)
    ));
    // The project Admin may remove a link someone else added.
    links::delete_link(&pool, link.project_link_id, 7).unwrap();
    assert!(matches!(
        links::get_link(&pool, link.project_link_id),
        Err(AppError::NotFound)
    ));
}

#[test]
fn test_class_mutations_are_for_trainer_or_admin() {
    let (pool, _tmp) = create_test_db();
    seed_user(&pool, 1, "Admin");
    seed_user(&pool, 3, "Trainer");
    seed_user(&pool, 5, "Member");

    // API-path create makes the actor the trainer.
    let class = classes::create_class(&pool, new_class("Spin"), 3).unwrap();
    assert_eq!(class.trainer_id, 3);

    assert!(matches!(
        classes::delete_class(&pool, class.gym_class_id, 5),
        Err(AppError::Forbidden)
    ));

    let mut edited = class.clone();
    edited.max_capacity = 25;
    classes::update_class(&pool, class.gym_class_id, edited, 1).unwrap();

    classes::delete_class(&pool, class.gym_class_id, 3).unwrap();
    // The row is gone, so a second delete reports NotFound.
    assert!(matches!(
        classes::delete_class(&pool, class.gym_class_id, 3),
        Err(AppError::NotFound)
    ));
}

#[test]
fn test_registration_belongs_to_its_member() {
    let (pool, _tmp) = create_test_db();
    seed_user(&pool, 1, "Admin");
    seed_user(&pool, 3, "Trainer");
    seed_user(&pool, 5, "Member");
    seed_user(&pool, 6, "Member");

    let class = classes::create_class(&pool, new_class("Spin"), 3).unwrap();

    // Whoever acts becomes the registered member.
    let registration =
        registrations::create_registration(&pool, new_registration(class.gym_class_id), 5)
            .unwrap();
    assert_eq!(registration.member_id, 5);

    let mut confirmed = registration.clone();
    confirmed.status = RegistrationStatus::Confirmed;
    assert!(matches!(
        registrations::update_registration(
            &pool,
            registration.class_registration_id,
            confirmed.clone(),
            6
        ),
        Err(AppError::Forbidden)
    ));

    // The owner and a global Admin both may.
    registrations::update_registration(
        &pool,
        registration.class_registration_id,
        confirmed.clone(),
        5,
    )
    .unwrap();
    let mut canceled = confirmed;
    canceled.status = RegistrationStatus::Canceled;
    registrations::update_registration(&pool, registration.class_registration_id, canceled, 1)
        .unwrap();

    registrations::delete_registration(&pool, registration.class_registration_id, 5).unwrap();
    assert!(matches!(
        registrations::delete_registration(&pool, registration.class_registration_id, 5),
        Err(AppError::NotFound)
    ));
}

#[test]
fn test_id_mismatch_beats_authorization_and_existence() {
    let (pool, _tmp) = create_test_db();
    seed_user(&pool, 5, "Member");

    let mut user = users::get_user(&pool, 5).unwrap();
    user.email = "new@example.com".to_string();

    // Path and payload disagree: rejected before any rule runs, even though
    // actor 5 could edit their own profile.
    assert!(matches!(
        users::update_user(&pool, 6, user.clone(), 5),
        Err(AppError::BadRequest(_))
    ));

    // Same when the path id does not exist at all.
    assert!(matches!(
        users::update_user(&pool, 999, user, 5),
        Err(AppError::BadRequest(_))
    ));
}
