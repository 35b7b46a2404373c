use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use academa::db::repository;
use academa::error::AppError;
use academa::models::{NewCourseRequest, NewHomeworkRequest};
use academa::services::semesters;

async fn setup_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

async fn seed_user(pool: &SqlitePool) -> String {
    repository::insert_user(pool, "student@example.com", "hash", None)
        .await
        .expect("Failed to insert user")
        .id
}

#[tokio::test]
async fn adding_the_same_semester_twice_conflicts() {
    let pool = setup_db().await;
    let user_id = seed_user(&pool).await;

    semesters::add_semester(&pool, &user_id, "Fall 2024".to_string())
        .await
        .expect("first add succeeds");
    let err = semesters::add_semester(&pool, &user_id, "Fall 2024".to_string())
        .await
        .expect_err("duplicate add fails");
    assert!(matches!(err, AppError::Conflict(msg) if msg == "Semester already exists"));
}

#[tokio::test]
async fn blank_semester_names_are_rejected() {
    let pool = setup_db().await;
    let user_id = seed_user(&pool).await;

    let err = semesters::add_semester(&pool, &user_id, "   ".to_string())
        .await
        .expect_err("blank name fails");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn deleting_an_unregistered_semester_is_not_found() {
    let pool = setup_db().await;
    let user_id = seed_user(&pool).await;

    let err = semesters::delete_semester(&pool, &user_id, "Fall 2024")
        .await
        .expect_err("missing label fails");
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn deleting_a_semester_with_data_conflicts() {
    let pool = setup_db().await;
    let user_id = seed_user(&pool).await;
    semesters::add_semester(&pool, &user_id, "Fall 2024".to_string())
        .await
        .expect("add");
    semesters::add_semester(&pool, &user_id, "Spring 2025".to_string())
        .await
        .expect("add");

    let course = repository::insert_course(
        &pool,
        &user_id,
        NewCourseRequest {
            name: "Algorithms".to_string(),
            semester: Some("Fall 2024".to_string()),
            color: None,
            description: None,
        },
    )
    .await
    .expect("insert course");

    let err = semesters::delete_semester(&pool, &user_id, "Fall 2024")
        .await
        .expect_err("delete fails while data exists");
    assert!(matches!(err, AppError::Conflict(msg) if msg.contains("existing data")));

    // A homework inheriting the label through its course also blocks deletion.
    repository::insert_homework(
        &pool,
        &user_id,
        NewHomeworkRequest {
            title: "Problem set".to_string(),
            due_date: Utc::now(),
            course_id: course.id.clone(),
            description: None,
            semester: None,
        },
    )
    .await
    .expect("insert homework");
    assert!(semesters::delete_semester(&pool, &user_id, "Fall 2024")
        .await
        .is_err());

    // The unused label deletes cleanly.
    semesters::delete_semester(&pool, &user_id, "Spring 2025")
        .await
        .expect("unused label deletes");
}

#[tokio::test]
async fn the_last_semester_cannot_be_deleted_even_unused() {
    let pool = setup_db().await;
    let user_id = seed_user(&pool).await;
    semesters::add_semester(&pool, &user_id, "Fall 2024".to_string())
        .await
        .expect("add");

    let err = semesters::delete_semester(&pool, &user_id, "Fall 2024")
        .await
        .expect_err("last semester is protected");
    assert!(matches!(err, AppError::Conflict(msg) if msg.contains("only semester")));
}

#[tokio::test]
async fn rename_requires_an_existing_source_and_free_target() {
    let pool = setup_db().await;
    let user_id = seed_user(&pool).await;
    semesters::add_semester(&pool, &user_id, "Fall 2024".to_string())
        .await
        .expect("add");
    semesters::add_semester(&pool, &user_id, "Spring 2025".to_string())
        .await
        .expect("add");

    let err = semesters::rename_semester(&pool, &user_id, "Winter 2023", "Fall 2023".to_string())
        .await
        .expect_err("missing source fails");
    assert!(matches!(err, AppError::NotFound));

    let err = semesters::rename_semester(&pool, &user_id, "Fall 2024", "Spring 2025".to_string())
        .await
        .expect_err("occupied target fails");
    assert!(matches!(err, AppError::Conflict(_)));

    let renamed = semesters::rename_semester(&pool, &user_id, "Fall 2024", "Autumn 2024".to_string())
        .await
        .expect("rename succeeds");
    assert_eq!(renamed.name, "Autumn 2024");
}

#[tokio::test]
async fn rename_does_not_cascade_to_records() {
    let pool = setup_db().await;
    let user_id = seed_user(&pool).await;
    semesters::add_semester(&pool, &user_id, "Fall 2024".to_string())
        .await
        .expect("add");
    repository::insert_course(
        &pool,
        &user_id,
        NewCourseRequest {
            name: "Algorithms".to_string(),
            semester: Some("Fall 2024".to_string()),
            color: None,
            description: None,
        },
    )
    .await
    .expect("insert course");

    semesters::rename_semester(&pool, &user_id, "Fall 2024", "Autumn 2024".to_string())
        .await
        .expect("rename");

    // The course keeps the old string, which resurfaces as a discovered
    // label next to the renamed registry entry.
    let courses = repository::fetch_courses(&pool, &user_id).await.expect("fetch");
    assert_eq!(courses[0].semester.as_deref(), Some("Fall 2024"));

    let overview = semesters::semester_overview(&pool, &user_id)
        .await
        .expect("overview");
    assert_eq!(overview.semesters, vec!["Autumn 2024", "Fall 2024"]);
}

#[tokio::test]
async fn selection_accepts_all_and_known_labels_only() {
    let pool = setup_db().await;
    let user_id = seed_user(&pool).await;
    semesters::add_semester(&pool, &user_id, "Fall 2024".to_string())
        .await
        .expect("add");

    semesters::select_semester(&pool, &user_id, "Fall 2024")
        .await
        .expect("known label selectable");
    let overview = semesters::semester_overview(&pool, &user_id)
        .await
        .expect("overview");
    assert_eq!(overview.selected, "Fall 2024");

    let err = semesters::select_semester(&pool, &user_id, "Winter 2023")
        .await
        .expect_err("unknown label rejected");
    assert!(matches!(err, AppError::NotFound));

    semesters::select_semester(&pool, &user_id, "all")
        .await
        .expect("all clears the filter");
    let overview = semesters::semester_overview(&pool, &user_id)
        .await
        .expect("overview");
    assert_eq!(overview.selected, "all");
}
