use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::aggregator::{self, AssignmentFilter, SortKey, SortOrder};
use crate::auth::{self, AuthUser};
use crate::calendar::{self, CalendarMonth};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::dashboard::{self, DashboardSnapshot};
use crate::services::semesters::{self, ALL_SEMESTERS, normalize_label};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", patch(update_course).delete(delete_course))
        .route("/homeworks", get(list_homeworks).post(create_homework))
        .route(
            "/homeworks/{id}",
            patch(update_homework).delete(delete_homework),
        )
        .route("/exams", get(list_exams).post(create_exam))
        .route("/exams/{id}", patch(update_exam).delete(delete_exam))
        .route("/semesters", get(list_semesters).post(create_semester))
        .route("/semesters/selected", put(select_semester))
        .route(
            "/semesters/{name}",
            patch(rename_semester).delete(delete_semester),
        )
        .route("/assignments", get(list_assignments))
        .route("/dashboard", get(get_dashboard))
        .route("/calendar", get(get_calendar))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// auth

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if req.password.chars().count() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if repository::find_user_by_email(&state.db, &email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = auth::hash_password(&req.password)?;
    let user = repository::insert_user(
        &state.db,
        &email,
        &password_hash,
        req.display_name.as_deref(),
    )
    .await?;
    let token = auth::issue_token(&user.id, &state.jwt_encoding_key)?;
    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let user = repository::find_user_by_email(&state.db, &email)
        .await?
        .filter(|user| auth::verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;
    let token = auth::issue_token(&user.id, &state.jwt_encoding_key)?;
    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

// ---------------------------------------------------------------------------
// courses

async fn list_courses(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(&state.db, &user.user_id).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut req): Json<NewCourseRequest>,
) -> Result<Json<Course>, AppError> {
    req.name = req.name.trim().to_string();
    if req.name.is_empty() {
        return Err(AppError::Validation(
            "Course name cannot be empty".to_string(),
        ));
    }
    req.semester = normalize_label(req.semester);
    let course = repository::insert_course(&state.db, &user.user_id, req).await?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(mut req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "Course name cannot be empty".to_string(),
            ));
        }
    }
    req.semester = updated_label(req.semester)?;
    let course = repository::update_course(&state.db, &user.user_id, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if repository::delete_course(&state.db, &user.user_id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// homeworks

async fn list_homeworks(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<HomeworkView>>, AppError> {
    let homeworks = repository::fetch_homeworks(&state.db, &user.user_id).await?;
    Ok(Json(homeworks))
}

async fn create_homework(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut req): Json<NewHomeworkRequest>,
) -> Result<Json<Homework>, AppError> {
    req.title = req.title.trim().to_string();
    if req.title.is_empty() {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }
    // Creating against someone else's course reads as "no such course".
    repository::find_course(&state.db, &user.user_id, &req.course_id)
        .await?
        .ok_or(AppError::NotFound)?;
    req.semester = normalize_label(req.semester);
    let homework = repository::insert_homework(&state.db, &user.user_id, req).await?;
    Ok(Json(homework))
}

async fn update_homework(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(mut req): Json<UpdateHomeworkRequest>,
) -> Result<Json<Homework>, AppError> {
    validate_grade(req.grade)?;
    req.semester = updated_label(req.semester)?;
    let homework = repository::update_homework(&state.db, &user.user_id, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(homework))
}

async fn delete_homework(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if repository::delete_homework(&state.db, &user.user_id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// exams

async fn list_exams(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ExamView>>, AppError> {
    let exams = repository::fetch_exams(&state.db, &user.user_id).await?;
    Ok(Json(exams))
}

async fn create_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut req): Json<NewExamRequest>,
) -> Result<Json<Exam>, AppError> {
    req.title = req.title.trim().to_string();
    if req.title.is_empty() {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }
    repository::find_course(&state.db, &user.user_id, &req.course_id)
        .await?
        .ok_or(AppError::NotFound)?;
    req.semester = normalize_label(req.semester);
    let exam = repository::insert_exam(&state.db, &user.user_id, req).await?;
    Ok(Json(exam))
}

async fn update_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(mut req): Json<UpdateExamRequest>,
) -> Result<Json<Exam>, AppError> {
    validate_grade(req.grade)?;
    req.semester = updated_label(req.semester)?;
    let exam = repository::update_exam(&state.db, &user.user_id, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(exam))
}

async fn delete_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if repository::delete_exam(&state.db, &user.user_id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// semesters

async fn list_semesters(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SemesterOverview>, AppError> {
    let overview = semesters::semester_overview(&state.db, &user.user_id).await?;
    Ok(Json(overview))
}

async fn create_semester(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SemesterNameRequest>,
) -> Result<Json<UserSemester>, AppError> {
    let semester = semesters::add_semester(&state.db, &user.user_id, req.name).await?;
    Ok(Json(semester))
}

async fn rename_semester(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
    Json(req): Json<SemesterNameRequest>,
) -> Result<Json<UserSemester>, AppError> {
    let semester = semesters::rename_semester(&state.db, &user.user_id, &name, req.name).await?;
    Ok(Json(semester))
}

async fn delete_semester(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    semesters::delete_semester(&state.db, &user.user_id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn select_semester(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SemesterNameRequest>,
) -> Result<StatusCode, AppError> {
    semesters::select_semester(&state.db, &user.user_id, &req.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// aggregated views

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AssignmentQuery {
    semester: Option<String>,
    status: Option<String>,
    course_id: Option<String>,
    hide_completed: bool,
    sort_by: SortKey,
    order: SortOrder,
}

async fn list_assignments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AssignmentQuery>,
) -> Result<Json<Vec<Assignment>>, AppError> {
    let homeworks = repository::fetch_homeworks(&state.db, &user.user_id).await?;
    let exams = repository::fetch_exams(&state.db, &user.user_id).await?;
    let items = merge_views(&homeworks, &exams);

    let filter = AssignmentFilter {
        semester: none_if_all(query.semester),
        status: parse_status_filter(query.status.as_deref())?,
        course_id: none_if_all(query.course_id),
        hide_completed: query.hide_completed,
    };
    let filtered = aggregator::filter_assignments(&items, filter);
    let sorted = aggregator::sort_assignments(&filtered, query.sort_by, query.order);
    Ok(Json(sorted))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DashboardQuery {
    force: bool,
}

async fn get_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    let snapshot = dashboard::dashboard(
        &state.db,
        &state.dashboard_cache,
        &user.user_id,
        query.force,
        Utc::now(),
    )
    .await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
struct CalendarQuery {
    month: u32,
    year: i32,
}

async fn get_calendar(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarMonth>, AppError> {
    let homeworks = repository::fetch_homeworks(&state.db, &user.user_id).await?;
    let exams = repository::fetch_exams(&state.db, &user.user_id).await?;
    let items = merge_views(&homeworks, &exams);
    let month = calendar::build_calendar_index(&items, query.month, query.year)?;
    Ok(Json(month))
}

// ---------------------------------------------------------------------------
// helpers

fn none_if_all(value: Option<String>) -> Option<String> {
    value.filter(|v| v != ALL_SEMESTERS)
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<AssignmentStatus>, AppError> {
    match raw {
        None => Ok(None),
        Some(v) if v == ALL_SEMESTERS => Ok(None),
        Some(v) => v
            .parse::<AssignmentStatus>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Unknown status: {v}"))),
    }
}

fn validate_grade(grade: Option<f64>) -> Result<(), AppError> {
    match grade {
        Some(g) if !(0.0..=100.0).contains(&g) => Err(AppError::Validation(
            "Grade must be between 0 and 100".to_string(),
        )),
        _ => Ok(()),
    }
}

/// A PATCH that includes a semester must carry a real label; absence means
/// "leave unchanged".
fn updated_label(raw: Option<String>) -> Result<Option<String>, AppError> {
    match raw {
        None => Ok(None),
        Some(s) => normalize_label(Some(s))
            .map(Some)
            .ok_or_else(|| AppError::Validation("Semester name cannot be empty".to_string())),
    }
}
