//! All store access lives here: free async functions over the pool, every
//! query scoped to the owning user. A lookup that misses because the record
//! belongs to someone else is indistinguishable from one that misses because
//! the record does not exist.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{
    Course, CourseRef, Exam, ExamView, Homework, HomeworkView, NewCourseRequest, NewExamRequest,
    NewHomeworkRequest, UpdateCourseRequest, UpdateExamRequest, UpdateHomeworkRequest, User,
    UserSemester,
};

const COURSE_COLUMNS: &str =
    "id, user_id, name, semester, color, description, created_at, updated_at";
const HOMEWORK_COLUMNS: &str = "id, user_id, course_id, title, description, due_date, status, \
     grade, semester, created_at, updated_at";
const EXAM_COLUMNS: &str = "id, user_id, course_id, title, exam_type, location, duration, \
     exam_date, status, grade, semester, created_at, updated_at";

// ---------------------------------------------------------------------------
// users

pub async fn insert_user(
    db: &SqlitePool,
    email: &str,
    password_hash: &str,
    display_name: Option<&str>,
) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, display_name, selected_semester, created_at) \
         VALUES (?, ?, ?, ?, NULL, ?)",
    )
    .bind(&id)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .bind(now)
    .execute(db)
    .await?;

    Ok(User {
        id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        display_name: display_name.map(|s| s.to_string()),
        selected_semester: None,
        created_at: now,
    })
}

pub async fn find_user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, display_name, selected_semester, created_at \
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, display_name, selected_semester, created_at \
         FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// `None` clears the selection back to "all".
pub async fn set_selected_semester(
    db: &SqlitePool,
    user_id: &str,
    selection: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET selected_semester = ? WHERE id = ?")
        .bind(selection)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// courses

pub async fn fetch_courses(db: &SqlitePool, user_id: &str) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE user_id = ? ORDER BY created_at"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_course(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_course(
    db: &SqlitePool,
    user_id: &str,
    req: NewCourseRequest,
) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO courses (id, user_id, name, semester, color, description, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.name)
    .bind(&req.semester)
    .bind(&req.color)
    .bind(&req.description)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(Course {
        id,
        user_id: user_id.to_string(),
        name: req.name,
        semester: req.semester,
        color: req.color,
        description: req.description,
        created_at: now,
        updated_at: now,
    })
}

pub async fn update_course(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let mut current = match find_course(db, user_id, id).await? {
        Some(course) => course,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(semester) = req.semester {
        current.semester = Some(semester);
    }
    if let Some(color) = req.color {
        current.color = Some(color);
    }
    if let Some(description) = req.description {
        current.description = Some(description);
    }
    current.updated_at = Utc::now();

    sqlx::query(
        "UPDATE courses SET name = ?, semester = ?, color = ?, description = ?, updated_at = ? \
         WHERE id = ? AND user_id = ?",
    )
    .bind(&current.name)
    .bind(&current.semester)
    .bind(&current.color)
    .bind(&current.description)
    .bind(current.updated_at)
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_course(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// homeworks

#[derive(sqlx::FromRow)]
struct HomeworkCourseRow {
    #[sqlx(flatten)]
    homework: Homework,
    course_name: String,
    course_semester: Option<String>,
}

impl From<HomeworkCourseRow> for HomeworkView {
    fn from(row: HomeworkCourseRow) -> Self {
        let course = CourseRef {
            id: row.homework.course_id.clone(),
            name: row.course_name,
            semester: row.course_semester,
        };
        HomeworkView {
            homework: row.homework,
            course,
        }
    }
}

pub async fn fetch_homeworks(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<HomeworkView>, sqlx::Error> {
    let rows = sqlx::query_as::<_, HomeworkCourseRow>(
        "SELECT h.id, h.user_id, h.course_id, h.title, h.description, h.due_date, h.status, \
                h.grade, h.semester, h.created_at, h.updated_at, \
                c.name AS course_name, c.semester AS course_semester \
         FROM homeworks h \
         JOIN courses c ON c.id = h.course_id \
         WHERE h.user_id = ? \
         ORDER BY h.created_at",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(HomeworkView::from).collect())
}

pub async fn find_homework(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Homework>, sqlx::Error> {
    sqlx::query_as::<_, Homework>(&format!(
        "SELECT {HOMEWORK_COLUMNS} FROM homeworks WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_homework(
    db: &SqlitePool,
    user_id: &str,
    req: NewHomeworkRequest,
) -> Result<Homework, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO homeworks \
             (id, user_id, course_id, title, description, due_date, status, grade, semester, \
              created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, 'PENDING', NULL, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.course_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.due_date)
    .bind(&req.semester)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(Homework {
        id,
        user_id: user_id.to_string(),
        course_id: req.course_id,
        title: req.title,
        description: req.description,
        due_date: req.due_date,
        status: crate::models::AssignmentStatus::Pending,
        grade: None,
        semester: req.semester,
        created_at: now,
        updated_at: now,
    })
}

pub async fn update_homework(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
    req: UpdateHomeworkRequest,
) -> Result<Option<Homework>, sqlx::Error> {
    let mut current = match find_homework(db, user_id, id).await? {
        Some(hw) => hw,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(due_date) = req.due_date {
        current.due_date = due_date;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(grade) = req.grade {
        current.grade = Some(grade);
    }
    if let Some(semester) = req.semester {
        current.semester = Some(semester);
    }
    if let Some(description) = req.description {
        current.description = Some(description);
    }
    current.updated_at = Utc::now();

    sqlx::query(
        "UPDATE homeworks SET title = ?, description = ?, due_date = ?, status = ?, grade = ?, \
             semester = ?, updated_at = ? \
         WHERE id = ? AND user_id = ?",
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.due_date)
    .bind(current.status)
    .bind(current.grade)
    .bind(&current.semester)
    .bind(current.updated_at)
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_homework(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM homeworks WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Open homeworks across all users, for the periodic overdue sweep.
pub async fn fetch_open_homeworks(db: &SqlitePool) -> Result<Vec<Homework>, sqlx::Error> {
    sqlx::query_as::<_, Homework>(&format!(
        "SELECT {HOMEWORK_COLUMNS} FROM homeworks WHERE status IN ('PENDING', 'IN_PROGRESS')"
    ))
    .fetch_all(db)
    .await
}

/// Guarded transition: only still-open rows move to OVERDUE, so a concurrent
/// completion is never clobbered by the sweep.
pub async fn mark_homework_overdue(
    db: &SqlitePool,
    id: &str,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE homeworks SET status = 'OVERDUE', updated_at = ? \
         WHERE id = ? AND status IN ('PENDING', 'IN_PROGRESS')",
    )
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// exams

#[derive(sqlx::FromRow)]
struct ExamCourseRow {
    #[sqlx(flatten)]
    exam: Exam,
    course_name: String,
    course_semester: Option<String>,
}

impl From<ExamCourseRow> for ExamView {
    fn from(row: ExamCourseRow) -> Self {
        let course = CourseRef {
            id: row.exam.course_id.clone(),
            name: row.course_name,
            semester: row.course_semester,
        };
        ExamView {
            exam: row.exam,
            course,
        }
    }
}

pub async fn fetch_exams(db: &SqlitePool, user_id: &str) -> Result<Vec<ExamView>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ExamCourseRow>(
        "SELECT e.id, e.user_id, e.course_id, e.title, e.exam_type, e.location, e.duration, \
                e.exam_date, e.status, e.grade, e.semester, e.created_at, e.updated_at, \
                c.name AS course_name, c.semester AS course_semester \
         FROM exams e \
         JOIN courses c ON c.id = e.course_id \
         WHERE e.user_id = ? \
         ORDER BY e.created_at",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(ExamView::from).collect())
}

pub async fn find_exam(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {EXAM_COLUMNS} FROM exams WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_exam(
    db: &SqlitePool,
    user_id: &str,
    req: NewExamRequest,
) -> Result<Exam, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO exams \
             (id, user_id, course_id, title, exam_type, location, duration, exam_date, status, \
              grade, semester, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'PENDING', NULL, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.course_id)
    .bind(&req.title)
    .bind(&req.exam_type)
    .bind(&req.location)
    .bind(req.duration)
    .bind(req.exam_date)
    .bind(&req.semester)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(Exam {
        id,
        user_id: user_id.to_string(),
        course_id: req.course_id,
        title: req.title,
        exam_type: req.exam_type,
        location: req.location,
        duration: req.duration,
        exam_date: req.exam_date,
        status: crate::models::AssignmentStatus::Pending,
        grade: None,
        semester: req.semester,
        created_at: now,
        updated_at: now,
    })
}

pub async fn update_exam(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
    req: UpdateExamRequest,
) -> Result<Option<Exam>, sqlx::Error> {
    let mut current = match find_exam(db, user_id, id).await? {
        Some(exam) => exam,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(exam_date) = req.exam_date {
        current.exam_date = exam_date;
    }
    if let Some(exam_type) = req.exam_type {
        current.exam_type = Some(exam_type);
    }
    if let Some(location) = req.location {
        current.location = Some(location);
    }
    if let Some(duration) = req.duration {
        current.duration = Some(duration);
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(grade) = req.grade {
        current.grade = Some(grade);
    }
    if let Some(semester) = req.semester {
        current.semester = Some(semester);
    }
    current.updated_at = Utc::now();

    sqlx::query(
        "UPDATE exams SET title = ?, exam_type = ?, location = ?, duration = ?, exam_date = ?, \
             status = ?, grade = ?, semester = ?, updated_at = ? \
         WHERE id = ? AND user_id = ?",
    )
    .bind(&current.title)
    .bind(&current.exam_type)
    .bind(&current.location)
    .bind(current.duration)
    .bind(current.exam_date)
    .bind(current.status)
    .bind(current.grade)
    .bind(&current.semester)
    .bind(current.updated_at)
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_exam(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_open_exams(db: &SqlitePool) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {EXAM_COLUMNS} FROM exams WHERE status IN ('PENDING', 'IN_PROGRESS')"
    ))
    .fetch_all(db)
    .await
}

pub async fn mark_exam_overdue(
    db: &SqlitePool,
    id: &str,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE exams SET status = 'OVERDUE', updated_at = ? \
         WHERE id = ? AND status IN ('PENDING', 'IN_PROGRESS')",
    )
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// user semesters

pub async fn fetch_user_semesters(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<UserSemester>, sqlx::Error> {
    sqlx::query_as::<_, UserSemester>(
        "SELECT id, user_id, name, created_at FROM user_semesters \
         WHERE user_id = ? ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_user_semester(
    db: &SqlitePool,
    user_id: &str,
    name: &str,
) -> Result<Option<UserSemester>, sqlx::Error> {
    sqlx::query_as::<_, UserSemester>(
        "SELECT id, user_id, name, created_at FROM user_semesters \
         WHERE user_id = ? AND name = ?",
    )
    .bind(user_id)
    .bind(name)
    .fetch_optional(db)
    .await
}

pub async fn insert_user_semester(
    db: &SqlitePool,
    user_id: &str,
    name: &str,
) -> Result<UserSemester, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query("INSERT INTO user_semesters (id, user_id, name, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(now)
        .execute(db)
        .await?;

    Ok(UserSemester {
        id,
        user_id: user_id.to_string(),
        name: name.to_string(),
        created_at: now,
    })
}

pub async fn rename_user_semester(
    db: &SqlitePool,
    user_id: &str,
    old_name: &str,
    new_name: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE user_semesters SET name = ? WHERE user_id = ? AND name = ?")
        .bind(new_name)
        .bind(user_id)
        .bind(old_name)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_user_semester(
    db: &SqlitePool,
    user_id: &str,
    name: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_semesters WHERE user_id = ? AND name = ?")
        .bind(user_id)
        .bind(name)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_user_semesters(db: &SqlitePool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_semesters WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await
}

/// How many records still carry the label, counting the course fallback for
/// homeworks and exams the way the views resolve it.
pub async fn count_semester_usage(
    db: &SqlitePool,
    user_id: &str,
    label: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT \
             (SELECT COUNT(*) FROM courses \
              WHERE user_id = ?1 AND semester = ?2) \
           + (SELECT COUNT(*) FROM homeworks h JOIN courses c ON c.id = h.course_id \
              WHERE h.user_id = ?1 AND COALESCE(h.semester, c.semester) = ?2) \
           + (SELECT COUNT(*) FROM exams e JOIN courses c ON c.id = e.course_id \
              WHERE e.user_id = ?1 AND COALESCE(e.semester, c.semester) = ?2)",
    )
    .bind(user_id)
    .bind(label)
    .fetch_one(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentStatus, NewCourseRequest, NewHomeworkRequest};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    async fn seed_user(pool: &SqlitePool, email: &str) -> User {
        insert_user(pool, email, "hash", None)
            .await
            .expect("Failed to insert user")
    }

    fn course_req(name: &str, semester: Option<&str>) -> NewCourseRequest {
        NewCourseRequest {
            name: name.to_string(),
            semester: semester.map(|s| s.to_string()),
            color: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_course() {
        let pool = setup_test_db().await;
        let user = seed_user(&pool, "a@example.com").await;

        let course = insert_course(&pool, &user.id, course_req("Algorithms", Some("Fall 2024")))
            .await
            .expect("Failed to insert course");
        assert_eq!(course.name, "Algorithms");

        let courses = fetch_courses(&pool, &user.id)
            .await
            .expect("Failed to fetch courses");
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, course.id);
        assert_eq!(courses[0].semester.as_deref(), Some("Fall 2024"));
    }

    #[tokio::test]
    async fn test_homework_view_embeds_course() {
        let pool = setup_test_db().await;
        let user = seed_user(&pool, "a@example.com").await;
        let course = insert_course(&pool, &user.id, course_req("Algorithms", Some("Fall 2024")))
            .await
            .expect("Failed to insert course");

        let hw = insert_homework(
            &pool,
            &user.id,
            NewHomeworkRequest {
                title: "Problem set 1".to_string(),
                due_date: Utc::now(),
                course_id: course.id.clone(),
                description: None,
                semester: None,
            },
        )
        .await
        .expect("Failed to insert homework");
        assert_eq!(hw.status, AssignmentStatus::Pending);

        let views = fetch_homeworks(&pool, &user.id)
            .await
            .expect("Failed to fetch homeworks");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].course.name, "Algorithms");
        assert_eq!(views[0].course.semester.as_deref(), Some("Fall 2024"));
    }

    #[tokio::test]
    async fn test_update_homework_status_and_grade() {
        let pool = setup_test_db().await;
        let user = seed_user(&pool, "a@example.com").await;
        let course = insert_course(&pool, &user.id, course_req("Algorithms", None))
            .await
            .expect("Failed to insert course");
        let hw = insert_homework(
            &pool,
            &user.id,
            NewHomeworkRequest {
                title: "Problem set 1".to_string(),
                due_date: Utc::now(),
                course_id: course.id.clone(),
                description: None,
                semester: None,
            },
        )
        .await
        .expect("Failed to insert homework");

        let updated = update_homework(
            &pool,
            &user.id,
            &hw.id,
            UpdateHomeworkRequest {
                title: None,
                due_date: None,
                status: Some(AssignmentStatus::Completed),
                grade: Some(92.0),
                semester: None,
                description: None,
            },
        )
        .await
        .expect("Failed to update homework")
        .expect("Homework not found");

        assert_eq!(updated.status, AssignmentStatus::Completed);
        assert_eq!(updated.grade, Some(92.0));
    }

    #[tokio::test]
    async fn test_lookups_are_scoped_to_the_owner() {
        let pool = setup_test_db().await;
        let owner = seed_user(&pool, "owner@example.com").await;
        let other = seed_user(&pool, "other@example.com").await;
        let course = insert_course(&pool, &owner.id, course_req("Algorithms", None))
            .await
            .expect("Failed to insert course");

        assert!(find_course(&pool, &other.id, &course.id)
            .await
            .expect("query failed")
            .is_none());
        assert!(!delete_course(&pool, &other.id, &course.id)
            .await
            .expect("query failed"));
        // Still there for the owner.
        assert!(find_course(&pool, &owner.id, &course.id)
            .await
            .expect("query failed")
            .is_some());
    }

    #[tokio::test]
    async fn test_semester_usage_counts_the_course_fallback() {
        let pool = setup_test_db().await;
        let user = seed_user(&pool, "a@example.com").await;
        let course = insert_course(&pool, &user.id, course_req("Algorithms", Some("Fall 2024")))
            .await
            .expect("Failed to insert course");
        insert_homework(
            &pool,
            &user.id,
            NewHomeworkRequest {
                title: "Inherits the course label".to_string(),
                due_date: Utc::now(),
                course_id: course.id.clone(),
                description: None,
                semester: None,
            },
        )
        .await
        .expect("Failed to insert homework");

        // Course + homework-through-fallback.
        let used = count_semester_usage(&pool, &user.id, "Fall 2024")
            .await
            .expect("query failed");
        assert_eq!(used, 2);

        let unused = count_semester_usage(&pool, &user.id, "Spring 2025")
            .await
            .expect("query failed");
        assert_eq!(unused, 0);
    }

    #[tokio::test]
    async fn test_mark_overdue_leaves_closed_rows_alone() {
        let pool = setup_test_db().await;
        let user = seed_user(&pool, "a@example.com").await;
        let course = insert_course(&pool, &user.id, course_req("Algorithms", None))
            .await
            .expect("Failed to insert course");
        let hw = insert_homework(
            &pool,
            &user.id,
            NewHomeworkRequest {
                title: "Problem set 1".to_string(),
                due_date: Utc::now(),
                course_id: course.id.clone(),
                description: None,
                semester: None,
            },
        )
        .await
        .expect("Failed to insert homework");

        assert!(mark_homework_overdue(&pool, &hw.id, Utc::now())
            .await
            .expect("query failed"));
        // Already OVERDUE: the guard makes the second attempt a no-op.
        assert!(!mark_homework_overdue(&pool, &hw.id, Utc::now())
            .await
            .expect("query failed"));
    }
}
