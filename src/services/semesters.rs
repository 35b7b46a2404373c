//! The semester registry: one coherent list of term labels per user, and the
//! rules guarding changes to it.
//!
//! Labels are denormalized strings, so the effective set is the union of what
//! the user declared and what their records actually carry. Renaming a
//! registered label deliberately does not touch records that reference the
//! old string; they keep showing up under the old label as a discovered
//! entry.

use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Assignment, Course, SemesterOverview, UserSemester, merge_views};

/// The selection value that means "no semester filter".
pub const ALL_SEMESTERS: &str = "all";

/// Trims a label; empty and whitespace-only collapse to `None`.
pub fn normalize_label(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Union of declared labels and labels discovered on records: declared
/// entries first in insertion order, then discovered labels in data order
/// (courses before assignments; pass assignments homeworks-first). Duplicates
/// and blank labels are dropped, and "all" never appears as a member.
pub fn resolve_semester_set(
    user_semesters: &[UserSemester],
    courses: &[Course],
    assignments: &[Assignment],
) -> Vec<String> {
    fn push(labels: &mut Vec<String>, label: &str) {
        let label = label.trim();
        if label.is_empty() || label == ALL_SEMESTERS {
            return;
        }
        if !labels.iter().any(|known| known == label) {
            labels.push(label.to_string());
        }
    }

    let mut labels: Vec<String> = Vec::new();
    for semester in user_semesters {
        push(&mut labels, &semester.name);
    }
    for course in courses {
        if let Some(label) = course.semester.as_deref() {
            push(&mut labels, label);
        }
    }
    for assignment in assignments {
        if let Some(label) = assignment.effective_semester() {
            push(&mut labels, label);
        }
    }

    labels
}

async fn resolved_set(db: &SqlitePool, user_id: &str) -> Result<Vec<String>, AppError> {
    let user_semesters = repository::fetch_user_semesters(db, user_id).await?;
    let courses = repository::fetch_courses(db, user_id).await?;
    let homeworks = repository::fetch_homeworks(db, user_id).await?;
    let exams = repository::fetch_exams(db, user_id).await?;
    let assignments = merge_views(&homeworks, &exams);
    Ok(resolve_semester_set(&user_semesters, &courses, &assignments))
}

pub async fn semester_overview(
    db: &SqlitePool,
    user_id: &str,
) -> Result<SemesterOverview, AppError> {
    let semesters = resolved_set(db, user_id).await?;
    let selected = repository::find_user_by_id(db, user_id)
        .await?
        .and_then(|user| user.selected_semester)
        .unwrap_or_else(|| ALL_SEMESTERS.to_string());
    Ok(SemesterOverview {
        semesters,
        selected,
    })
}

pub async fn add_semester(
    db: &SqlitePool,
    user_id: &str,
    name: String,
) -> Result<UserSemester, AppError> {
    let name = normalize_label(Some(name))
        .ok_or_else(|| AppError::Validation("Semester name cannot be empty".to_string()))?;
    if repository::find_user_semester(db, user_id, &name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Semester already exists".to_string()));
    }
    let semester = repository::insert_user_semester(db, user_id, &name).await?;
    info!("registered semester {:?}", semester.name);
    Ok(semester)
}

pub async fn rename_semester(
    db: &SqlitePool,
    user_id: &str,
    old_name: &str,
    new_name: String,
) -> Result<UserSemester, AppError> {
    let new_name = normalize_label(Some(new_name))
        .ok_or_else(|| AppError::Validation("Semester name cannot be empty".to_string()))?;
    let existing = repository::find_user_semester(db, user_id, old_name)
        .await?
        .ok_or(AppError::NotFound)?;
    if new_name != existing.name
        && repository::find_user_semester(db, user_id, &new_name)
            .await?
            .is_some()
    {
        return Err(AppError::Conflict("Semester already exists".to_string()));
    }

    // Records carrying the old label keep it; only the registry entry moves.
    repository::rename_user_semester(db, user_id, old_name, &new_name).await?;
    repository::find_user_semester(db, user_id, &new_name)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn delete_semester(db: &SqlitePool, user_id: &str, name: &str) -> Result<(), AppError> {
    repository::find_user_semester(db, user_id, name)
        .await?
        .ok_or(AppError::NotFound)?;
    if repository::count_semester_usage(db, user_id, name).await? > 0 {
        return Err(AppError::Conflict(
            "Cannot delete semester with existing data".to_string(),
        ));
    }
    if repository::count_user_semesters(db, user_id).await? <= 1 {
        return Err(AppError::Conflict(
            "Cannot delete the only semester".to_string(),
        ));
    }
    repository::delete_user_semester(db, user_id, name).await?;
    info!("deleted semester {:?}", name);
    Ok(())
}

/// Marks the label every filtered view is scoped to. "all" clears the
/// scoping; any other label must be a member of the resolved set.
pub async fn select_semester(db: &SqlitePool, user_id: &str, name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name == ALL_SEMESTERS {
        repository::set_selected_semester(db, user_id, None).await?;
        return Ok(());
    }
    let known = resolved_set(db, user_id).await?;
    if !known.iter().any(|label| label == name) {
        return Err(AppError::NotFound);
    }
    repository::set_selected_semester(db, user_id, Some(name)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentKind, AssignmentStatus};
    use chrono::Utc;

    fn declared(name: &str) -> UserSemester {
        UserSemester {
            id: name.to_string(),
            user_id: "u1".to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn course(semester: Option<&str>) -> Course {
        Course {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            name: "Algorithms".to_string(),
            semester: semester.map(|s| s.to_string()),
            color: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assignment(semester: Option<&str>, course_semester: Option<&str>) -> Assignment {
        Assignment {
            id: "a1".to_string(),
            kind: AssignmentKind::Homework,
            title: "hw".to_string(),
            course_id: "c1".to_string(),
            course_name: Some("Algorithms".to_string()),
            course_semester: course_semester.map(|s| s.to_string()),
            semester: semester.map(|s| s.to_string()),
            due_date: Utc::now(),
            status: AssignmentStatus::Pending,
            grade: None,
        }
    }

    #[test]
    fn declared_labels_come_first_then_discovered() {
        let set = resolve_semester_set(
            &[declared("Fall 2024"), declared("Spring 2025")],
            &[course(Some("Winter 2023"))],
            &[assignment(Some("Summer 2024"), None)],
        );
        assert_eq!(
            set,
            vec!["Fall 2024", "Spring 2025", "Winter 2023", "Summer 2024"]
        );
    }

    #[test]
    fn duplicates_and_blanks_are_dropped() {
        let set = resolve_semester_set(
            &[declared("Fall 2024")],
            &[course(Some("Fall 2024")), course(Some("  "))],
            &[assignment(None, Some("Fall 2024"))],
        );
        assert_eq!(set, vec!["Fall 2024"]);
    }

    #[test]
    fn all_is_never_a_member() {
        let set = resolve_semester_set(&[], &[course(Some("all"))], &[]);
        assert!(set.is_empty());
    }

    #[test]
    fn assignment_override_beats_course_label() {
        let set = resolve_semester_set(
            &[],
            &[],
            &[assignment(Some("Override"), Some("Inherited"))],
        );
        assert_eq!(set, vec!["Override"]);
    }

    #[test]
    fn normalize_label_trims_and_rejects_blank() {
        assert_eq!(
            normalize_label(Some("  Fall 2024 ".to_string())),
            Some("Fall 2024".to_string())
        );
        assert_eq!(normalize_label(Some("   ".to_string())), None);
        assert_eq!(normalize_label(None), None);
    }
}
