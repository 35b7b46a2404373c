use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::exam::{Exam, ExamView};
use crate::models::homework::{Homework, HomeworkView};

/// Shared lifecycle of homeworks and exams. Users move items freely between
/// PENDING, IN_PROGRESS and COMPLETED; the background sweep moves open items
/// to OVERDUE once their due date passes. Nothing automatic ever leaves
/// COMPLETED or OVERDUE.
///
/// Variant order is the display order used when sorting by status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl AssignmentStatus {
    /// True for the two states the automatic overdue transition never touches.
    pub fn is_closed(self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Overdue)
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AssignmentStatus::Pending),
            "IN_PROGRESS" => Ok(AssignmentStatus::InProgress),
            "COMPLETED" => Ok(AssignmentStatus::Completed),
            "OVERDUE" => Ok(AssignmentStatus::Overdue),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    Homework,
    Exam,
}

/// Unified view over homeworks and exams: one record shape with a normalized
/// due date, used by filtering, sorting, statistics and the calendar.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub kind: AssignmentKind,
    pub title: String,
    pub course_id: String,
    pub course_name: Option<String>,
    pub course_semester: Option<String>,
    pub semester: Option<String>,
    pub due_date: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub grade: Option<f64>,
}

impl Assignment {
    /// The one place the semester fallback lives: the item's own label wins,
    /// otherwise the owning course's label applies.
    pub fn effective_semester(&self) -> Option<&str> {
        self.semester.as_deref().or(self.course_semester.as_deref())
    }

    pub fn course_label(&self) -> &str {
        self.course_name.as_deref().unwrap_or("Unknown Course")
    }
}

impl From<&HomeworkView> for Assignment {
    fn from(view: &HomeworkView) -> Self {
        let mut assignment = Assignment::from(&view.homework);
        assignment.course_name = Some(view.course.name.clone());
        assignment.course_semester = view.course.semester.clone();
        assignment
    }
}

impl From<&Homework> for Assignment {
    fn from(hw: &Homework) -> Self {
        Self {
            id: hw.id.clone(),
            kind: AssignmentKind::Homework,
            title: hw.title.clone(),
            course_id: hw.course_id.clone(),
            course_name: None,
            course_semester: None,
            semester: hw.semester.clone(),
            due_date: hw.due_date,
            status: hw.status,
            grade: hw.grade,
        }
    }
}

impl From<&ExamView> for Assignment {
    fn from(view: &ExamView) -> Self {
        let mut assignment = Assignment::from(&view.exam);
        assignment.course_name = Some(view.course.name.clone());
        assignment.course_semester = view.course.semester.clone();
        assignment
    }
}

impl From<&Exam> for Assignment {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id.clone(),
            kind: AssignmentKind::Exam,
            title: exam.title.clone(),
            course_id: exam.course_id.clone(),
            course_name: None,
            course_semester: None,
            semester: exam.semester.clone(),
            due_date: exam.exam_date,
            status: exam.status,
            grade: exam.grade,
        }
    }
}

/// Collapse homework and exam views into one assignment list, homeworks
/// first, preserving each list's order.
pub fn merge_views(homeworks: &[HomeworkView], exams: &[ExamView]) -> Vec<Assignment> {
    homeworks
        .iter()
        .map(Assignment::from)
        .chain(exams.iter().map(Assignment::from))
        .collect()
}
