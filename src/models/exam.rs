use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::assignment::AssignmentStatus;
use crate::models::course::CourseRef;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub title: String,
    /// Free text (Midterm, Final, Quiz, ...).
    pub exam_type: Option<String>,
    pub location: Option<String>,
    /// Minutes.
    pub duration: Option<i64>,
    pub exam_date: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub grade: Option<f64>,
    pub semester: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamView {
    #[serde(flatten)]
    pub exam: Exam,
    pub course: CourseRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExamRequest {
    pub title: String,
    pub exam_date: DateTime<Utc>,
    pub course_id: String,
    pub exam_type: Option<String>,
    pub location: Option<String>,
    pub duration: Option<i64>,
    pub semester: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamRequest {
    pub title: Option<String>,
    pub exam_date: Option<DateTime<Utc>>,
    pub exam_type: Option<String>,
    pub location: Option<String>,
    pub duration: Option<i64>,
    pub status: Option<AssignmentStatus>,
    pub grade: Option<f64>,
    pub semester: Option<String>,
}
