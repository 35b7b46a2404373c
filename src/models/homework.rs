use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::assignment::AssignmentStatus;
use crate::models::course::CourseRef;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub grade: Option<f64>,
    /// Term override; when absent the owning course's semester applies.
    pub semester: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A homework together with its owning course, as returned by list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct HomeworkView {
    #[serde(flatten)]
    pub homework: Homework,
    pub course: CourseRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHomeworkRequest {
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub course_id: String,
    pub description: Option<String>,
    pub semester: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHomeworkRequest {
    pub title: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<AssignmentStatus>,
    pub grade: Option<f64>,
    pub semester: Option<String>,
    pub description: Option<String>,
}
