use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user-declared term label, independent of whether any record uses it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSemester {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SemesterNameRequest {
    pub name: String,
}

/// The full registry view: every known label plus the active selection
/// ("all" when no filter is in effect).
#[derive(Debug, Clone, Serialize)]
pub struct SemesterOverview {
    pub semesters: Vec<String>,
    pub selected: String,
}
