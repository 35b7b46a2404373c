//! Filtering, sorting and statistics over the unified assignment view.
//!
//! Everything here is a pure function over in-memory collections with the
//! clock passed in explicitly, so the logic is testable without the HTTP
//! layer or the store.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Assignment, AssignmentStatus};

/// Days ahead the dashboard's upcoming view looks.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

/// A conjunction of independent predicates. `None` means "no filter" for the
/// optional fields (the "all" selection at the API surface).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentFilter {
    pub semester: Option<String>,
    pub status: Option<AssignmentStatus>,
    pub course_id: Option<String>,
    pub hide_completed: bool,
}

impl AssignmentFilter {
    /// A COMPLETED status filter combined with `hide_completed` can only ever
    /// produce an empty list, so the status filter is dropped instead.
    pub fn normalized(mut self) -> Self {
        if self.hide_completed && self.status == Some(AssignmentStatus::Completed) {
            self.status = None;
        }
        self
    }

    fn matches(&self, item: &Assignment) -> bool {
        if let Some(semester) = self.semester.as_deref() {
            if item.effective_semester() != Some(semester) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if item.status != status {
                return false;
            }
        }
        if let Some(course_id) = self.course_id.as_deref() {
            if item.course_id != course_id {
                return false;
            }
        }
        if self.hide_completed && item.status == AssignmentStatus::Completed {
            return false;
        }
        true
    }
}

pub fn filter_assignments(items: &[Assignment], filter: AssignmentFilter) -> Vec<Assignment> {
    let filter = filter.normalized();
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    DueDate,
    Title,
    Course,
    Status,
    Grade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascend,
    Descend,
}

/// Stable sort: equal keys keep their relative input order. Descending is
/// the element-wise reverse of the ascending result rather than a second
/// comparator.
pub fn sort_assignments(items: &[Assignment], key: SortKey, order: SortOrder) -> Vec<Assignment> {
    let mut sorted: Vec<Assignment> = items.to_vec();
    sorted.sort_by(|a, b| compare_by(a, b, key));
    if order == SortOrder::Descend {
        sorted.reverse();
    }
    sorted
}

fn compare_by(a: &Assignment, b: &Assignment, key: SortKey) -> Ordering {
    match key {
        SortKey::DueDate => a.due_date.cmp(&b.due_date),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Course => a
            .course_label()
            .to_lowercase()
            .cmp(&b.course_label().to_lowercase()),
        SortKey::Status => a.status.cmp(&b.status),
        // Missing grades order as zero.
        SortKey::Grade => a.grade.unwrap_or(0.0).total_cmp(&b.grade.unwrap_or(0.0)),
    }
}

/// Items the automatic sweep should move to OVERDUE: open (not COMPLETED,
/// not already OVERDUE) and past due.
pub fn derive_overdue<'a>(items: &'a [Assignment], now: DateTime<Utc>) -> Vec<&'a Assignment> {
    items
        .iter()
        .filter(|item| !item.status.is_closed() && item.due_date < now)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
    /// completed / total * 100; 0 when there is nothing to complete.
    pub completion_rate: f64,
    /// Mean of exam grades that are set; 0 when no exam is graded.
    pub average_grade: f64,
    pub upcoming_count: usize,
}

pub fn compute_statistics(
    homeworks: &[Assignment],
    exams: &[Assignment],
    now: DateTime<Utc>,
) -> Statistics {
    let mut stats = Statistics {
        total: 0,
        pending: 0,
        in_progress: 0,
        completed: 0,
        overdue: 0,
        completion_rate: 0.0,
        average_grade: 0.0,
        upcoming_count: 0,
    };

    for item in homeworks.iter().chain(exams) {
        stats.total += 1;
        match item.status {
            AssignmentStatus::Pending => stats.pending += 1,
            AssignmentStatus::InProgress => stats.in_progress += 1,
            AssignmentStatus::Completed => stats.completed += 1,
            AssignmentStatus::Overdue => stats.overdue += 1,
        }
        if item.due_date > now {
            stats.upcoming_count += 1;
        }
    }

    if stats.total > 0 {
        stats.completion_rate = stats.completed as f64 / stats.total as f64 * 100.0;
    }

    let graded: Vec<f64> = exams.iter().filter_map(|exam| exam.grade).collect();
    if !graded.is_empty() {
        stats.average_grade = graded.iter().sum::<f64>() / graded.len() as f64;
    }

    stats
}

/// Items due within `[now, now + window_days]`, ascending by date, grouped by
/// course name ("Unknown Course" when the reference cannot be resolved).
pub fn group_upcoming_by_course(
    items: &[Assignment],
    now: DateTime<Utc>,
    window_days: i64,
) -> BTreeMap<String, Vec<Assignment>> {
    let horizon = now + Duration::days(window_days);
    let mut upcoming: Vec<Assignment> = items
        .iter()
        .filter(|item| item.due_date >= now && item.due_date <= horizon)
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| a.due_date.cmp(&b.due_date));

    let mut groups: BTreeMap<String, Vec<Assignment>> = BTreeMap::new();
    for item in upcoming {
        groups
            .entry(item.course_label().to_string())
            .or_default()
            .push(item);
    }
    groups
}
