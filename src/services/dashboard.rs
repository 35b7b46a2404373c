//! Dashboard snapshots: aggregate statistics plus the upcoming-deadline
//! groups, cached per user behind a freshness window so a page that polls
//! does not recompute on every hit. A forced refresh bypasses the window.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::aggregator::{self, Statistics, UPCOMING_WINDOW_DAYS};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Assignment, merge_views};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub statistics: Statistics,
    pub upcoming: BTreeMap<String, Vec<Assignment>>,
    pub generated_at: DateTime<Utc>,
}

pub struct SnapshotCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, DashboardSnapshot)>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get_fresh(&self, user_id: &str) -> Option<DashboardSnapshot> {
        let entries = self.entries.lock().ok()?;
        let (stored_at, snapshot) = entries.get(user_id)?;
        if stored_at.elapsed() < self.ttl {
            Some(snapshot.clone())
        } else {
            None
        }
    }

    fn store(&self, user_id: &str, snapshot: DashboardSnapshot) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(user_id.to_string(), (Instant::now(), snapshot));
        }
    }
}

pub async fn dashboard(
    db: &SqlitePool,
    cache: &SnapshotCache,
    user_id: &str,
    force: bool,
    now: DateTime<Utc>,
) -> Result<DashboardSnapshot, AppError> {
    if !force {
        if let Some(snapshot) = cache.get_fresh(user_id) {
            return Ok(snapshot);
        }
    }

    let homeworks = repository::fetch_homeworks(db, user_id).await?;
    let exams = repository::fetch_exams(db, user_id).await?;

    let homework_items: Vec<Assignment> = homeworks.iter().map(Assignment::from).collect();
    let exam_items: Vec<Assignment> = exams.iter().map(Assignment::from).collect();
    let statistics = aggregator::compute_statistics(&homework_items, &exam_items, now);

    let all = merge_views(&homeworks, &exams);
    let upcoming = aggregator::group_upcoming_by_course(&all, now, UPCOMING_WINDOW_DAYS);

    let snapshot = DashboardSnapshot {
        statistics,
        upcoming,
        generated_at: now,
    };
    cache.store(user_id, snapshot.clone());
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Statistics;

    fn snapshot(at: DateTime<Utc>) -> DashboardSnapshot {
        DashboardSnapshot {
            statistics: Statistics {
                total: 0,
                pending: 0,
                in_progress: 0,
                completed: 0,
                overdue: 0,
                completion_rate: 0.0,
                average_grade: 0.0,
                upcoming_count: 0,
            },
            upcoming: BTreeMap::new(),
            generated_at: at,
        }
    }

    #[test]
    fn fresh_entry_is_served_until_ttl_expires() {
        let cache = SnapshotCache::new(Duration::from_secs(30));
        let stored = snapshot(Utc::now());
        cache.store("u1", stored.clone());
        let hit = cache.get_fresh("u1").expect("entry should be fresh");
        assert_eq!(hit.generated_at, stored.generated_at);
        assert!(cache.get_fresh("u2").is_none());
    }

    #[test]
    fn zero_ttl_never_serves_a_cached_entry() {
        let cache = SnapshotCache::new(Duration::from_secs(0));
        cache.store("u1", snapshot(Utc::now()));
        assert!(cache.get_fresh("u1").is_none());
    }
}
