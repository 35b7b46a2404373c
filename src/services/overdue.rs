//! Automatic overdue transitions.
//!
//! Runs once at startup and then on a fixed interval. Each marked item is an
//! independent store update: a failure is logged and skipped, never aborting
//! the rest of the sweep or the loop itself.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::aggregator::derive_overdue;
use crate::db::repository;
use crate::error::AppError;
use crate::models::Assignment;

pub struct OverdueSweeper {
    db: SqlitePool,
    interval: Duration,
}

#[derive(Debug, Default, Serialize)]
pub struct SweepStats {
    pub homeworks_marked: usize,
    pub exams_marked: usize,
    pub failed: usize,
}

impl SweepStats {
    fn touched(&self) -> usize {
        self.homeworks_marked + self.exams_marked + self.failed
    }
}

impl OverdueSweeper {
    pub fn new(db: SqlitePool, interval_secs: u64) -> Self {
        Self {
            db,
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub async fn start(self) {
        info!("Starting overdue sweeper (interval: {:?})", self.interval);

        loop {
            match self.sweep_once(Utc::now()).await {
                Ok(stats) if stats.touched() > 0 => {
                    info!(
                        "Overdue sweep marked {} homeworks, {} exams ({} failed)",
                        stats.homeworks_marked, stats.exams_marked, stats.failed
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Overdue sweep failed: {:?}", e);
                    // Retried on the next tick.
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<SweepStats, AppError> {
        let mut stats = SweepStats::default();

        let homeworks = repository::fetch_open_homeworks(&self.db).await?;
        let candidates: Vec<Assignment> = homeworks.iter().map(Assignment::from).collect();
        for item in derive_overdue(&candidates, now) {
            match repository::mark_homework_overdue(&self.db, &item.id, now).await {
                Ok(true) => stats.homeworks_marked += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to mark homework {} overdue: {}", item.id, e);
                    stats.failed += 1;
                }
            }
        }

        let exams = repository::fetch_open_exams(&self.db).await?;
        let candidates: Vec<Assignment> = exams.iter().map(Assignment::from).collect();
        for item in derive_overdue(&candidates, now) {
            match repository::mark_exam_overdue(&self.db, &item.id, now).await {
                Ok(true) => stats.exams_marked += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to mark exam {} overdue: {}", item.id, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}
