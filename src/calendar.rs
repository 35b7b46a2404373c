//! Month-grid construction for the calendar view.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::AppError;
use crate::models::Assignment;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

/// Builds the grid a month view renders: it starts on the Sunday on or
/// before the 1st and ends on the Saturday on or after the last day of the
/// month, so its length is always a multiple of 7. Each cell carries the
/// assignments due on that calendar date (UTC), ordered by time.
pub fn build_calendar_index(
    items: &[Assignment],
    month: u32,
    year: i32,
) -> Result<CalendarMonth, AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("Invalid month: {month}/{year}")))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::Validation(format!("Invalid month: {month}/{year}")))?;
    let last = next_month - Duration::days(1);

    let grid_start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);
    let grid_end = last + Duration::days((6 - last.weekday().num_days_from_sunday()) as i64);

    let mut by_date: BTreeMap<NaiveDate, Vec<Assignment>> = BTreeMap::new();
    for item in items {
        by_date
            .entry(item.due_date.date_naive())
            .or_default()
            .push(item.clone());
    }
    for cell in by_date.values_mut() {
        cell.sort_by(|a, b| a.due_date.cmp(&b.due_date));
    }

    let mut days = Vec::new();
    let mut date = grid_start;
    while date <= grid_end {
        days.push(CalendarDay {
            date,
            in_month: date.month() == month && date.year() == year,
            assignments: by_date.remove(&date).unwrap_or_default(),
        });
        date += Duration::days(1);
    }

    Ok(CalendarMonth { year, month, days })
}
