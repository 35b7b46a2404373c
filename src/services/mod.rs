pub mod dashboard;
pub mod overdue;
pub mod semesters;

pub use dashboard::{DashboardSnapshot, SnapshotCache};
pub use overdue::{OverdueSweeper, SweepStats};
