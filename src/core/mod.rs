pub mod etl;
pub mod expenses;
pub mod pipeline;
pub mod schedule;
pub mod stats;

pub use crate::domain::ports::{ConfigProvider, Pipeline, SessionProvider, Storage};
pub use crate::domain::views::{CategoryBreakdown, DashboardReport, DashboardStats};
pub use crate::utils::error::Result;
pub use expenses::aggregate_expenses_by_category;
pub use schedule::compute_upcoming_events;
pub use stats::compute_dashboard_stats;
