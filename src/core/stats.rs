use crate::core::expenses::split_by_type;
use crate::core::schedule::count_events_after;
use crate::domain::model::{Event, Expense, Task};
use crate::domain::views::DashboardStats;
use chrono::NaiveDateTime;

/// Summary counters for the dashboard landing page.
///
/// Each counter only looks at its own collection, so an empty collection
/// (for instance one that failed to load) zeroes its counters and nothing
/// else.
pub fn compute_dashboard_stats(
    tasks: &[Task],
    expenses: &[Expense],
    events: &[Event],
    now: NaiveDateTime,
) -> DashboardStats {
    let totals = split_by_type(expenses);

    DashboardStats {
        total_tasks: tasks.len(),
        completed_tasks: tasks.iter().filter(|task| task.completed).count(),
        total_expenses: totals.expense,
        total_income: totals.income,
        upcoming_events: count_events_after(events, now),
    }
}
