use crate::domain::model::{Event, Expense, Task, UserProfile};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub total: Decimal,
    pub by_category: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeTotals {
    pub expense: Decimal,
    pub income: Decimal,
}

impl TypeTotals {
    pub fn net(&self) -> Decimal {
        self.income.checked_sub(self.expense).unwrap_or(if self.expense.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub total_expenses: Decimal,
    pub total_income: Decimal,
    pub upcoming_events: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Tasks,
    Expenses,
    Events,
}

impl Collection {
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Expenses => "expenses",
            Collection::Events => "events",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Collections fetched for one report run.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub user: Option<UserProfile>,
    pub tasks: Vec<Task>,
    pub expenses: Vec<Expense>,
    pub events: Vec<Event>,
    /// Collections that failed to load and were replaced by empty ones.
    pub unavailable: Vec<Collection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub generated_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub stats: DashboardStats,
    pub expenses: CategoryBreakdown,
    pub upcoming_events: Vec<Event>,
    #[serde(default)]
    pub unavailable: Vec<Collection>,
}
