use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}' (low, medium, high)", other)),
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(alias = "_id")]
    pub id: String,
    pub filename: String,
    pub filepath: String,
    pub filetype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 原樣保留 API 回傳的日期字串
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseType {
    #[default]
    #[serde(alias = "expense")]
    Expense,
    #[serde(alias = "income")]
    Income,
}

impl FromStr for ExpenseType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(ExpenseType::Expense),
            "income" => Ok(ExpenseType::Income),
            other => Err(format!("unknown entry type '{}' (expense, income)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(alias = "_id")]
    pub id: String,
    pub amount: Decimal,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ExpenseType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Meeting,
    Personal,
    Work,
    /// Also catches types this client doesn't know yet.
    #[default]
    #[serde(other)]
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Meeting => "meeting",
            EventType::Personal => "personal",
            EventType::Work => "work",
            EventType::Other => "other",
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meeting" => Ok(EventType::Meeting),
            "personal" => Ok(EventType::Personal),
            "work" => Ok(EventType::Work),
            "other" => Ok(EventType::Other),
            other => Err(format!(
                "unknown event type '{}' (meeting, personal, work, other)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(rename = "type", default)]
    pub kind: EventType,
    /// Some API versions send a single timestamp instead of date + time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
}

const START_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

impl Event {
    /// The instant used for chronological comparison.
    ///
    /// `date` + `time` win when both are present. Otherwise `start` is tried,
    /// as RFC 3339 (wall-clock time in its own offset) or as a naive ISO
    /// timestamp. `None` means the event is malformed and can't be ordered.
    pub fn instant(&self) -> Option<NaiveDateTime> {
        if !self.date.trim().is_empty() && !self.time.trim().is_empty() {
            let date = NaiveDate::parse_from_str(self.date.trim(), validation::DATE_FORMAT).ok()?;
            let time = parse_event_time(&self.time)?;
            return Some(date.and_time(time));
        }

        let start = self.start.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(start) {
            return Some(dt.naive_local());
        }
        START_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(start, format).ok())
    }
}

fn parse_event_time(raw: &str) -> Option<NaiveTime> {
    validation::parse_time("time", raw).ok()
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Capitalize the first letter and lowercase the rest, e.g. `"food"` → `"Food"`.
pub fn normalize_category(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Task create/edit form. Sent as `multipart/form-data`; attachments are
/// not uploaded from here.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<String>,
    pub priority: Priority,
}

impl Validate for NewTask {
    fn validate(&self) -> Result<()> {
        validation::require_text("title", &self.title)?;
        if let Some(due) = &self.due_date {
            validation::parse_date("dueDate", due)?;
        }
        Ok(())
    }
}

impl NewTask {
    /// Text fields in the order the web form appends them. A missing due date
    /// is sent empty.
    pub fn form_fields(&self) -> [(&'static str, String); 4] {
        [
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("dueDate", self.due_date.clone().unwrap_or_default()),
            ("priority", self.priority.as_str().to_string()),
        ]
    }

    /// Form prefilled from an existing task, as the edit dialog shows it.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task
                .due_date
                .as_deref()
                .and_then(|due| due.split('T').next())
                .filter(|due| !due.is_empty())
                .map(str::to_string),
            priority: task.priority,
        }
    }
}

/// JSON body of the completion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskUpdate {
    pub completed: bool,
}

impl TaskUpdate {
    pub fn completion(completed: bool) -> Self {
        Self { completed }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: ExpenseType,
}

impl NewExpense {
    /// Builds an `Expense`-typed entry with the category normalized.
    pub fn new(amount: Decimal, description: impl Into<String>, category: &str) -> Self {
        Self {
            amount,
            description: description.into(),
            category: normalize_category(category),
            date: None,
            kind: ExpenseType::Expense,
        }
    }

    pub fn with_kind(mut self, kind: ExpenseType) -> Self {
        self.kind = kind;
        self
    }

    pub fn on(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

impl Validate for NewExpense {
    fn validate(&self) -> Result<()> {
        validation::validate_amount("amount", self.amount)?;
        validation::require_text("description", &self.description)?;
        validation::require_text("category", &self.category)?;
        if let Some(date) = &self.date {
            validation::parse_date("date", date)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: EventType,
}

impl From<&Event> for NewEvent {
    /// Start-only events get their date and time split out of `start`.
    fn from(event: &Event) -> Self {
        let (date, time) = if event.date.trim().is_empty() || event.time.trim().is_empty() {
            match event.instant() {
                Some(instant) => (
                    instant.format(validation::DATE_FORMAT).to_string(),
                    instant.format("%H:%M").to_string(),
                ),
                None => (event.date.clone(), event.time.clone()),
            }
        } else {
            (event.date.clone(), event.time.clone())
        };

        Self {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            date,
            time,
            kind: event.kind,
        }
    }
}

impl Validate for NewEvent {
    fn validate(&self) -> Result<()> {
        validation::require_text("title", &self.title)?;
        validation::parse_date("date", &self.date)?;
        validation::parse_time("time", &self.time)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
