use crate::adapters::http::ApiClient;
use crate::core::expenses::{aggregate_expenses_by_category, round_for_display};
use crate::core::schedule::compute_upcoming_events;
use crate::core::stats::compute_dashboard_stats;
use crate::core::{ConfigProvider, Pipeline, SessionProvider, Storage};
use crate::domain::model::Event;
use crate::domain::views::{
    CategoryBreakdown, Collection, DashboardReport, DashboardSnapshot,
};
use crate::utils::error::{DashError, Result};
use chrono::NaiveDateTime;
use std::io::Write;
use std::time::Duration;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_JSON: &str = "dashboard.json";
pub const EXPENSES_CSV: &str = "expenses_by_category.csv";
pub const UPCOMING_CSV: &str = "upcoming_events.csv";

pub struct DashboardPipeline<S: Storage, C: ConfigProvider, P: SessionProvider> {
    storage: S,
    config: C,
    session: P,
    client: ApiClient,
}

impl<S: Storage, C: ConfigProvider, P: SessionProvider> DashboardPipeline<S, C, P> {
    pub fn new(storage: S, config: C, session: P) -> Result<Self> {
        let client = ApiClient::new(
            config.api_base_url(),
            Duration::from_secs(config.request_timeout_secs()),
        )?
        .with_session(&session);

        Ok(Self {
            storage,
            config,
            session,
            client,
        })
    }

    /// 將報表轉成各輸出格式的 (檔名, 內容)
    fn render(&self, report: &DashboardReport) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let mut files = Vec::new();

        for format in self.config.output_formats() {
            match format.as_str() {
                "json" => {
                    let json = serde_json::to_vec_pretty(report)?;
                    files.push((REPORT_JSON, json));
                }
                "csv" => {
                    files.push((EXPENSES_CSV, expenses_csv(&report.expenses)?));
                    files.push((UPCOMING_CSV, upcoming_csv(&report.upcoming_events)?));
                }
                other => {
                    return Err(DashError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "supported formats are json and csv".to_string(),
                    })
                }
            }
        }

        Ok(files)
    }
}

fn unwrap_or_degrade<T>(
    collection: Collection,
    result: Result<Vec<T>>,
    unavailable: &mut Vec<Collection>,
) -> Vec<T> {
    match result {
        Ok(items) => {
            tracing::debug!("Fetched {} {}", items.len(), collection);
            items
        }
        Err(e) => {
            tracing::warn!("⚠️ Could not load {}, using an empty list: {}", collection, e);
            unavailable.push(collection);
            Vec::new()
        }
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| DashError::IoError(e.into_error()))
}

fn expenses_csv(breakdown: &CategoryBreakdown) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["category", "amount"])?;
    for (category, amount) in &breakdown.by_category {
        writer.write_record([category.clone(), format!("{:.2}", round_for_display(*amount))])?;
    }
    finish_csv(writer)
}

fn upcoming_csv(events: &[Event]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["date", "time", "title", "type", "description"])?;
    for event in events {
        // start-only events have no date/time strings of their own
        let (date, time) = match event.instant() {
            Some(instant) => (
                instant.format("%Y-%m-%d").to_string(),
                instant.format("%H:%M").to_string(),
            ),
            None => (event.date.clone(), event.time.clone()),
        };
        writer.write_record([
            date.as_str(),
            time.as_str(),
            event.title.as_str(),
            event.kind.as_str(),
            event.description.as_deref().unwrap_or(""),
        ])?;
    }
    finish_csv(writer)
}

fn bundle(files: &[(&'static str, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, data) in files {
        zip.start_file::<_, ()>(*name, FileOptions::default())?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, P: SessionProvider> Pipeline for DashboardPipeline<S, C, P> {
    async fn extract(&self) -> Result<DashboardSnapshot> {
        self.session.require_token()?;

        tracing::debug!("Fetching dashboard collections from {}", self.client.base_url());
        let (tasks, expenses, events) = tokio::join!(
            self.client.list_tasks(),
            self.client.list_expenses(),
            self.client.list_events(),
        );

        let mut unavailable = Vec::new();
        let tasks = unwrap_or_degrade(Collection::Tasks, tasks, &mut unavailable);
        let expenses = unwrap_or_degrade(Collection::Expenses, expenses, &mut unavailable);
        let events = unwrap_or_degrade(Collection::Events, events, &mut unavailable);

        Ok(DashboardSnapshot {
            user: self.session.user().cloned(),
            tasks,
            expenses,
            events,
            unavailable,
        })
    }

    async fn transform(
        &self,
        snapshot: DashboardSnapshot,
        now: NaiveDateTime,
    ) -> Result<DashboardReport> {
        let stats = compute_dashboard_stats(
            &snapshot.tasks,
            &snapshot.expenses,
            &snapshot.events,
            now,
        );
        let expenses = aggregate_expenses_by_category(&snapshot.expenses);
        let upcoming_events = compute_upcoming_events(&snapshot.events, now);

        Ok(DashboardReport {
            generated_at: now,
            user: snapshot.user.and_then(|user| user.name),
            stats,
            expenses,
            upcoming_events,
            unavailable: snapshot.unavailable,
        })
    }

    async fn load(&self, report: DashboardReport) -> Result<String> {
        let files = self.render(&report)?;
        let base = self.config.output_path().trim_end_matches('/');

        if let Some(archive) = self.config.archive_name() {
            tracing::debug!("Creating ZIP file with {} files", files.len());
            let zip_data = bundle(&files)?;

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(archive, &zip_data).await?;
            return Ok(format!("{}/{}", base, archive));
        }

        for (name, data) in &files {
            self.storage.write_file(name, data).await?;
        }

        tracing::debug!("Wrote {} report files", files.len());
        Ok(base.to_string())
    }
}
