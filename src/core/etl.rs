use crate::core::Pipeline;
use crate::domain::views::DashboardReport;
use crate::utils::error::Result;
use chrono::{Local, NaiveDateTime};

pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// 以當下本地時間跑完整流程
    pub async fn run(&self) -> Result<String> {
        self.run_at(Local::now().naive_local()).await
    }

    pub async fn run_at(&self, now: NaiveDateTime) -> Result<String> {
        tracing::info!("🚀 Starting dashboard report...");

        let report = self.build_report_at(now).await?;

        // Load
        tracing::info!("💾 Writing report...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("✅ Output saved to: {}", output_path);

        Ok(output_path)
    }

    /// Extract + transform only; nothing is written.
    pub async fn build_report_at(&self, now: NaiveDateTime) -> Result<DashboardReport> {
        // Extract
        tracing::info!("📥 Fetching tasks, expenses and events...");
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Fetched {} tasks, {} expenses, {} events",
            snapshot.tasks.len(),
            snapshot.expenses.len(),
            snapshot.events.len()
        );
        if !snapshot.unavailable.is_empty() {
            tracing::warn!(
                "⚠️ Partial data, unavailable: {}",
                snapshot
                    .unavailable
                    .iter()
                    .map(|c| c.path())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        // Transform
        tracing::info!("🔄 Deriving dashboard as of {}", now);
        let report = self.pipeline.transform(snapshot, now).await?;
        tracing::info!(
            "{} upcoming events, {} expense categories",
            report.upcoming_events.len(),
            report.expenses.by_category.len()
        );

        Ok(report)
    }
}
