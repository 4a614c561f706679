use crate::domain::model::UserProfile;
use crate::domain::views::{DashboardReport, DashboardSnapshot};
use crate::utils::error::{DashError, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn request_timeout_secs(&self) -> u64;
    fn output_formats(&self) -> &[String];
    /// Zip archive name when outputs should be bundled, `None` for loose files.
    fn archive_name(&self) -> Option<&str>;
}

/// Signed-in state: bearer token plus the cached profile.
pub trait SessionProvider: Send + Sync {
    fn token(&self) -> Option<&str>;
    fn user(&self) -> Option<&UserProfile>;

    fn require_token(&self) -> Result<&str> {
        self.token()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| DashError::Unauthenticated {
                message: "no session token available".to_string(),
            })
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<DashboardSnapshot>;
    async fn transform(
        &self,
        snapshot: DashboardSnapshot,
        now: NaiveDateTime,
    ) -> Result<DashboardReport>;
    async fn load(&self, report: DashboardReport) -> Result<String>;
}
