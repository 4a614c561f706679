pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{toml_config::TomlConfig, LocalStorage};

pub use adapters::{http::ApiClient, session::SessionState};
pub use core::{
    aggregate_expenses_by_category, compute_dashboard_stats, compute_upcoming_events,
    etl::DashboardEngine, pipeline::DashboardPipeline,
};
pub use utils::error::{DashError, Result};
