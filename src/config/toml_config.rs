use super::{DEFAULT_ARCHIVE_NAME, OUTPUT_FORMATS};
use crate::adapters::http::DEFAULT_BASE_URL;
use crate::adapters::session::SessionState;
use crate::core::ConfigProvider;
use crate::utils::error::{DashError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub dashboard: DashboardInfo,
    #[serde(default)]
    pub api: ApiConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub token: Option<String>,
    pub session_file: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
            token: None,
            session_file: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LIFEBOARD_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }

        validation::validate_one_of(
            "load.output_formats",
            &self.load.output_formats,
            &OUTPUT_FORMATS,
        )?;

        if let Some(token) = &self.api.token {
            if token.starts_with("${") {
                return Err(DashError::MissingConfigError {
                    field: format!("api.token ({} is not set)", token),
                });
            }
        }

        Ok(())
    }

    /// Session built from `api.token` and/or `api.session_file`.
    pub fn session(&self) -> Result<SessionState> {
        SessionState::resolve(self.api.token.clone(), self.api.session_file.as_deref())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn request_timeout_secs(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(10)
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_deref().unwrap_or(DEFAULT_ARCHIVE_NAME))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SessionProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[dashboard]
name = "home"

[api]
base_url = "https://dash.example.com/api"
timeout_seconds = 3
token = "abc"

[load]
output_path = "./test-output"
output_formats = ["csv", "json"]

[load.compression]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.dashboard.name, "home");
        assert_eq!(config.api_base_url(), "https://dash.example.com/api");
        assert_eq!(config.request_timeout_secs(), 3);
        assert_eq!(config.archive_name(), Some(DEFAULT_ARCHIVE_NAME));
        assert_eq!(config.session().unwrap().token(), Some("abc"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_section_defaults() {
        let toml_content = r#"
[dashboard]
name = "defaults"

[load]
output_path = "./output"
output_formats = ["json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout_secs(), 10);
        assert_eq!(config.archive_name(), None);
        assert!(!config.json_logs());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LIFEBOARD_TEST_TOKEN", "from-env");

        let toml_content = r#"
[dashboard]
name = "env"

[api]
token = "${LIFEBOARD_TEST_TOKEN}"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.token.as_deref(), Some("from-env"));

        std::env::remove_var("LIFEBOARD_TEST_TOKEN");
    }

    #[test]
    fn test_unset_token_variable_is_reported() {
        let toml_content = r#"
[dashboard]
name = "env"

[api]
token = "${LIFEBOARD_SURELY_UNSET_VARIABLE}"

[load]
output_path = "./output"
output_formats = ["json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(DashError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[dashboard]
name = "bad"

[api]
base_url = "invalid-url"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[dashboard]
name = "file-test"

[load]
output_path = "./output"
output_formats = ["json"]

[load.compression]
enabled = true
filename = "weekly.zip"

[monitoring]
log_level = "debug"
json_logs = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.dashboard.name, "file-test");
        assert_eq!(config.archive_name(), Some("weekly.zip"));
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.json_logs());
    }
}
