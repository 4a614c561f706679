use anyhow::Result;
use chrono::NaiveDate;
use httpmock::prelude::*;
use lifeboard::config::{Command, DEFAULT_ARCHIVE_NAME};
use lifeboard::domain::views::{Collection, DashboardReport};
use lifeboard::{CliConfig, DashboardEngine, DashboardPipeline, LocalStorage, SessionState, TomlConfig};
use rust_decimal_macros::dec;
use std::io::Read;
use tempfile::TempDir;

fn mock_backend(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/tasks")
            .header("Authorization", "Bearer secret");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"_id": "t1", "title": "Pay rent", "completed": true, "priority": "High"},
                {"_id": "t2", "title": "Gym", "completed": false}
            ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/expenses")
            .header("Authorization", "Bearer secret");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"_id": "x1", "amount": 120.25, "category": "Food", "type": "Expense"},
                {"_id": "x2", "amount": 30, "category": "Transport", "type": "Expense"},
                {"_id": "x3", "amount": 9.75, "category": "Food", "type": "Expense"},
                {"_id": "x4", "amount": 2500, "category": "Salary", "type": "Income"}
            ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/events")
            .header("Authorization", "Bearer secret");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"_id": "e1", "title": "Dentist", "date": "2024-03-12", "time": "16:30", "type": "personal"},
                {"_id": "e2", "title": "Retro", "date": "2024-03-10", "time": "08:00", "type": "work"},
                {"_id": "e3", "title": "Old sync", "date": "2024-03-09", "time": "10:00", "type": "meeting"},
                {"_id": "e4", "title": "Broken", "date": "someday", "time": "noon"}
            ]));
    });
}

fn cli_config(server: &MockServer, output_path: &str, zip: bool) -> CliConfig {
    CliConfig {
        api_base_url: server.url("/api"),
        token: Some("secret".to_string()),
        session_file: None,
        output_path: output_path.to_string(),
        output_formats: vec!["json".to_string(), "csv".to_string()],
        zip,
        timeout: 5,
        verbose: false,
        command: Command::Report,
    }
}

#[tokio::test]
async fn test_end_to_end_report_zip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    mock_backend(&server);

    let config = cli_config(&server, &output_path, true);
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DashboardPipeline::new(storage, config, SessionState::with_token("secret"))?;
    let engine = DashboardEngine::new(pipeline);

    let now = NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let output = engine.run_at(now).await?;

    assert!(output.ends_with(DEFAULT_ARCHIVE_NAME));
    let full_path = temp_dir.path().join(DEFAULT_ARCHIVE_NAME);
    assert!(full_path.exists());

    let zip_data = std::fs::read(&full_path)?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;

    let file_names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        file_names,
        vec!["dashboard.json", "expenses_by_category.csv", "upcoming_events.csv"]
    );

    let mut json = String::new();
    archive.by_name("dashboard.json")?.read_to_string(&mut json)?;
    let report: DashboardReport = serde_json::from_str(&json)?;

    assert_eq!(report.generated_at, now);
    assert_eq!(report.stats.total_tasks, 2);
    assert_eq!(report.stats.completed_tasks, 1);
    assert_eq!(report.stats.total_expenses, dec!(160));
    assert_eq!(report.stats.total_income, dec!(2500));
    // only the dentist is strictly after noon
    assert_eq!(report.stats.upcoming_events, 1);

    let upcoming: Vec<&str> = report
        .upcoming_events
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(upcoming, vec!["Retro", "Dentist"]);

    let mut csv = String::new();
    archive
        .by_name("expenses_by_category.csv")?
        .read_to_string(&mut csv)?;
    assert_eq!(
        csv,
        "category,amount\nFood,130.00\nSalary,2500.00\nTransport,30.00\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_report_degrades_when_collection_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tasks");
        then.status(200).json_body(serde_json::json!([
            {"_id": "t1", "title": "Only task"}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/expenses");
        then.status(503).body("maintenance");
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/events");
        then.status(200).json_body(serde_json::json!([
            {"_id": "e1", "title": "Far future", "date": "2999-01-01", "time": "10:00", "type": "other"},
            {"_id": "e2", "title": "Long gone", "date": "2000-01-01", "time": "10:00", "type": "other"}
        ]));
    });

    let config = cli_config(&server, &output_path, false);
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DashboardPipeline::new(storage, config, SessionState::with_token("secret"))?;
    let engine = DashboardEngine::new(pipeline);

    let output = engine.run().await?;
    assert_eq!(output, output_path);

    let json = std::fs::read_to_string(temp_dir.path().join("dashboard.json"))?;
    let report: DashboardReport = serde_json::from_str(&json)?;

    assert_eq!(report.unavailable, vec![Collection::Expenses]);
    assert_eq!(report.stats.total_tasks, 1);
    assert_eq!(report.stats.total_expenses, dec!(0));
    assert!(report.expenses.by_category.is_empty());
    assert_eq!(report.stats.upcoming_events, 1);
    assert_eq!(report.upcoming_events.len(), 1);
    assert_eq!(report.upcoming_events[0].id, "e1");

    let upcoming_csv = std::fs::read_to_string(temp_dir.path().join("upcoming_events.csv"))?;
    assert_eq!(
        upcoming_csv,
        "date,time,title,type,description\n2999-01-01,10:00,Far future,other,\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_report_without_token_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let tasks_mock = server.mock(|when, then| {
        when.method(GET).path("/api/tasks");
        then.status(200).json_body(serde_json::json!([]));
    });

    let mut config = cli_config(&server, &output_path, false);
    config.token = None;
    let session = SessionState::resolve(config.token.clone(), None)?;
    let storage = LocalStorage::new(output_path.clone());
    let engine = DashboardEngine::new(DashboardPipeline::new(storage, config, session)?);

    let err = engine.run().await.unwrap_err();

    assert_eq!(err.severity(), lifeboard::utils::error::ErrorSeverity::High);
    assert_eq!(tasks_mock.hits(), 0);
    assert!(!temp_dir.path().join("dashboard.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_toml_config_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    mock_backend(&server);

    let session_path = temp_dir.path().join("session.json");
    std::fs::write(
        &session_path,
        r#"{"token": "secret", "user": {"_id": "u1", "name": "Asha", "email": "asha@example.com"}}"#,
    )?;

    let toml_content = format!(
        r#"
[dashboard]
name = "weekly"

[api]
base_url = "{}"
timeout_seconds = 5
session_file = "{}"

[load]
output_path = "{}"
output_formats = ["csv"]

[load.compression]
enabled = true
filename = "weekly.zip"
"#,
        server.url("/api"),
        session_path.display(),
        output_path
    );

    let config = TomlConfig::from_toml_str(&toml_content)?;
    lifeboard::utils::validation::Validate::validate(&config)?;
    let session = config.session()?;

    let storage = LocalStorage::new(output_path.clone());
    let engine = DashboardEngine::new(DashboardPipeline::new(storage, config, session)?);

    let now = NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(7, 0, 0)
        .unwrap();
    let report = engine.build_report_at(now).await?;
    assert_eq!(report.user.as_deref(), Some("Asha"));
    assert_eq!(report.stats.upcoming_events, 2);

    let output = engine.run_at(now).await?;
    assert!(output.ends_with("weekly.zip"));

    let zip_data = std::fs::read(temp_dir.path().join("weekly.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 2);

    let mut upcoming = String::new();
    archive
        .by_name("upcoming_events.csv")?
        .read_to_string(&mut upcoming)?;
    assert_eq!(
        upcoming,
        "date,time,title,type,description\n\
         2024-03-10,08:00,Retro,work,\n\
         2024-03-12,16:30,Dentist,personal,\n"
    );

    Ok(())
}
