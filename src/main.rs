use anyhow::Context;
use chrono::Local;
use clap::Parser;
use lifeboard::config::{Command, EventCommand, ExpenseCommand, TaskCommand};
use lifeboard::core::expenses::round_for_display;
use lifeboard::core::ConfigProvider;
use lifeboard::domain::assistant::ConversationHistory;
use lifeboard::domain::model::{NewEvent, NewExpense, NewTask};
use lifeboard::domain::ports::SessionProvider;
use lifeboard::domain::views::DashboardReport;
use lifeboard::utils::error::{DashError, ErrorSeverity};
use lifeboard::utils::{logger, validation::Validate};
use lifeboard::{ApiClient, CliConfig, DashboardEngine, DashboardPipeline, LocalStorage, SessionState};
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting lifeboard CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let session = match SessionState::resolve(config.token.clone(), config.session_file.as_deref()) {
        Ok(session) => session,
        Err(e) => report_failure(e),
    };

    let command = config.command.clone();
    let result = match command {
        Command::Chat { message, history } => {
            return chat(&config, &session, &message, history.as_deref()).await;
        }
        Command::Report => run_report(config, session).await,
        Command::Stats => show_report(config, session, print_stats).await,
        Command::Upcoming => show_report(config, session, print_upcoming).await,
        Command::Expenses => show_report(config, session, print_expenses).await,
        Command::Weather { city } => weather(&config, &session, &city).await,
        Command::Task(task) => task_command(&config, &session, task).await,
        Command::Expense(expense) => expense_command(&config, &session, expense).await,
        Command::Event(event) => event_command(&config, &session, event).await,
    };

    if let Err(e) = result {
        report_failure(e);
    }

    Ok(())
}

fn report_failure(e: DashError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn client(config: &CliConfig, session: &SessionState) -> lifeboard::Result<ApiClient> {
    Ok(ApiClient::new(
        config.api_base_url(),
        Duration::from_secs(config.request_timeout_secs()),
    )?
    .with_session(session))
}

/// 寫入操作一律需要登入
fn signed_in_client(config: &CliConfig, session: &SessionState) -> lifeboard::Result<ApiClient> {
    session.require_token()?;
    client(config, session)
}

async fn run_report(config: CliConfig, session: SessionState) -> lifeboard::Result<()> {
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = DashboardPipeline::new(storage, config, session)?;
    let engine = DashboardEngine::new(pipeline);

    let output_path = engine.run().await?;
    tracing::info!("✅ Dashboard report completed successfully!");
    println!("✅ Dashboard report completed successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

async fn show_report(
    config: CliConfig,
    session: SessionState,
    print: fn(&DashboardReport),
) -> lifeboard::Result<()> {
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = DashboardPipeline::new(storage, config, session)?;
    let engine = DashboardEngine::new(pipeline);

    let report = engine.build_report_at(Local::now().naive_local()).await?;
    if let Some(name) = &report.user {
        println!("👋 {}", name);
    }
    print(&report);
    for collection in &report.unavailable {
        println!("⚠️ {} could not be loaded, shown as empty", collection);
    }
    Ok(())
}

fn print_stats(report: &DashboardReport) {
    let stats = &report.stats;
    println!("📋 Tasks: {} ({} completed)", stats.total_tasks, stats.completed_tasks);
    println!("💸 Expenses: {:.2}", round_for_display(stats.total_expenses));
    println!("💰 Income: {:.2}", round_for_display(stats.total_income));
    println!("📅 Upcoming events: {}", stats.upcoming_events);
}

fn print_upcoming(report: &DashboardReport) {
    if report.upcoming_events.is_empty() {
        println!("📅 No upcoming events");
        return;
    }
    println!("📅 Upcoming events:");
    for event in &report.upcoming_events {
        let when = event
            .instant()
            .map(|instant| instant.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("  {}  {} [{}]", when, event.title, event.kind.as_str());
    }
}

fn print_expenses(report: &DashboardReport) {
    println!("💸 Spending by category:");
    for (category, amount) in &report.expenses.by_category {
        println!("  {:<16} {:>10.2}", category, round_for_display(*amount));
    }
    println!("  {:<16} {:>10.2}", "Total", round_for_display(report.expenses.total));
}

async fn weather(config: &CliConfig, session: &SessionState, city: &str) -> lifeboard::Result<()> {
    let report = client(config, session)?.current_weather(city).await?;

    println!(
        "🌤️ {} ({:?})",
        report.location.as_deref().unwrap_or(city),
        report.condition()
    );
    if let Some(description) = &report.description {
        println!("  {}", description);
    }
    if let Some(temperature) = report.temperature {
        println!("  Temperature: {:.1}°C", temperature);
    }
    if let Some(humidity) = report.humidity {
        println!("  Humidity: {}%", humidity);
    }
    if let Some(wind) = report.wind_speed {
        println!("  Wind: {} m/s", wind);
    }
    if let Some(visibility) = report.visibility_km {
        println!("  Visibility: {:.1} km", visibility);
    }
    Ok(())
}

fn load_history(path: &Path) -> anyhow::Result<ConversationHistory> {
    if !path.exists() {
        return Ok(ConversationHistory::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading chat history {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing chat history {}", path.display()))
}

async fn chat(
    config: &CliConfig,
    session: &SessionState,
    message: &str,
    history_file: Option<&str>,
) -> anyhow::Result<()> {
    let history = match history_file {
        Some(path) => load_history(Path::new(path))?,
        None => ConversationHistory::default(),
    };
    tracing::debug!("Sending chat message with {} prior turns", history.len());

    let reply = match signed_in_client(config, session) {
        Ok(client) => client.chat(message, &history).await,
        Err(e) => Err(e),
    };
    let reply = match reply {
        Ok(reply) => reply,
        Err(e) => report_failure(e),
    };

    println!("🤖 {}", reply.reply);

    if let Some(path) = history_file {
        let json = serde_json::to_string_pretty(&reply.updated_conversation_history)?;
        std::fs::write(path, json).with_context(|| format!("saving chat history {}", path))?;
    }
    Ok(())
}

async fn task_command(
    config: &CliConfig,
    session: &SessionState,
    command: TaskCommand,
) -> lifeboard::Result<()> {
    let client = signed_in_client(config, session)?;
    match command {
        TaskCommand::Add {
            title,
            description,
            due,
            priority,
        } => {
            let task = NewTask {
                title,
                description,
                due_date: due,
                priority,
            };
            client.create_task(&task).await?;
            println!("✅ Task added: {}", task.title);
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            due,
            priority,
        } => {
            let mut task = NewTask::from_task(&client.find_task(&id).await?);
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(description) = description {
                task.description = description;
            }
            if let Some(due) = due {
                task.due_date = Some(due);
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            client.edit_task(&id, &task).await?;
            println!("✅ Task {} updated", id);
        }
        TaskCommand::Done { id, undo } => {
            client.set_task_completed(&id, !undo).await?;
            println!("✅ Task {} marked {}", id, if undo { "open" } else { "completed" });
        }
        TaskCommand::Delete { id } => {
            client.delete_task(&id).await?;
            println!("🗑️ Task {} deleted", id);
        }
    }
    Ok(())
}

async fn expense_command(
    config: &CliConfig,
    session: &SessionState,
    command: ExpenseCommand,
) -> lifeboard::Result<()> {
    let client = signed_in_client(config, session)?;
    match command {
        ExpenseCommand::Add {
            amount,
            description,
            category,
            kind,
            date,
        } => {
            let mut expense = NewExpense::new(amount, description, &category).with_kind(kind);
            if let Some(date) = date {
                expense = expense.on(date);
            }
            client.create_expense(&expense).await?;
            println!(
                "✅ {:?} of {:.2} recorded under {}",
                expense.kind,
                round_for_display(expense.amount),
                expense.category
            );
        }
        ExpenseCommand::Delete { id } => {
            client.delete_expense(&id).await?;
            println!("🗑️ Expense {} deleted", id);
        }
    }
    Ok(())
}

async fn event_command(
    config: &CliConfig,
    session: &SessionState,
    command: EventCommand,
) -> lifeboard::Result<()> {
    let client = signed_in_client(config, session)?;
    match command {
        EventCommand::Add {
            title,
            description,
            date,
            time,
            kind,
        } => {
            let event = NewEvent {
                title,
                description,
                date,
                time,
                kind,
            };
            client.create_event(&event).await?;
            println!("✅ Event added: {} on {} at {}", event.title, event.date, event.time);
        }
        EventCommand::Edit {
            id,
            title,
            description,
            date,
            time,
            kind,
        } => {
            let mut event = NewEvent::from(&client.find_event(&id).await?);
            if let Some(title) = title {
                event.title = title;
            }
            if let Some(description) = description {
                event.description = description;
            }
            if let Some(date) = date {
                event.date = date;
            }
            if let Some(time) = time {
                event.time = time;
            }
            if let Some(kind) = kind {
                event.kind = kind;
            }
            client.update_event(&id, &event).await?;
            println!("✅ Event {} updated: {} on {} at {}", id, event.title, event.date, event.time);
        }
        EventCommand::Delete { id } => {
            client.delete_event(&id).await?;
            println!("🗑️ Event {} deleted", id);
        }
    }
    Ok(())
}
