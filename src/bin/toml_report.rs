use clap::Parser;
use lifeboard::config::toml_config::TomlConfig;
use lifeboard::core::ConfigProvider;
use lifeboard::domain::ports::SessionProvider;
use lifeboard::utils::error::ErrorSeverity;
use lifeboard::utils::{logger, validation::Validate};
use lifeboard::{DashboardEngine, DashboardPipeline, LocalStorage, SessionState};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Dashboard report with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "lifeboard.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show what would be fetched and written without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        let level = if args.verbose { Some("debug") } else { config.log_level() };
        logger::init_json_logger(level);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based dashboard report");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let session = match config.session() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &session, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        perform_dry_run(&config);
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = DashboardPipeline::new(storage, config, session)?;
    let engine = DashboardEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Dashboard report completed successfully!");
            println!("✅ Dashboard report completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Dashboard report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, session: &SessionState, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Dashboard: {}", config.dashboard.name);
    if let Some(description) = &config.dashboard.description {
        println!("  Description: {}", description);
    }
    println!("  API: {}", config.api_base_url());
    println!(
        "  Signed in: {}",
        if session.require_token().is_ok() { "yes" } else { "no" }
    );
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Requests:");
    for path in ["tasks", "expenses", "events"] {
        println!("  GET {}/{}", config.api_base_url(), path);
    }
    println!("  Timeout: {}s", config.request_timeout_secs());

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    for format in config.output_formats() {
        match format.as_str() {
            "json" => println!("  dashboard.json"),
            "csv" => println!("  expenses_by_category.csv, upcoming_events.csv"),
            other => println!("  (unsupported format '{}')", other),
        }
    }

    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
