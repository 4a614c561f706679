pub mod cli;
pub mod toml_config;

pub use cli::LocalStorage;

pub const OUTPUT_FORMATS: [&str; 2] = ["json", "csv"];
pub const DEFAULT_ARCHIVE_NAME: &str = "dashboard_report.zip";

#[cfg(feature = "cli")]
mod args {
    use super::{DEFAULT_ARCHIVE_NAME, OUTPUT_FORMATS};
    use crate::adapters::http::DEFAULT_BASE_URL;
    use crate::core::ConfigProvider;
    use crate::domain::model::{EventType, ExpenseType, Priority};
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::{Parser, Subcommand};
    use rust_decimal::Decimal;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "lifeboard")]
    #[command(about = "Personal productivity dashboard: tasks, expenses, events, weather and chat")]
    pub struct CliConfig {
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        pub api_base_url: String,

        #[arg(long, env = "LIFEBOARD_TOKEN", hide_env_values = true)]
        pub token: Option<String>,

        #[arg(long, help = "JSON file holding {\"token\", \"user\"} from a previous sign-in")]
        pub session_file: Option<String>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long = "format", value_delimiter = ',', default_value = "json,csv")]
        pub output_formats: Vec<String>,

        #[arg(long, help = "Bundle report files into a single zip archive")]
        pub zip: bool,

        #[arg(long, default_value = "10", help = "HTTP timeout in seconds")]
        pub timeout: u64,

        #[arg(long, short, help = "Enable verbose output")]
        pub verbose: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Fetch everything, derive the dashboard and write the report files
        Report,
        /// Print task, expense, income and event counters
        Stats,
        /// Print events from today onwards in chronological order
        Upcoming,
        /// Print spending per category
        Expenses,
        /// Current weather for a city
        Weather {
            #[arg(default_value = "Delhi")]
            city: String,
        },
        /// Ask the AI assistant
        Chat {
            message: String,
            /// File used to keep the conversation between invocations
            #[arg(long)]
            history: Option<String>,
        },
        #[command(subcommand)]
        Task(TaskCommand),
        #[command(subcommand)]
        Expense(ExpenseCommand),
        #[command(subcommand)]
        Event(EventCommand),
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum TaskCommand {
        Add {
            #[arg(long)]
            title: String,
            #[arg(long, default_value = "")]
            description: String,
            /// YYYY-MM-DD
            #[arg(long)]
            due: Option<String>,
            #[arg(long, default_value = "medium")]
            priority: Priority,
        },
        /// Change fields of an existing task; omitted fields keep their value
        Edit {
            id: String,
            #[arg(long)]
            title: Option<String>,
            #[arg(long)]
            description: Option<String>,
            /// YYYY-MM-DD
            #[arg(long)]
            due: Option<String>,
            #[arg(long)]
            priority: Option<Priority>,
        },
        /// Mark a task completed (or open again with --undo)
        Done {
            id: String,
            #[arg(long)]
            undo: bool,
        },
        Delete {
            id: String,
        },
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum ExpenseCommand {
        Add {
            #[arg(long)]
            amount: Decimal,
            #[arg(long)]
            description: String,
            #[arg(long, default_value = "food")]
            category: String,
            #[arg(long = "type", default_value = "expense")]
            kind: ExpenseType,
            /// YYYY-MM-DD, defaults to the server's date
            #[arg(long)]
            date: Option<String>,
        },
        Delete {
            id: String,
        },
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum EventCommand {
        Add {
            #[arg(long)]
            title: String,
            #[arg(long, default_value = "")]
            description: String,
            /// YYYY-MM-DD
            #[arg(long)]
            date: String,
            /// HH:MM
            #[arg(long)]
            time: String,
            #[arg(long = "type", default_value = "personal")]
            kind: EventType,
        },
        /// Change fields of an existing event; omitted fields keep their value
        Edit {
            id: String,
            #[arg(long)]
            title: Option<String>,
            #[arg(long)]
            description: Option<String>,
            #[arg(long)]
            date: Option<String>,
            #[arg(long)]
            time: Option<String>,
            #[arg(long = "type")]
            kind: Option<EventType>,
        },
        Delete {
            id: String,
        },
    }

    impl ConfigProvider for CliConfig {
        fn api_base_url(&self) -> &str {
            &self.api_base_url
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn request_timeout_secs(&self) -> u64 {
            self.timeout
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn archive_name(&self) -> Option<&str> {
            self.zip.then_some(DEFAULT_ARCHIVE_NAME)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_url("api_base_url", &self.api_base_url)?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_positive_number("timeout", self.timeout, 1)?;
            validation::validate_one_of("format", &self.output_formats, &OUTPUT_FORMATS)?;
            Ok(())
        }
    }

}

#[cfg(feature = "cli")]
pub use args::{CliConfig, Command, EventCommand, ExpenseCommand, TaskCommand};
