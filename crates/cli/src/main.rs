//! FinAid CLI: the main entry point.
//!
//! Commands:
//! - `serve`          Start the HTTP gateway
//! - `query`          Build a context-augmented prompt
//! - `student`        Show a student profile (or transcript)
//! - `students`       List students
//! - `eligibility`    Check a student's aid eligibility
//! - `programs`       Show the aid program catalog
//! - `generate-data`  Write a synthetic student population
//! - `token`          Issue a signed test JWT
//! - `config`         Print, show, validate or locate configuration
//! - `doctor`         Diagnose setup

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "finaid",
    about = "FinAid: student records, financial aid eligibility and RAG context",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.finaid/config.toml
    #[arg(short, long, global = true, env = "FINAID_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
    },

    /// Build a context-augmented prompt for a question
    Query {
        /// The question
        text: String,

        /// Source to consult, in priority order (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Student the question is about
        #[arg(long)]
        student_id: Option<String>,

        /// Token budget for the context section
        #[arg(long)]
        max_tokens: Option<i64>,

        /// Prompt template: default or phi-4
        #[arg(long)]
        mode: Option<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a student's profile
    Student {
        id: String,

        /// Show the academic history instead
        #[arg(long)]
        history: bool,
    },

    /// List students
    Students {
        #[arg(short, long, default_value_t = 100)]
        limit: u64,
    },

    /// Check which aid programs a student is eligible for
    Eligibility { id: String },

    /// Show one aid program, or the whole catalog
    Programs {
        id: Option<String>,

        /// Check this student against the program
        #[arg(long, requires = "id")]
        student_id: Option<String>,
    },

    /// Write synthetic students.json and determinations.json
    GenerateData {
        #[arg(short = 'n', long, default_value_t = 100)]
        count: usize,

        /// Output directory (defaults to ~/.finaid/data)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Seed for a reproducible population
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Issue a signed JWT for calling the API
    Token {
        #[arg(long, default_value = "TEST_SERVICE1")]
        subject: String,

        #[arg(long, default_value_t = 3600)]
        ttl_secs: i64,

        /// Signing secret (defaults to auth.jwt_secret)
        #[arg(long, env = "FINAID_JWT_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// Configuration commands (prints the default config when no action is given)
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Diagnose configuration, data files and sources
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the default configuration as TOML
    Default,
    /// Print the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(config, port, host).await?,
        Commands::Query {
            text,
            sources,
            student_id,
            max_tokens,
            mode,
            json,
        } => {
            let options = commands::query::QueryOptions {
                sources,
                student_id,
                max_tokens,
                mode,
                json,
            };
            commands::query::run(config, text, options).await?
        }
        Commands::Student { id, history } => commands::records::student(config, &id, history).await?,
        Commands::Students { limit } => commands::records::students(config, limit).await?,
        Commands::Eligibility { id } => commands::records::eligibility(config, &id).await?,
        Commands::Programs { id, student_id } => {
            commands::records::programs(config, id.as_deref(), student_id.as_deref()).await?
        }
        Commands::GenerateData { count, out, seed } => {
            commands::generate::run(config, count, out, seed).await?
        }
        Commands::Token {
            subject,
            ttl_secs,
            secret,
        } => commands::token::run(config, &subject, ttl_secs, secret).await?,
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Default) {
            ConfigAction::Default => commands::config_cmd::default().await?,
            ConfigAction::Show => commands::config_cmd::show(config).await?,
            ConfigAction::Validate => commands::config_cmd::validate(config).await?,
            ConfigAction::Path => commands::config_cmd::path(config).await?,
        },
        Commands::Doctor => commands::doctor::run(config).await?,
    }

    Ok(())
}
