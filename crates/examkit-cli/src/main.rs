//! examkit CLI: take, validate and list timed practice exams.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use examkit_core::model::Locale;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "examkit", version, about = "Timed bilingual practice exams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an exam in the terminal
    Take {
        /// Exam name from the config (defaults to default_exam)
        #[arg(long, conflicts_with = "bank")]
        exam: Option<String>,

        /// Path to a .json or .toml question bank
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Time limit in seconds
        #[arg(long)]
        duration: Option<u32>,

        /// Display language: en or ar
        #[arg(long)]
        lang: Option<Locale>,

        /// Print the final summary as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Milliseconds per countdown second
        #[arg(long, default_value = "1000", hide = true)]
        tick_ms: u64,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question bank files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// List configured exams
    List {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examkit=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            exam,
            bank,
            duration,
            lang,
            json,
            tick_ms,
            config,
        } => {
            commands::take::execute(commands::take::TakeArgs {
                exam,
                bank,
                duration,
                lang,
                json,
                tick_ms,
                config,
            })
            .await
        }
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::List { config } => commands::list::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
