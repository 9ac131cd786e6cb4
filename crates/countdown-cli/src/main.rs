use std::env;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod tui;

#[derive(Parser)]
#[command(name = "countdown", version, about = "Countdown to a date, then celebrate")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print time remaining and journey progress
    Status(commands::status::StatusArgs),
    /// Full-screen live countdown
    Watch(commands::watch::WatchArgs),
    /// Run the phase sequence on virtual time and print its events
    Simulate(commands::simulate::SimulateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(to_file: bool) {
    let filter = EnvFilter::try_from_env("COUNTDOWN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "countdown_cli=debug,countdown_core=debug,info"
        } else {
            "countdown_cli=info,countdown_core=info,warn"
        })
    });
    let json = env::var("COUNTDOWN_LOG_FORMAT").is_ok_and(|f| f == "json");

    // The full-screen view owns stderr, so it logs to a file instead.
    let log_file = to_file
        .then(|| {
            let path = countdown_core::storage::data_dir().ok()?.join("countdown.log");
            OpenOptions::new().create(true).append(true).open(path).ok()
        })
        .flatten();

    let registry = tracing_subscriber::registry().with(filter);
    match (log_file, json) {
        (Some(file), true) => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        (Some(file), false) => registry
            .with(fmt::layer().compact().with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        // No log file for the full-screen view: stay silent.
        (None, _) if to_file => {}
        (None, true) => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
            .init(),
        (None, false) => registry
            .with(fmt::layer().compact().with_writer(io::stderr))
            .init(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Watch(_)));

    let result = match cli.command {
        Commands::Status(args) => commands::status::run(args),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "countdown", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
