mod commands;
mod logging;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use wintrack_core::Config;
use wintrack_core::config;

#[derive(Parser)]
#[command(
    name = "wintrack",
    version,
    about = "Live window tracking and event stream for Windows desktop shells"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List manageable top-level windows
    List(commands::list::ListArgs),
    /// Watch window events in real time
    Events(commands::events::EventsArgs),
    /// Send a command to a single window
    Window(commands::window::WindowArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, load_error) = match config::try_load() {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (Config::default(), Some(e)),
    };
    logging::init(&config.log);
    if let Some(e) = load_error {
        tracing::warn!("{e}; using defaults");
    }

    let result = match cli.command {
        Commands::List(args) => commands::list::execute(&args, &config),
        Commands::Events(args) => commands::events::execute(&args, &config),
        Commands::Window(args) => commands::window::execute(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
