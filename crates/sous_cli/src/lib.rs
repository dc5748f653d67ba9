mod chat;
mod cmd;
mod ctx;
mod error;
mod server;
mod widget;

use std::{
    io::{self, Write as _},
    process::ExitCode,
};

use clap::{ArgAction, Parser};
use cmd::Commands;
use ctx::Ctx;
use error::Result;
use sous_config::process_env;
use tracing::{debug, error, trace, warn};

/// Sous, a conversational recipe assistant.
#[derive(Debug, Parser)]
#[command(name = "sous", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten, next_help_heading = "Global Options")]
    globals: Globals,

    #[command(subcommand, next_help_heading = "Options")]
    command: Commands,
}

#[derive(Debug, clap::Args)]
pub struct Globals {
    /// Increase verbosity of logging.
    ///
    /// Can be specified multiple times to increase verbosity.
    ///
    /// Defaults to printing "error" messages. For each increase in verbosity,
    /// the log level is set to "warn", "info", "debug", and "trace"
    /// respectively.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all output, including errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[must_use]
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.globals.quiet;

    configure_logging(cli.globals.verbose, quiet);
    load_dotenv();
    trace!(command = cli.command.name(), arguments = ?cli, "Starting CLI run.");

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Into::into)
        .and_then(|runtime| {
            runtime.block_on(cli.command.run(&process_env, &mut io::stdout()))
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "Command failed.");
            if !quiet {
                let _ = writeln!(io::stderr(), "{error}");
            }

            ExitCode::FAILURE
        }
    }
}

/// Load variables from a `.env` file, overriding the process environment.
fn load_dotenv() {
    match dotenvy::dotenv_override() {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file."),
        Err(error) if error.not_found() => trace!("No environment file found."),
        Err(error) => warn!(%error, "Failed to load environment file."),
    }
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::fmt;

    let mut level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    if quiet {
        level = LevelFilter::OFF;
    }

    let mut filter = vec!["off".to_owned()];
    for krate in ["cli", "config", "conversation", "llm", "recipe"] {
        filter.push(format!("sous_{krate}={level}"));
    }

    let format = fmt::format().with_target(false).compact();

    if level < LevelFilter::DEBUG {
        tracing_subscriber::fmt()
            .event_format(format)
            .without_time()
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    } else {
        tracing_subscriber::fmt()
            .event_format(format)
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    }
}
