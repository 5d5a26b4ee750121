use anyhow::Result;
use clap::Parser;
use patotas_core::config::Config;
use patotas_core::logging::{init_logging_with_config, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

mod commands;

use commands::{render_notice, Command, Context};

#[derive(Parser, Debug)]
#[command(name = "patotas")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path, overriding the config
    #[arg(long)]
    database: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error), overriding the config
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

fn setup(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(database) = &args.database {
        config.store.database_path = database.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json_format |= args.json_logs;
    config.validate()?;

    // stdout carries command output only
    init_logging_with_config(LogConfig::try_from(&config.logging)?.to_stderr(true))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let context = match setup(&args).and_then(|config| Context::open(&config)) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    debug!(command = ?args.command, "Running command");
    match context.execute(args.command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", render_notice(&e.notice()));
            ExitCode::FAILURE
        }
    }
}
