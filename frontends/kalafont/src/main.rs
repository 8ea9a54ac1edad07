mod cli;
mod driver;
mod rasterizer;

use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_LEVEL_ENV: &str = "KALAFONT_LOG_LEVEL";

fn setup_logs_by_filter_level(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut filter_level = LevelFilter::from_str(log_level).unwrap_or(LevelFilter::INFO);

    if let Ok(data) = std::env::var(LOG_LEVEL_ENV) {
        if !data.is_empty() {
            filter_level = LevelFilter::from_str(&data).unwrap_or(filter_level);
        }
    }

    let env_filter = EnvFilter::builder().with_default_directive(filter_level.into());
    let stdout_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true)
        .with_filter(env_filter.parse("")?);
    tracing_subscriber::registry().with(stdout_subscriber).init();
    Ok(())
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let log_level = match cli.command {
        cli::Command::Vp(_) => "debug",
        _ => "info",
    };
    if let Err(error) = setup_logs_by_filter_level(log_level) {
        eprintln!("unable to set up logging: {error}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        cli::Command::Parse(args) | cli::Command::Vp(args) => driver::compile(args),
        cli::Command::Info { path } => driver::info(path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
