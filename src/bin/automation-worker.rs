//! CLI for the automation worker.

use std::process::ExitCode;

use anyhow::{Context, Result};
use automation_worker::prelude::*;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "automation-worker")]
#[command(author, version, about = "Act on repository_dispatch events as a GitHub App", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            println!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(cli.log_format) {
        println!("ERROR: {:#}", e);
        return ExitCode::FAILURE;
    }

    match execute(cli.config) {
        Ok(outcome) => {
            report(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false);

    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!(e))
    .context("Failed to initialise logging")
}

fn execute(args: ConfigArgs) -> automation_worker::error::Result<Outcome> {
    let config = WorkerConfig::try_from(args)?;
    run(&config)
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Uploaded(files) => {
            for file in files {
                println!(
                    "upload_file {} {}",
                    file.path,
                    if file.created { "created" } else { "updated" }
                );
            }
            println!("done upload_files");
        }
        Outcome::PullRequestCreated(Some(pr)) => {
            println!("create_pr #{} {} ({})", pr.number, pr.html_url, pr.title);
            println!("done create_pr");
        }
        Outcome::PullRequestCreated(None) => {
            println!("create_pr (no details returned)");
            println!("done create_pr");
        }
    }
}
