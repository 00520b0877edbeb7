use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiln::manifest::Manifest;
use kiln::rules::Registry;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Parallel pattern-rule build tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Target to bring up to date
    #[arg(default_value = "default")]
    target: String,

    /// Makefile to read rules from
    #[arg(short, long, default_value = "kiln.yml")]
    file: PathBuf,

    /// Number of recipes allowed to run at once (defaults to CPU count)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Change to this directory before reading the makefile
    #[arg(short = 'C', long, value_name = "DIRECTORY")]
    directory: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiln=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match make(cli) {
        Ok(()) => {
            log_message(&format!("{}", "Success!".green()));
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", format!("kiln: *** {error:#}").red());
            ExitCode::FAILURE
        }
    }
}

fn make(cli: Cli) -> Result<()> {
    if let Some(directory) = &cli.directory {
        std::env::set_current_dir(directory)
            .with_context(|| format!("Cannot enter directory '{}'", directory.display()))?;
        log_message(&format!("Entering directory '{}'", directory.display()));
    }

    let jobs = cli.jobs.unwrap_or_else(default_jobs);

    let manifest = Manifest::load(&cli.file)?;
    let mut registry = Registry::new();
    manifest.register(&mut registry)?;

    kiln::run(&registry, &cli.target, jobs)?;
    Ok(())
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

/// Console lines from the tool itself are prefixed so they stand apart
/// from recipe output.
fn log_message(message: &str) {
    println!("kiln: {message}");
}
