//! Carillon CLI - print messages when cron schedules match the local clock.
//!
//! The binary is a thin host around the engine: it decomposes
//! `chrono::Local::now()` into a poll tick once per interval and lets the
//! clock decide what fires.
//!
//! ```text
//! carillon "*/5 * * * *" "take a break"
//! carillon --at "0 9 * * 1-5=stand-up" --at "@hourly=drink water"
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use carillon_cron::{Clock, CronError, TickTime};
use carillon_log::{info, warn};
use chrono::Local;
use clap::Parser;
use thiserror::Error;

/// Carillon - minute-resolution cron scheduler demo
#[derive(Parser)]
#[command(name = "carillon")]
#[command(version)]
#[command(about = "⏰ Prints messages when cron schedules match the local clock")]
struct Cli {
    /// Cron expression for the positional message, e.g. "*/5 * * * *"
    #[arg(requires = "message")]
    expression: Option<String>,

    /// Message to print when the positional expression matches
    message: Option<String>,

    /// Additional schedule/message pairs
    #[arg(long = "at", value_name = "EXPR=MESSAGE")]
    at: Vec<String>,

    /// Seconds between clock polls. The engine is minute-resolution, so
    /// polling faster than once a minute only tightens firing latency.
    #[arg(long, default_value_t = 10)]
    interval: u64,

    /// Print the parsed schedule table and exit
    #[arg(long)]
    list: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("invalid schedule: {0}")]
    Cron(#[from] CronError),

    #[error("failed to install shutdown handler: {0}")]
    Shutdown(#[from] ctrlc::Error),
}

fn main() -> ExitCode {
    carillon_log::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    if let (Some(expression), Some(message)) = (&cli.expression, &cli.message) {
        pairs.push((expression.clone(), message.clone()));
    }
    for entry in &cli.at {
        let (expression, message) = entry.split_once('=').ok_or_else(|| {
            CliError::Usage(format!("`{entry}` is not an EXPR=MESSAGE pair"))
        })?;
        pairs.push((expression.to_string(), message.to_string()));
    }
    if pairs.is_empty() {
        return Err(CliError::Usage(
            "nothing to schedule; pass EXPR MESSAGE or --at \"EXPR=MESSAGE\"".to_string(),
        ));
    }

    let mut clock = Clock::new();
    for (expression, message) in pairs {
        clock.schedule(&expression, move |_ctx| {
            println!(
                "{} | {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                message
            );
        })?;
    }

    if cli.list {
        println!("{:>4}  {:<24}", "id", "schedule");
        for info in clock.actions() {
            println!("{:>4}  {:<24}", info.id, info.expression);
        }
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let stop = running.clone();
    ctrlc::set_handler(move || {
        stop.store(false, Ordering::SeqCst);
    })?;

    info!(
        "{} action(s) scheduled, polling every {}s",
        clock.action_count(),
        cli.interval.max(1)
    );

    while running.load(Ordering::SeqCst) {
        let tick = TickTime::from_datetime(&Local::now());
        if let Err(err) = clock.process(tick) {
            // chrono-derived ticks are always in domain; surface anyway
            warn!("poll rejected: {}", err);
        }
        thread::sleep(Duration::from_secs(cli.interval.max(1)));
    }

    info!("shutting down");
    Ok(())
}
