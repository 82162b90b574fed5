//! cyclicdeadline - SCHED_DEADLINE wakeup latency test
//!
//! Runs one deadline-scheduled thread per worker with increasing periods
//! and reports how late each thread starts relative to its intended
//! period boundary.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod duration;
mod error;
mod json_report;
mod output;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser};
use cyclicdl_cpuset::{AffinitySelection, CpuPlan};
use cyclicdl_errors::CyclicError;
use cyclicdl_scheduler::config::{DEFAULT_INTERVAL_US, DEFAULT_STEP_US};
use cyclicdl_scheduler::{Coordinator, NullView, RunConfig, RunReport, platform_backend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::json_report::JsonReport;
use crate::output::TerminalView;

#[derive(Parser, Debug)]
#[command(name = "cyclicdeadline")]
#[command(about = "Measure the wakeup latency of SCHED_DEADLINE threads")]
#[command(version)]
#[command(long_about = "
cyclicdeadline starts one SCHED_DEADLINE thread per worker. Worker N gets a
period of INTERVAL + N * STEP microseconds and a runtime budget of 60% of
that period (less when there are more workers than CPUs). Every period each
worker records how late it started relative to its intended boundary.

Setting deadline attributes needs CAP_SYS_NICE. CPU isolation with
--affinity needs permission to manage the cpuset cgroup.
")]
struct Cli {
    /// CPUs to run the deadline threads on; without a list, all CPUs
    #[arg(
        short,
        long,
        short_alias = 'c',
        value_name = "CPUSET",
        num_args = 0..=1,
        default_missing_value = "",
        env = "CYCLICDL_AFFINITY"
    )]
    affinity: Option<String>,

    /// Length of the run; append s, m, h or d for the unit
    #[arg(short = 'D', long, value_name = "TIME", value_parser = duration::parse_duration, env = "CYCLICDL_DURATION")]
    duration: Option<Duration>,

    /// Shortest deadline in microseconds
    #[arg(short, long, value_name = "US", default_value_t = DEFAULT_INTERVAL_US, env = "CYCLICDL_INTERVAL")]
    interval: u64,

    /// Deadline increase per thread in microseconds
    #[arg(short, long, value_name = "US", default_value_t = DEFAULT_STEP_US, env = "CYCLICDL_STEP")]
    step: u64,

    /// Number of deadline threads (default 1, or the CPU count with --affinity)
    #[arg(short, long, value_name = "NUM", env = "CYCLICDL_THREADS")]
    threads: Option<usize>,

    /// Print only the final summary
    #[arg(short, long)]
    quiet: bool,

    /// Track per-cycle history and outliers; repeat for more log output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Write final results to FILE, JSON formatted
    #[arg(long, value_name = "FILE", env = "CYCLICDL_JSON")]
    json: Option<PathBuf>,

    /// Do not lock process memory
    #[arg(long)]
    no_mlock: bool,
}

impl Cli {
    fn affinity_selection(&self) -> AffinitySelection {
        match self.affinity.as_deref() {
            None => AffinitySelection::Unset,
            Some(list) if list.trim().is_empty() => AffinitySelection::All,
            Some(list) => AffinitySelection::Cpus(list.to_string()),
        }
    }

    fn run_config(&self, cpu_count: usize) -> RunConfig {
        let default_threads = if self.affinity.is_some() { cpu_count } else { 1 };
        let config = RunConfig::new()
            .with_interval_us(self.interval)
            .with_step_us(self.step)
            .with_threads(self.threads.unwrap_or(default_threads))
            .with_history(self.verbose > 0)
            .with_quiet(self.quiet)
            .with_lock_memory(!self.no_mlock);
        match self.duration.filter(|d| !d.is_zero()) {
            Some(duration) => config.with_duration(duration),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let start = Local::now();
    let result = run(&cli);
    let end = Local::now();

    let mut code = match &result {
        Ok(report) => {
            print!("{}", output::render_final_table(report));
            0
        }
        Err(e) => {
            output::print_error_human(e);
            error::exit_code(e)
        }
    };

    if let Some(path) = &cli.json {
        let report = JsonReport::new(result.as_ref().ok(), start, end, i32::from(code));
        if let Err(e) = report.write_to(path) {
            let e = anyhow::Error::from(e);
            output::print_error_human(&e);
            if code == 0 {
                code = error::exit_code(&e);
            }
        }
    }

    ExitCode::from(code)
}

fn run(cli: &Cli) -> Result<RunReport> {
    let backend = platform_backend();
    let cpu_count = backend.cpu_count();

    let plan = CpuPlan::resolve(&cli.affinity_selection(), cpu_count)
        .map_err(CyclicError::from)
        .with_context(|| format!("Invalid CPU affinity '{}'", cli.affinity.as_deref().unwrap_or_default()))?;

    let config = cli.run_config(cpu_count);
    config.validate()?;
    tracing::info!(cpu_count, plan = ?plan, "Resolved CPU plan");

    let coordinator = Coordinator::new(config, plan, backend);
    let report = if cli.quiet {
        coordinator.run(&mut NullView)?
    } else {
        coordinator.run(&mut TerminalView::new(io::stdout()))?
    };
    Ok(report)
}
