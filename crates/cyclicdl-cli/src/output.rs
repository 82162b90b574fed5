//! Terminal output: the live per-worker display and the final table.

use std::io::{self, Write};

use anyhow::Error;
use colored::*;
use cyclicdl_scheduler::{LiveView, RunReport, WorkerReport};

/// One live status line for a worker.
pub fn format_row(row: &WorkerReport) -> String {
    format!(
        "T:{:2} ({:5}) I:{} C:{:7} Min:{:7} Act:{:5} Avg:{:5} Max:{:8}",
        row.index,
        row.tid,
        row.deadline_us,
        row.stats.count,
        row.stats.min,
        row.stats.current,
        row.stats.avg(),
        row.stats.max
    )
}

/// Live view redrawing the worker lines in place with ANSI cursor movement.
#[derive(Debug)]
pub struct TerminalView<W: Write> {
    out: W,
    drawn: usize,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out, drawn: 0 }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, rows: &[WorkerReport]) -> io::Result<()> {
        let mut frame = String::new();
        if self.drawn > 0 {
            frame.push_str(&format!("\x1b[{}A", self.drawn));
        }
        for row in rows {
            frame.push_str(&format_row(row));
            frame.push_str("\x1b[K\n");
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.drawn = rows.len();
        Ok(())
    }
}

impl<W: Write> LiveView for TerminalView<W> {
    fn refresh(&mut self, rows: &[WorkerReport]) {
        if let Err(e) = self.draw(rows) {
            tracing::debug!(error = %e, "Live display write failed");
        }
    }
}

/// The summary printed when the run ends.
pub fn render_final_table(report: &RunReport) -> String {
    let mut out = String::new();
    let mut header = format!(
        "{:>6} {:>7} {:>8} {:>8} {:>10} {:>7} {:>7} {:>8}",
        "Worker", "TID", "Runtime", "Period", "Cycles", "Min", "Avg", "Max"
    );
    if report.history {
        header.push_str(&format!(" {:>8} {:>10} {:>9}", "Outlier", "At cycle", "Overflows"));
    }
    out.push_str(&format!("{}\n", header.bold()));

    for row in &report.workers {
        out.push_str(&format!(
            "{:>6} {:>7} {:>8} {:>8} {:>10} {:>7} {:>7} {:>8}",
            row.index,
            row.tid,
            row.runtime_us,
            row.deadline_us,
            row.stats.count,
            row.stats.min,
            row.stats.avg(),
            row.stats.max
        ));
        if report.history {
            let (latency, cycle) = row.outlier.map_or((0, 0), |o| (o.latency, o.cycle));
            let overflows = if row.overflows > 0 {
                row.overflows.to_string().red().to_string()
            } else {
                row.overflows.to_string()
            };
            out.push_str(&format!(" {latency:>8} {cycle:>10} {overflows:>9}"));
        }
        out.push('\n');
    }

    for row in &report.workers {
        if let Some(exit) = &row.exit {
            out.push_str(&format!("{} worker {}: {}\n", "Exit:".yellow(), row.index, exit));
        }
    }

    out.push_str(&format!(
        "{} cycles in {:.1}s, worst latency {}us\n",
        report.total_cycles(),
        report.elapsed.as_secs_f64(),
        report.worst_latency()
    ));
    out
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}
