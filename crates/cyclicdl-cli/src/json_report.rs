//! Machine-readable final report.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use cyclicdl_scheduler::RunReport;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

pub const FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    pub file_version: u32,
    pub start_time: String,
    pub end_time: String,
    pub return_code: i32,
    pub num_threads: usize,
    pub resolution_in_ns: u32,
    pub thread: BTreeMap<usize, ThreadResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadResult {
    pub cycles: u64,
    pub min: u64,
    pub max: u64,
    pub avg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<String>,
}

impl JsonReport {
    /// Build the report. `run` is `None` when the run failed before
    /// producing results.
    pub fn new(run: Option<&RunReport>, start: DateTime<Local>, end: DateTime<Local>, return_code: i32) -> Self {
        let thread: BTreeMap<usize, ThreadResult> = run
            .map(|r| r.workers.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|w| {
                (
                    w.index,
                    ThreadResult {
                        cycles: w.stats.count,
                        min: w.stats.min,
                        max: w.stats.max,
                        avg: (w.stats.mean() * 100.0).round() / 100.0,
                        exit: w.exit.clone(),
                    },
                )
            })
            .collect();

        Self {
            file_version: FILE_VERSION,
            start_time: start.to_rfc3339(),
            end_time: end.to_rfc3339(),
            return_code,
            num_threads: thread.len(),
            resolution_in_ns: 0,
            thread,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<(), CliError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        fs::write(path, text).map_err(|source| CliError::ReportWrite {
            path: path.display().to_string(),
            source,
        })
    }
}
