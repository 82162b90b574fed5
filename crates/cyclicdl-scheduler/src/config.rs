//! Run configuration.

use std::time::Duration;

use cyclicdl_atomic::DEFAULT_HISTORY_CAPACITY;
use cyclicdl_errors::CyclicError;

/// Default base period in microseconds.
pub const DEFAULT_INTERVAL_US: u64 = 1_000;

/// Default period increment between workers in microseconds.
pub const DEFAULT_STEP_US: u64 = 500;

/// Default live display refresh period.
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(10);

/// Everything the coordinator needs to know about one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Period of worker 0 in microseconds
    pub interval_us: u64,
    /// Period increment per worker in microseconds
    pub step_us: u64,
    /// Worker count, `None` for the default
    pub threads: Option<usize>,
    /// Stop after this long, `None` to run until interrupted
    pub duration: Option<Duration>,
    /// Keep per-cycle history and track outliers
    pub history: bool,
    /// History slots per worker
    pub history_capacity: usize,
    /// Skip the live display
    pub quiet: bool,
    /// Lock process memory before starting
    pub lock_memory: bool,
    /// Live display refresh period
    pub refresh: Duration,
    /// Route SIGINT and SIGTERM to the shutdown flag
    pub install_signals: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            interval_us: DEFAULT_INTERVAL_US,
            step_us: DEFAULT_STEP_US,
            threads: None,
            duration: None,
            history: false,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            quiet: false,
            lock_memory: true,
            refresh: DEFAULT_REFRESH,
            install_signals: true,
        }
    }
}

impl RunConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base period.
    #[must_use]
    pub fn with_interval_us(mut self, interval_us: u64) -> Self {
        self.interval_us = interval_us;
        self
    }

    /// Set the per-worker period step.
    #[must_use]
    pub fn with_step_us(mut self, step_us: u64) -> Self {
        self.step_us = step_us;
        self
    }

    /// Set an explicit worker count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Stop after `duration`.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Enable or disable history mode.
    #[must_use]
    pub fn with_history(mut self, enabled: bool) -> Self {
        self.history = enabled;
        self
    }

    /// Set the history slots per worker.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Enable or disable the live display.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Enable or disable memory locking.
    #[must_use]
    pub fn with_lock_memory(mut self, enabled: bool) -> Self {
        self.lock_memory = enabled;
        self
    }

    /// Set the live display refresh period.
    #[must_use]
    pub fn with_refresh(mut self, refresh: Duration) -> Self {
        self.refresh = refresh;
        self
    }

    /// Enable or disable signal handler installation.
    #[must_use]
    pub fn with_signals(mut self, enabled: bool) -> Self {
        self.install_signals = enabled;
        self
    }

    /// Worker count for `available_cpus`: the explicit count if one was
    /// given, otherwise `default_threads`.
    pub fn worker_count(&self, default_threads: usize) -> usize {
        self.threads.unwrap_or(default_threads)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero period, a zero worker
    /// count or a zero refresh period.
    pub fn validate(&self) -> Result<(), CyclicError> {
        if self.interval_us == 0 {
            return Err(CyclicError::config("interval must be greater than zero"));
        }
        if self.threads == Some(0) {
            return Err(CyclicError::config("thread count must be greater than zero"));
        }
        if self.refresh.is_zero() {
            return Err(CyclicError::config("refresh period must be greater than zero"));
        }
        Ok(())
    }
}
