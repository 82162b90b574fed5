//! Process-wide real-time setup.

/// Process-wide real-time configuration applied before workers start.
#[derive(Debug, Clone)]
pub struct RTSetup {
    /// Lock all current and future pages so the measuring loop never takes
    /// a page fault.
    pub lock_memory: bool,
}

impl Default for RTSetup {
    fn default() -> Self {
        Self { lock_memory: true }
    }
}

impl RTSetup {
    /// Create a new RTSetup with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set memory locking.
    #[must_use]
    pub fn with_lock_memory(mut self, enabled: bool) -> Self {
        self.lock_memory = enabled;
        self
    }

    /// Apply the setup. Failures are logged and otherwise ignored: a run
    /// without locked memory still measures, just less reliably.
    pub fn apply(&self) {
        if self.lock_memory {
            lock_memory();
        }
    }
}

#[cfg(target_os = "linux")]
fn lock_memory() {
    match crate::linux::lock_all_memory() {
        Ok(()) => tracing::debug!("Locked process memory"),
        Err(e) => tracing::warn!(error = %e, "mlockall failed, page faults may disturb measurements"),
    }
}

#[cfg(not(target_os = "linux"))]
fn lock_memory() {
    tracing::warn!("Memory locking is not supported on this platform");
}
