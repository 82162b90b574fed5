//! Cooperative cancellation shared by the coordinator and the workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cyclicdl_errors::CyclicError;

/// One-way stop flag. Once requested it stays requested.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    /// A flag that is not yet requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every loop to stop.
    #[inline]
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// True once any holder has called [`ShutdownFlag::request`].
    #[inline]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Request shutdown on SIGINT and SIGTERM.
///
/// # Errors
///
/// Fails if a handler was already installed in this process.
pub fn install_signal_handler(flag: &ShutdownFlag) -> Result<(), CyclicError> {
    let flag = flag.clone();
    ctrlc::set_handler(move || flag.request())
        .map_err(|e| CyclicError::other(format!("failed to install signal handler: {e}")))
}
