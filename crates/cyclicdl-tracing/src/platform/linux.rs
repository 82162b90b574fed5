//! ftrace trace_marker sink

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::debugfs::{find_debugfs, trace_marker_path};
use crate::{TraceEvent, TraceSink, TracingError, TracingMetrics};

/// Longest line written per event; longer lines are truncated.
const LINE_CAPACITY: usize = 160;

/// Sink writing one line per event to the ftrace marker.
///
/// Formatting happens in a stack buffer and each event is a single
/// `write(2)` through a shared `&W`, so workers never wait on each other
/// and never interleave partial lines.
///
/// # Permissions
///
/// Requires write access to `<debugfs>/tracing/trace_marker`, which
/// typically means root.
pub struct TraceMarkerSink<W = File> {
    marker: W,
    events: AtomicU64,
    dropped: AtomicU64,
}

impl TraceMarkerSink<File> {
    /// Open the marker below the mounted debugfs.
    ///
    /// # Errors
    ///
    /// [`TracingError::DebugfsNotMounted`] if debugfs cannot be found, or
    /// [`TracingError::Io`] if the marker cannot be opened.
    pub fn open_default() -> Result<Self, TracingError> {
        let debugfs = find_debugfs().ok_or(TracingError::DebugfsNotMounted)?;
        Self::open(&trace_marker_path(debugfs))
    }

    /// Open a marker file at `path`.
    ///
    /// # Errors
    ///
    /// [`TracingError::Io`] if the file does not exist or is not writable.
    pub fn open(path: &Path) -> Result<Self, TracingError> {
        let file = File::options()
            .append(true)
            .open(path)
            .map_err(|e| TracingError::io(path, e))?;
        Ok(Self::from_writer(file))
    }
}

impl<W> TraceMarkerSink<W>
where
    for<'a> &'a W: Write,
{
    /// Wrap any writer that can be written through a shared reference.
    pub fn from_writer(writer: W) -> Self {
        Self {
            marker: writer,
            events: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.marker
    }
}

fn format_line(event: &TraceEvent, buf: &mut [u8; LINE_CAPACITY]) -> usize {
    let mut cursor = Cursor::new(&mut buf[..]);
    // A full buffer just truncates the line.
    if write!(cursor, "{event}").is_err() {
        return LINE_CAPACITY.saturating_sub(1);
    }
    usize::try_from(cursor.position()).unwrap_or(LINE_CAPACITY)
}

impl<W: Send + Sync> TraceSink for TraceMarkerSink<W>
where
    for<'a> &'a W: Write,
{
    fn emit(&self, event: TraceEvent) {
        let mut buf = [0u8; LINE_CAPACITY];
        let len = format_line(&event, &mut buf).min(LINE_CAPACITY - 1);
        if let Some(newline) = buf.get_mut(len) {
            *newline = b'\n';
        }
        let line = buf.get(..=len).unwrap_or(buf.as_slice());
        match (&self.marker).write_all(line) {
            Ok(()) => self.events.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.dropped.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn metrics(&self) -> TracingMetrics {
        TracingMetrics {
            events_emitted: self.events.load(Ordering::Relaxed),
            events_dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

impl<W> core::fmt::Debug for TraceMarkerSink<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TraceMarkerSink")
            .field("events", &self.events.load(Ordering::Relaxed))
            .field("dropped", &self.dropped.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
