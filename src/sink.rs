//! Log sinks: where wrapped functions send their entries.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use thiserror::Error;

/// Severity of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// `calling ...` and `... returned ...` entries.
    Info,
    /// A failure of the wrapped function, with its context.
    Diagnostic,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => f.write_str("INFO"),
            Level::Diagnostic => f.write_str("DIAGNOSTIC"),
        }
    }
}

/// Destination for the entries produced by wrapped functions.
///
/// A sink is shared between every wrapper that logs into it and may be called
/// from several threads at once.
pub trait Sink: Send + Sync {
    fn emit(&self, level: Level, message: &str);
}

// Any `Fn(Level, &str)` closure is a sink
impl<F> Sink for F
where
    F: Fn(Level, &str) + Send + Sync,
{
    fn emit(&self, level: Level, message: &str) {
        self(level, message)
    }
}

/// Shared handle to a sink.
pub type SinkRef = Arc<dyn Sink>;

/// Conversion into a [`SinkRef`], accepted wherever a sink is configured.
pub trait IntoSink {
    fn into_sink(self) -> SinkRef;
}

impl IntoSink for SinkRef {
    fn into_sink(self) -> SinkRef {
        self
    }
}

impl IntoSink for &SinkRef {
    fn into_sink(self) -> SinkRef {
        Arc::clone(self)
    }
}

impl<S: Sink + 'static> IntoSink for Arc<S> {
    fn into_sink(self) -> SinkRef {
        self
    }
}

impl<S: Sink + 'static> IntoSink for &Arc<S> {
    fn into_sink(self) -> SinkRef {
        Arc::clone(self) as SinkRef
    }
}

/// Forwards entries to `tracing` under the `addlogging` target.
///
/// Info entries become `INFO` events, diagnostic entries become `ERROR`
/// events. Filtering and formatting belong to the installed subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!(target: "addlogging", "{message}"),
            Level::Diagnostic => tracing::error!(target: "addlogging", "{message}"),
        }
    }
}

/// One entry recorded by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub level: Level,
    pub message: String,
}

/// Keeps every entry in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Entry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded entries.
    pub fn entries(&self) -> Vec<Entry> {
        self.lock().clone()
    }

    /// Snapshot of the recorded messages, without their levels.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|entry| entry.message.clone()).collect()
    }

    /// Removes and returns the recorded entries.
    pub fn take(&self) -> Vec<Entry> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        // a writer can only panic while pushing, which leaves the Vec intact
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for MemorySink {
    fn emit(&self, level: Level, message: &str) {
        self.lock().push(Entry {
            level,
            message: message.to_owned(),
        });
    }
}

static SHARED: OnceLock<SinkRef> = OnceLock::new();

/// Returned by [`install_shared_sink`] once the shared sink has been fixed.
#[derive(Debug, Error)]
#[error("the shared sink is already installed")]
pub struct SinkAlreadyInstalled;

/// The process-wide sink used by wrappers that were not given one.
///
/// Falls back to [`TracingSink`] unless [`install_shared_sink`] ran first.
pub fn shared_sink() -> SinkRef {
    Arc::clone(SHARED.get_or_init(|| Arc::new(TracingSink)))
}

/// Replaces the default shared sink. Call it once from the composition root,
/// before any wrapped function runs.
pub fn install_shared_sink(sink: impl IntoSink) -> Result<(), SinkAlreadyInstalled> {
    SHARED.set(sink.into_sink()).map_err(|_| SinkAlreadyInstalled)
}
