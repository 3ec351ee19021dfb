//! Gated debug tracing of operation calls.
//!
//! Every registry entry reports itself to a [`Tracer`] before running its body. The tracer
//! is injected into the module base at construction; when disabled it does no work at all,
//! not even formatting the arguments.

use crate::category::Category;
use crate::value::{Value, describe};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Target used by [`TracingSink`]; raise it to `DEBUG` to see operation traces.
pub const TRACE_TARGET: &str = "storemod::trace";

/// One traced operation call.
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent<'a> {
    pub category: Category,
    pub module: &'a str,
    pub operation: &'a str,
    pub args: &'a str,
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}.{}({})", self.category, self.module, self.operation, self.args)
    }
}

/// Receiver of trace events.
pub trait TraceSink: Send + Sync {
    fn trace(&self, event: &TraceEvent<'_>);
}

/// Forwards trace events to `tracing` at `DEBUG` level on [`TRACE_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn trace(&self, event: &TraceEvent<'_>) {
        tracing::debug!(
            target: TRACE_TARGET,
            category = %event.category,
            module = event.module,
            operation = event.operation,
            "{event}"
        );
    }
}

/// An owned copy of a [`TraceEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub category: Category,
    pub module: String,
    pub operation: String,
    pub args: String,
}

/// Keeps every event in memory. Handy for assertions.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<TraceRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.lock().clone()
    }

    /// Returns the recorded events rendered as trace lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| {
                TraceEvent {
                    category: r.category,
                    module: &r.module,
                    operation: &r.operation,
                    args: &r.args,
                }
                .to_string()
            })
            .collect()
    }
}

impl TraceSink for MemorySink {
    fn trace(&self, event: &TraceEvent<'_>) {
        self.records.lock().push(TraceRecord {
            category: event.category,
            module: event.module.to_owned(),
            operation: event.operation.to_owned(),
            args: event.args.to_owned(),
        });
    }
}

/// A sink plus the flag that gates it.
#[derive(Clone)]
pub struct Tracer {
    enabled: bool,
    sink: Arc<dyn TraceSink>,
}

impl Tracer {
    pub fn new(enabled: bool, sink: Arc<dyn TraceSink>) -> Self {
        Self { enabled, sink }
    }

    /// A tracer that never emits.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(false, Arc::new(TracingSink))
    }

    /// An enabled tracer backed by [`TracingSink`].
    #[must_use]
    pub fn tracing() -> Self {
        Self::new(true, Arc::new(TracingSink))
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn trace(&self, category: Category, module: &str, operation: &str, args: &[Value]) {
        if !self.enabled {
            return;
        }
        let args = describe(args);
        self.sink.trace(&TraceEvent { category, module, operation, args: &args });
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").field("enabled", &self.enabled).finish_non_exhaustive()
    }
}
