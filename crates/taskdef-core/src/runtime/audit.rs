// crates/taskdef-core/src/runtime/audit.rs
// ============================================================================
// Module: Lifecycle Audit Sinks
// Description: JSON-lines, in-memory, and no-op lifecycle event sinks.
// Purpose: Persist one structured record per lifecycle transition.
// Dependencies: serde_json, std
// ============================================================================

//! ## Overview
//! [`JsonlAuditSink`] writes one JSON object per line to any writer (a file,
//! stderr). [`InMemoryAuditSink`] collects events for assertions and
//! [`NoopAuditSink`] discards them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::AuditError;
use crate::interfaces::AuditSink;
use crate::interfaces::LifecycleEvent;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink that discards events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &LifecycleEvent) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Sink writing newline-delimited JSON events.
pub struct JsonlAuditSink<W: Write + Send> {
    /// Output writer.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonlAuditSink<W> {
    /// Creates a sink over `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> AuditSink for JsonlAuditSink<W> {
    fn record(&self, event: &LifecycleEvent) -> Result<(), AuditError> {
        let line =
            serde_json::to_vec(event).map_err(|err| AuditError::Serialize(err.to_string()))?;
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| AuditError::Io("audit writer mutex poisoned".to_string()))?;
        guard.write_all(&line).map_err(|err| AuditError::Io(err.to_string()))?;
        guard.write_all(b"\n").map_err(|err| AuditError::Io(err.to_string()))?;
        guard.flush().map_err(|err| AuditError::Io(err.to_string()))?;
        drop(guard);
        Ok(())
    }
}

/// Sink collecting events in memory. Clones share the event list.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditSink {
    /// Recorded events.
    events: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Io`] when the event mutex is poisoned.
    pub fn events(&self) -> Result<Vec<LifecycleEvent>, AuditError> {
        self.events
            .lock()
            .map(|events| events.clone())
            .map_err(|_| AuditError::Io("audit event mutex poisoned".to_string()))
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: &LifecycleEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .map_err(|_| AuditError::Io("audit event mutex poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}
