// crates/intersite-cli/src/audit.rs
// ============================================================================
// Module: Compile Audit Log
// Description: JSON-lines writer for compile audit events.
// Purpose: Give operators a machine-readable trace of each compilation.
// Dependencies: intersite-core, serde, serde_json
// ============================================================================

//! ## Overview
//! [`JsonLineAuditSink`] stamps each [`CompileAuditEvent`] with the wall-clock
//! time and writes it as one JSON object per line. Write failures are
//! swallowed: auditing never changes the outcome of a compilation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Stderr;
use std::io::Write;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use intersite_core::CompileAuditEvent;
use intersite_core::CompileAuditSink;
use serde::Serialize;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Timestamped audit line.
#[derive(Debug, Serialize)]
pub struct AuditRecord<'a> {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// The compile event.
    #[serde(flatten)]
    pub event: &'a CompileAuditEvent,
}

impl<'a> AuditRecord<'a> {
    /// Stamps `event` with the current time.
    #[must_use]
    pub fn now(event: &'a CompileAuditEvent) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            timestamp_ms,
            event,
        }
    }
}

// ============================================================================
// SECTION: Sink
// ============================================================================

/// Audit sink that writes JSON lines to any writer.
pub struct JsonLineAuditSink<W: Write + Send> {
    /// Output writer for audit records.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineAuditSink<W> {
    /// Creates a sink writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer, discarding a poisoned lock.
    pub fn into_inner(self) -> Option<W> {
        self.writer.into_inner().ok()
    }
}

impl JsonLineAuditSink<Stderr> {
    /// Creates a sink writing to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> CompileAuditSink for JsonLineAuditSink<W> {
    fn record(&self, event: &CompileAuditEvent) {
        let record = AuditRecord::now(event);
        if let Ok(payload) = serde_json::to_string(&record)
            && let Ok(mut writer) = self.writer.lock()
        {
            let _ = writeln!(writer, "{payload}");
            let _ = writer.flush();
        }
    }
}
