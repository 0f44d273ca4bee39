// crates/claim-gate-server/src/audit.rs
// ============================================================================
// Module: Decision Audit
// Description: Line-delimited JSON audit sink for authorization decisions.
// Purpose: Record every policy decision the gateway acts on.
// Dependencies: claim-gate-core, serde_json
// ============================================================================

//! ## Overview
//! Every decision the gateway acts on is offered to a
//! [`DecisionAuditSink`]. This sink serializes each event as one JSON line
//! to a writer, by default standard error. Write failures are swallowed; an
//! audit trail outage must never fail a request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::sync::Mutex;

use claim_gate_core::DecisionAuditEvent;
use claim_gate_core::DecisionAuditSink;

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// Audit sink writing one JSON line per decision.
///
/// # Invariants
/// - Events are written whole-line under a lock; lines never interleave.
pub struct LogDecisionAuditSink {
    /// Destination for serialized audit lines.
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LogDecisionAuditSink {
    /// Creates a sink writing to the given destination.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Creates a sink writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }
}

impl DecisionAuditSink for LogDecisionAuditSink {
    fn record(&self, event: &DecisionAuditEvent) {
        let Ok(line) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            writeln!(writer, "{line}").ok();
        }
    }
}
