//! Audit trace for one screening
//!
//! Every pipeline stage appends an event with a JSON payload. Persistence is
//! left to the caller; the trace is embedded in the screening report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrace {
    pub trace_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub events: Vec<AuditEvent>,
}

impl AuditTrace {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            created_at,
            events: Vec::new(),
        }
    }

    pub fn add_event(&mut self, event_type: impl Into<String>, payload: serde_json::Value) {
        self.events.push(AuditEvent {
            event_id: Uuid::new_v4(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            payload,
        });
    }

    /// Event types in recording order
    pub fn event_types(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.event_type.as_str()).collect()
    }
}
