use std::sync::{Arc, Mutex};

use domain::{AgentCall, AgentError, AnalyticsAgent};
use serde_json::Value;

/// Keeps every notification it receives, in order
#[derive(Debug, Clone, Default)]
pub struct RecordingAgent {
    calls: Arc<Mutex<Vec<AgentCall>>>,
}

impl RecordingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the transcript so far
    pub fn calls(&self) -> Vec<AgentCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn record(&self, call: AgentCall) -> Result<(), AgentError> {
        let mut calls = self.calls.lock().map_err(|e| AgentError::Failed {
            name: call.name().to_string(),
            reason: e.to_string(),
        })?;
        calls.push(call);
        Ok(())
    }
}

impl AnalyticsAgent for RecordingAgent {
    fn view(&self, data: &Value) -> Result<(), AgentError> {
        self.record(AgentCall::View { data: data.clone() })
    }

    fn action(&self, event: &str, data: &Value) -> Result<(), AgentError> {
        self.record(AgentCall::Action {
            event: event.to_string(),
            data: data.clone(),
        })
    }

    fn ddl_backup(&self, data: &Value) -> Result<(), AgentError> {
        self.record(AgentCall::Backup { data: data.clone() })
    }

    fn ddl_restore(&self) -> Result<(), AgentError> {
        self.record(AgentCall::Restore)
    }
}
