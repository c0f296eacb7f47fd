use std::sync::Arc;

use domain::agent::{DDL_BACKUP, DDL_RESTORE, WA_ACTION, WA_VIEW};
use domain::{AgentError, AnalyticsAgent};
use serde_json::Value;

/// Fans every notification out to several agents.
///
/// A failing agent is logged and skipped; the others still receive the call.
/// The composite itself reports failure only when every agent failed.
pub struct CompositeAgent {
    agents: Vec<Arc<dyn AnalyticsAgent>>,
}

impl CompositeAgent {
    pub fn new(agents: Vec<Arc<dyn AnalyticsAgent>>) -> Self {
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn fan_out<F>(&self, name: &str, call: F) -> Result<(), AgentError>
    where
        F: Fn(&dyn AnalyticsAgent) -> Result<(), AgentError>,
    {
        if self.agents.is_empty() {
            return Err(AgentError::Unavailable(name.to_string()));
        }

        let mut last_error = None;
        let mut delivered = 0;
        for agent in &self.agents {
            match call(agent.as_ref()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::error!(agent_call = %name, error = %e, "Failed to notify one of the agents");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if delivered == 0 => Err(e),
            _ => Ok(()),
        }
    }
}

impl AnalyticsAgent for CompositeAgent {
    fn view(&self, data: &Value) -> Result<(), AgentError> {
        self.fan_out(WA_VIEW, |agent| agent.view(data))
    }

    fn action(&self, event: &str, data: &Value) -> Result<(), AgentError> {
        self.fan_out(WA_ACTION, |agent| agent.action(event, data))
    }

    fn ddl_backup(&self, data: &Value) -> Result<(), AgentError> {
        self.fan_out(DDL_BACKUP, |agent| agent.ddl_backup(data))
    }

    fn ddl_restore(&self) -> Result<(), AgentError> {
        self.fan_out(DDL_RESTORE, |agent| agent.ddl_restore())
    }
}
