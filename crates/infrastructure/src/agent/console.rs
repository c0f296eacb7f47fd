use std::sync::Mutex;

use domain::agent::{DDL_BACKUP, DDL_RESTORE, WA_ACTION, WA_VIEW};
use domain::{AgentError, AnalyticsAgent};
use serde_json::Value;
use tracing::info;

/// Development agent that logs every notification.
///
/// Keeps its own copy of the last backup so a restore can be inspected.
#[derive(Debug, Default)]
pub struct ConsoleAgent {
    backup: Mutex<Option<Value>>,
}

impl ConsoleAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backup taken on the last open, if not yet restored
    pub fn backup(&self) -> Option<Value> {
        self.backup.lock().ok().and_then(|backup| backup.clone())
    }

    fn lock_failed(name: &str, reason: impl ToString) -> AgentError {
        AgentError::Failed {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl AnalyticsAgent for ConsoleAgent {
    fn view(&self, data: &Value) -> Result<(), AgentError> {
        info!(data = %data, "📊 {}", WA_VIEW);
        Ok(())
    }

    fn action(&self, event: &str, data: &Value) -> Result<(), AgentError> {
        info!(event = %event, data = %data, "👆 {}", WA_ACTION);
        Ok(())
    }

    fn ddl_backup(&self, data: &Value) -> Result<(), AgentError> {
        let mut backup = self
            .backup
            .lock()
            .map_err(|e| Self::lock_failed(DDL_BACKUP, e))?;
        *backup = Some(data.clone());
        info!(data = %data, "💾 {}", DDL_BACKUP);
        Ok(())
    }

    fn ddl_restore(&self) -> Result<(), AgentError> {
        let restored = self
            .backup
            .lock()
            .map_err(|e| Self::lock_failed(DDL_RESTORE, e))?
            .take();
        match restored {
            Some(data) => info!(data = %data, "♻️ {}", DDL_RESTORE),
            None => info!("♻️ {} (no backup held)", DDL_RESTORE),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backup_is_consumed_by_restore() {
        let agent = ConsoleAgent::new();
        agent.ddl_backup(&json!({ "page": "a" })).unwrap();
        assert_eq!(agent.backup(), Some(json!({ "page": "a" })));

        agent.ddl_restore().unwrap();
        assert_eq!(agent.backup(), None);
        assert!(agent.ddl_restore().is_ok());
    }
}
