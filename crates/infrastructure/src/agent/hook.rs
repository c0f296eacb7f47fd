use domain::agent::{DDL_BACKUP, DDL_RESTORE, WA_ACTION, WA_VIEW};
use domain::{AgentError, AnalyticsAgent};
use serde_json::Value;

type DataHook = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;
type ActionHook = Box<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;
type RestoreHook = Box<dyn Fn() -> Result<(), String> + Send + Sync>;

/// Agent assembled from individually registered entry points.
///
/// Mirrors a vendor script that may or may not have installed each of its
/// four functions. A missing entry point answers `Unavailable`.
#[derive(Default)]
pub struct HookAgent {
    view: Option<DataHook>,
    action: Option<ActionHook>,
    backup: Option<DataHook>,
    restore: Option<RestoreHook>,
}

impl HookAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_view<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.view = Some(Box::new(hook));
        self
    }

    pub fn on_action<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.action = Some(Box::new(hook));
        self
    }

    pub fn on_backup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.backup = Some(Box::new(hook));
        self
    }

    pub fn on_restore<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Result<(), String> + Send + Sync + 'static,
    {
        self.restore = Some(Box::new(hook));
        self
    }
}

fn failed(name: &str) -> impl FnOnce(String) -> AgentError + '_ {
    move |reason| AgentError::Failed {
        name: name.to_string(),
        reason,
    }
}

fn unavailable(name: &str) -> AgentError {
    AgentError::Unavailable(name.to_string())
}

impl AnalyticsAgent for HookAgent {
    fn view(&self, data: &Value) -> Result<(), AgentError> {
        let hook = self.view.as_ref().ok_or_else(|| unavailable(WA_VIEW))?;
        hook(data).map_err(failed(WA_VIEW))
    }

    fn action(&self, event: &str, data: &Value) -> Result<(), AgentError> {
        let hook = self.action.as_ref().ok_or_else(|| unavailable(WA_ACTION))?;
        hook(event, data).map_err(failed(WA_ACTION))
    }

    fn ddl_backup(&self, data: &Value) -> Result<(), AgentError> {
        let hook = self.backup.as_ref().ok_or_else(|| unavailable(DDL_BACKUP))?;
        hook(data).map_err(failed(DDL_BACKUP))
    }

    fn ddl_restore(&self) -> Result<(), AgentError> {
        let hook = self.restore.as_ref().ok_or_else(|| unavailable(DDL_RESTORE))?;
        hook().map_err(failed(DDL_RESTORE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_missing_entry_points_are_unavailable() {
        let agent = HookAgent::new();
        assert_eq!(
            agent.view(&json!({})),
            Err(AgentError::Unavailable("wa_view".into()))
        );
        assert_eq!(
            agent.ddl_restore(),
            Err(AgentError::Unavailable("ddl_restore".into()))
        );
    }

    #[test]
    fn test_registered_hooks_receive_calls() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let agent = HookAgent::new().on_action(move |event, _| {
            sink.lock().unwrap().push(event.to_string());
            Ok(())
        });

        agent.action("form_submission", &json!({})).unwrap();
        assert_eq!(*events.lock().unwrap(), vec!["form_submission"]);
    }

    #[test]
    fn test_hook_failure_is_reported() {
        let agent = HookAgent::new().on_backup(|_| Err("quota exceeded".into()));
        assert_eq!(
            agent.ddl_backup(&json!({})),
            Err(AgentError::Failed {
                name: "ddl_backup".into(),
                reason: "quota exceeded".into()
            })
        );
    }
}
