use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

pub const WA_VIEW: &str = "wa_view";
pub const WA_ACTION: &str = "wa_action";
pub const DDL_BACKUP: &str = "ddl_backup";
pub const DDL_RESTORE: &str = "ddl_restore";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    /// The agent does not provide this entry point
    #[error("{0} not available")]
    Unavailable(String),

    #[error("{name} failed: {reason}")]
    Failed { name: String, reason: String },
}

/// External web analytics agent.
///
/// Receives the current DigitalData with every notification. Implementations
/// report problems through [`AgentError`]; callers go through [`safely`] so an
/// agent failure never reaches the host application.
#[cfg_attr(test, mockall::automock)]
pub trait AnalyticsAgent: Send + Sync {
    /// The current DigitalData represents a page view
    fn view(&self, data: &Value) -> Result<(), AgentError>;

    /// A named discrete event happened
    fn action(&self, event: &str, data: &Value) -> Result<(), AgentError>;

    /// An overlay is about to replace the page snapshot
    fn ddl_backup(&self, data: &Value) -> Result<(), AgentError>;

    /// The overlay closed and the page snapshot is back
    fn ddl_restore(&self) -> Result<(), AgentError>;
}

/// A single notification as seen by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum AgentCall {
    View { data: Value },
    Action { event: String, data: Value },
    Backup { data: Value },
    Restore,
}

impl AgentCall {
    /// Entry point name as exposed by the agent
    pub fn name(&self) -> &'static str {
        match self {
            Self::View { .. } => WA_VIEW,
            Self::Action { .. } => WA_ACTION,
            Self::Backup { .. } => DDL_BACKUP,
            Self::Restore => DDL_RESTORE,
        }
    }

    /// Deliver this notification to an agent
    pub fn deliver(&self, agent: &dyn AnalyticsAgent) -> Result<(), AgentError> {
        match self {
            Self::View { data } => agent.view(data),
            Self::Action { event, data } => agent.action(event, data),
            Self::Backup { data } => agent.ddl_backup(data),
            Self::Restore => agent.ddl_restore(),
        }
    }
}

/// Run an agent call, logging and swallowing any failure.
///
/// A panicking agent counts as a failed call. Returns whether the call went
/// through.
pub fn safely<F>(name: &str, call: F) -> bool
where
    F: FnOnce() -> Result<(), AgentError>,
{
    let outcome = catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|panic| {
        Err(AgentError::Failed {
            name: name.to_string(),
            reason: format!("panicked: {}", panic_message(panic.as_ref())),
        })
    });

    match outcome {
        Ok(()) => {
            debug!(agent_call = %name, "Analytics agent notified");
            true
        }
        Err(AgentError::Unavailable(entry_point)) => {
            error!(agent_call = %name, "{} not available", entry_point);
            false
        }
        Err(e) => {
            error!(agent_call = %name, error = %e, "Analytics agent call failed");
            false
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safely_runs_successful_call() {
        let mut agent = MockAnalyticsAgent::new();
        agent
            .expect_action()
            .withf(|event, _| event == "test")
            .times(1)
            .returning(|_, _| Ok(()));

        let data = json!({});
        assert!(safely(WA_ACTION, || agent.action("test", &data)));
    }

    #[test]
    fn test_safely_swallows_failure() {
        let mut agent = MockAnalyticsAgent::new();
        agent.expect_view().times(1).returning(|_| {
            Err(AgentError::Failed {
                name: WA_VIEW.to_string(),
                reason: "Internal analytics error".to_string(),
            })
        });

        assert!(!safely(WA_VIEW, || agent.view(&json!({}))));
    }

    #[test]
    fn test_safely_reports_unavailable_entry_point() {
        let mut agent = MockAnalyticsAgent::new();
        agent
            .expect_ddl_restore()
            .times(1)
            .returning(|| Err(AgentError::Unavailable(DDL_RESTORE.to_string())));

        assert!(!safely(DDL_RESTORE, || agent.ddl_restore()));
    }

    #[test]
    fn test_safely_contains_panicking_agent() {
        let crashed = safely(WA_ACTION, || -> Result<(), AgentError> {
            panic!("agent crashed on input")
        });
        assert!(!crashed);
    }

    #[test]
    fn test_panic_message_forms() {
        let literal = catch_unwind(|| -> u8 { panic!("static text") }).unwrap_err();
        assert_eq!(panic_message(literal.as_ref()), "static text");

        let formatted = catch_unwind(|| -> u8 { panic!("code {}", 7) }).unwrap_err();
        assert_eq!(panic_message(formatted.as_ref()), "code 7");
    }

    #[test]
    fn test_deliver_routes_to_entry_point() {
        let mut agent = MockAnalyticsAgent::new();
        agent
            .expect_ddl_backup()
            .withf(|data| data == &json!({ "page": {} }))
            .times(1)
            .returning(|_| Ok(()));

        let call = AgentCall::Backup {
            data: json!({ "page": {} }),
        };
        assert_eq!(call.name(), DDL_BACKUP);
        assert!(call.deliver(&agent).is_ok());
    }

    #[test]
    fn test_unavailable_message() {
        let err = AgentError::Unavailable(WA_VIEW.to_string());
        assert_eq!(err.to_string(), "wa_view not available");
    }
}
