#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use application::TagDispatcher;
use domain::{AgentCall, AgentError, AnalyticsAgent, Clock, PageEnvironment, TaggingValues};
use serde_json::{Value, json};

pub const PREFIX: &str = "nbs-aws:application:overpayment";

// --- Port Mocks ---

#[derive(Default)]
pub struct RecordingAgent {
    calls: Mutex<Vec<AgentCall>>,
}

impl RecordingAgent {
    pub fn calls(&self) -> Vec<AgentCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn views(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, AgentCall::View { .. }))
            .count()
    }

    pub fn actions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AgentCall::Action { event, .. } => Some(event),
                _ => None,
            })
            .collect()
    }

    /// Entry point names in call order
    pub fn names(&self) -> Vec<&'static str> {
        self.calls().iter().map(AgentCall::name).collect()
    }

    pub fn last_view_data(&self) -> Option<Value> {
        self.calls().into_iter().rev().find_map(|call| match call {
            AgentCall::View { data } => Some(data),
            _ => None,
        })
    }

    fn record(&self, call: AgentCall) -> Result<(), AgentError> {
        self.calls.lock().unwrap().push(call);
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

/// Agent whose entry points are all missing
pub struct AbsentAgent;

impl AnalyticsAgent for AbsentAgent {
    fn view(&self, _data: &Value) -> Result<(), AgentError> {
        Err(AgentError::Unavailable("wa_view".into()))
    }

    fn action(&self, _event: &str, _data: &Value) -> Result<(), AgentError> {
        Err(AgentError::Unavailable("wa_action".into()))
    }

    fn ddl_backup(&self, _data: &Value) -> Result<(), AgentError> {
        Err(AgentError::Failed {
            name: "ddl_backup".into(),
            reason: "storage full".into(),
        })
    }

    fn ddl_restore(&self) -> Result<(), AgentError> {
        Err(AgentError::Unavailable("ddl_restore".into()))
    }
}

#[derive(Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn set(&self, ms: f64) {
        *self.now.lock().unwrap() = ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now.lock().unwrap()
    }
}

// --- Fixtures ---

pub fn values() -> TaggingValues {
    TaggingValues::from_json(json!({
        "page": {
            "prefix": ["nbs-aws", "application", "overpayment"],
            "initial": ["landing"]
        },
        "regions": {
            "context": ["nbs_user"],
            "view": ["nbs_page_title"],
            "action": [
                "nbs_message",
                "nbs_user_input",
                "nbs_element_interaction",
                "nbs_app_mortgage"
            ]
        },
        "item_keys": {
            "nbs_message": { "category": "type", "text": "message", "cause": "" },
            "nbs_element_interaction": {
                "type": "nbs_interaction_type",
                "label": "nbs_interaction_label"
            }
        },
        "ddl": {
            "nbs_user": { "nbs_user_logged_in": "no" },
            "nbs_page_title": "untitled",
            "nbs_message": []
        },
        "types": {
            "message": { "BUSINESS": "business", "USER": "user" },
            "interaction": { "HELP": "help", "REVEAL": "reveal", "LINK": "link", "BACK": "back" },
            "action": {
                "DEFAULT": "interaction",
                "INPUT": "input",
                "HELP": "help",
                "SUBMIT": "submit"
            }
        },
        "value_maps": {
            "input_validity": { "true": "valid", "false": "invalid", "null": "not validated" },
            "environments": { "dev": "development" }
        }
    }))
    .unwrap()
}

pub struct Harness {
    pub dispatcher: TagDispatcher,
    pub agent: Arc<RecordingAgent>,
    pub clock: Arc<ManualClock>,
}

pub fn harness() -> Harness {
    harness_with_depth(1)
}

pub fn harness_with_depth(depth: usize) -> Harness {
    let agent = Arc::new(RecordingAgent::default());
    let clock = Arc::new(ManualClock::default());
    let dispatcher = TagDispatcher::new(
        Arc::new(values()),
        agent.clone(),
        clock.clone(),
        PageEnvironment::default(),
    )
    .with_backup_depth(depth);

    Harness {
        dispatcher,
        agent,
        clock,
    }
}

pub fn page_name(suffix: &str) -> String {
    format!("{PREFIX}:{suffix}")
}
