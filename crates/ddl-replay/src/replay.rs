use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use application::{TagCommand, TagDispatcher, TagSession, ViewTags};
use domain::{AgentCall, AnalyticsAgent, Clock, TaggingValues};
use infrastructure::{CompositeAgent, ConsoleAgent, RecordingAgent, Settings, entry_route};

const SESSION_CAPACITY: usize = 64;

/// One step of a recorded scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplayStep {
    Command(TagCommand),
    /// Let time pass before the next command
    Wait { wait_ms: u64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayScenario {
    /// Scenario descriptors keyed by handler name
    #[serde(default)]
    pub view_tags: Option<Value>,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

impl ReplayScenario {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let scenario: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Scenario {} is not a valid replay", path.display()))?;

        info!(path = %path.display(), steps = scenario.steps.len(), "🎬 Scenario loaded");
        Ok(scenario)
    }

    pub fn view_tags(&self) -> anyhow::Result<ViewTags> {
        match &self.view_tags {
            Some(descriptors) => {
                ViewTags::from_descriptors(descriptors).context("Invalid view tag descriptors")
            }
            None => Ok(ViewTags::default()),
        }
    }
}

/// What the agents saw, plus the data layer left behind
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub transcript: Vec<AgentCall>,
    pub digital_data: Value,
}

/// Wire a dispatcher to the configured agents.
///
/// The recorder always receives every notification; the console agent is
/// added when enabled in settings.
pub fn build_dispatcher(
    settings: &Settings,
    values: Arc<TaggingValues>,
    recorder: &RecordingAgent,
    clock: Arc<dyn Clock>,
) -> TagDispatcher {
    let mut agents: Vec<Arc<dyn AnalyticsAgent>> = vec![Arc::new(recorder.clone())];
    if settings.console_agent {
        agents.push(Arc::new(ConsoleAgent::new()));
    }
    let agent = Arc::new(CompositeAgent::new(agents));

    let route = entry_route(
        &settings.entry.referrer,
        &settings.entry.search,
        &values.value_maps.routes,
    );

    let mut dispatcher =
        TagDispatcher::new(values, agent, clock, settings.page_environment())
            .with_backup_depth(settings.backup_depth);
    dispatcher.set_user_application_route(&route);
    info!(route = %route, "🧭 Entry route resolved");
    dispatcher
}

/// Feed every step through a tag session and collect the outcome
pub async fn replay(
    dispatcher: TagDispatcher,
    scenario: &ReplayScenario,
    recorder: &RecordingAgent,
) -> anyhow::Result<ReplayOutcome> {
    let view_tags = scenario.view_tags()?;
    let (handle, task) = TagSession::spawn(dispatcher, view_tags, SESSION_CAPACITY);

    for (index, step) in scenario.steps.iter().enumerate() {
        match step {
            ReplayStep::Wait { wait_ms } => {
                debug!(step = index, wait_ms, "Waiting");
                tokio::time::sleep(Duration::from_millis(*wait_ms)).await;
            }
            ReplayStep::Command(command) => handle
                .send(command.clone())
                .await
                .with_context(|| format!("Step {index} was not delivered"))?,
        }
    }

    let digital_data = handle.digital_data().await?;
    drop(handle);
    task.await.context("Tag session task failed")?;

    let transcript = recorder.calls();
    info!(calls = transcript.len(), "✅ Replay complete");
    Ok(ReplayOutcome {
        transcript,
        digital_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_forms() {
        let steps: Vec<ReplayStep> = serde_json::from_value(json!([
            { "wait_ms": 50 },
            { "type": "forget_help_labels" },
            { "type": "interaction", "kind": "HELP", "label": "Fees" }
        ]))
        .unwrap();

        assert_eq!(steps[0], ReplayStep::Wait { wait_ms: 50 });
        assert_eq!(steps[1], ReplayStep::Command(TagCommand::ForgetHelpLabels));
        assert!(matches!(
            &steps[2],
            ReplayStep::Command(TagCommand::Interaction { kind, .. }) if kind == "HELP"
        ));
    }

    #[test]
    fn test_scenario_without_view_tags() {
        let scenario: ReplayScenario = serde_json::from_value(json!({ "steps": [] })).unwrap();
        assert!(scenario.view_tags().unwrap().is_empty());
    }

    #[test]
    fn test_bad_descriptor_is_reported() {
        let scenario: ReplayScenario = serde_json::from_value(json!({
            "view_tags": { "x": { "type": "teleport" } }
        }))
        .unwrap();
        assert!(scenario.view_tags().is_err());
    }
}
