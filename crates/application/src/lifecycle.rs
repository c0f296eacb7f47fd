//! Adapters driven by the UI lifecycle.
//!
//! The host framework owns mounting and rendering; it reports lifecycle
//! signals here and these types decide which tags fire.

use serde::{Deserialize, Serialize};
use tracing::debug;

use domain::PageDescriptor;

use crate::tag::{InputOverride, OverlayKind, TagDispatcher, UserInputOptions};
use crate::view_tags::{Scenario, ScenarioTag, ViewTags, create_view_tags};

const OPEN_TAG: &str = "open";
const CLOSE_TAG: &str = "close";

/// What kind of view a component represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    PageView,
    Overlay,
    Modal,
    Slider,
}

impl ViewKind {
    fn overlay_kind(&self) -> Option<OverlayKind> {
        match self {
            Self::PageView => None,
            Self::Overlay => Some(OverlayKind::Overlay),
            Self::Modal => Some(OverlayKind::Modal),
            Self::Slider => Some(OverlayKind::Slider),
        }
    }

    pub fn is_closeable(&self) -> bool {
        self.overlay_kind().is_some()
    }

    /// Opened and closed by a toggle instead of by mounting
    pub fn is_toggle_controlled(&self) -> bool {
        matches!(self, Self::Slider)
    }
}

/// Fires view tags for one component across its lifecycle
#[derive(Debug)]
pub struct ViewTagController {
    kind: ViewKind,
    bailout: bool,
    tags: ViewTags,
    opened: bool,
}

impl ViewTagController {
    /// `bailout` disables every tag for the component
    pub fn new(analytics_tag: impl Into<PageDescriptor>, kind: ViewKind, bailout: bool) -> Self {
        let name = analytics_tag.into();

        let (open, close) = match kind.overlay_kind() {
            Some(overlay) => (ScenarioTag::Open(overlay), Some(ScenarioTag::Close(overlay))),
            None => (ScenarioTag::PageView, None),
        };

        let mut scenarios = vec![(OPEN_TAG, Scenario::new(open).named(name.clone()))];
        if let Some(close) = close {
            scenarios.push((CLOSE_TAG, Scenario::new(close).named(name)));
        }

        Self {
            kind,
            bailout,
            tags: create_view_tags(scenarios),
            opened: false,
        }
    }

    pub fn tags(&self) -> &ViewTags {
        &self.tags
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    fn open_name(&self) -> PageDescriptor {
        self.tags
            .get(OPEN_TAG)
            .map(|handler| handler.name())
            .unwrap_or_default()
    }

    fn open(&mut self, dispatcher: &mut TagDispatcher) {
        self.tags.call(OPEN_TAG, dispatcher, Default::default());
        self.opened = true;
    }

    fn close(&mut self, dispatcher: &mut TagDispatcher) {
        if !self.opened {
            debug!(kind = ?self.kind, "Close without a prior open ignored");
            return;
        }
        self.tags.call(CLOSE_TAG, dispatcher, Default::default());
        self.opened = false;
    }

    /// Start timing the page load
    pub fn before_render(&self, dispatcher: &mut TagDispatcher) -> Option<f64> {
        if self.bailout {
            return None;
        }
        Some(dispatcher.load_start(&self.open_name()))
    }

    pub fn after_mount(&mut self, dispatcher: &mut TagDispatcher) {
        if !self.bailout && !self.kind.is_toggle_controlled() {
            self.open(dispatcher);
        }
    }

    /// Report a change of the toggle; only toggle-controlled views react
    pub fn after_update(&mut self, dispatcher: &mut TagDispatcher, toggle: bool) {
        if self.bailout || !self.kind.is_toggle_controlled() {
            return;
        }

        if toggle {
            self.open(dispatcher);
        } else {
            self.close(dispatcher);
        }
    }

    pub fn before_unmount(&mut self, dispatcher: &mut TagDispatcher) {
        if !self.bailout && self.kind.is_closeable() && !self.kind.is_toggle_controlled() {
            self.close(dispatcher);
        }
    }
}

/// Tags a business error when a watched flag turns on.
///
/// The first observation only arms the watcher.
#[derive(Debug, Clone)]
pub struct BusinessErrorWatcher {
    message: String,
    cause: String,
    armed: bool,
}

impl BusinessErrorWatcher {
    pub fn new(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: cause.into(),
            armed: false,
        }
    }

    /// Report the flag's current value; returns whether a message was tagged
    pub fn observe(&mut self, dispatcher: &mut TagDispatcher, listener: bool) -> bool {
        if self.armed && listener {
            dispatcher.business_error_message(&self.message, &self.cause)
        } else {
            self.armed = true;
            false
        }
    }
}

/// Tag a user input for a form field unless `no_tag` is set.
///
/// The input counts as valid when there is no error text; `overrides` win
/// over the derived values.
pub fn tag_user_interaction(
    dispatcher: &mut TagDispatcher,
    label: &str,
    no_tag: bool,
    error: Option<&str>,
    overrides: &InputOverride,
) -> bool {
    if no_tag {
        return false;
    }

    let error = error.unwrap_or_default();
    let options = UserInputOptions {
        label: overrides.label.clone().unwrap_or_else(|| label.to_string()),
        message: overrides.message.clone().unwrap_or_else(|| error.to_string()),
        is_valid: overrides.is_valid.or(Some(error.is_empty())),
    };
    dispatcher.user_input(&options);
    true
}
