use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use domain::agent::{DDL_BACKUP, DDL_RESTORE, WA_ACTION, WA_VIEW, safely};
use domain::ddl::PAGE_PROPERTY;
use domain::region::{field_key, normalize_str};
use domain::values::{
    ACTION_INPUT, ACTION_SUBMIT, FORM_SUBMISSION_EVENT, INTERACTION_HELP, INTERACTION_LINK,
    INTERACTION_REVEAL, MESSAGE_BUSINESS, MESSAGE_USER,
};
use domain::{
    AnalyticsAgent, Clock, DataLayer, DeviceData, DomainError, PageDescriptor, PageEnvironment,
    PropertyClassifier, ServiceData, TaggingValues, Viewport,
};

use super::deferred::{Deferred, DeferredQueue};
use super::load_time::PageLoadTimes;
use super::options::{
    CloseOptions, Disclosure, JourneyData, SubmitOptions, UserInputOptions, ViewOptions,
};
use super::snapshot::{SnapshotHandle, SnapshotStack};

pub const USER_PROPERTY: &str = "nbs_user";
pub const MESSAGE_PROPERTY: &str = "nbs_message";
pub const USER_INPUT_PROPERTY: &str = "nbs_user_input";
pub const INTERACTION_PROPERTY: &str = "nbs_element_interaction";
pub const MORTGAGE_PROPERTY: &str = "nbs_app_mortgage";

/// Transient UI that replaces the page snapshot while it is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Overlay,
    Modal,
    Loader,
    Slider,
}

impl OverlayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overlay => "overlay",
            Self::Modal => "modal",
            Self::Loader => "loader",
            Self::Slider => "slider",
        }
    }
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag Dispatcher - maps semantic UI events to data layer updates and
/// analytics agent notifications.
///
/// Owns the data layer, the snapshot stack for overlays, the page load time
/// table and the queue of deferred continuations. No operation returns an
/// error: failures are logged and the tag degrades to a no-op.
pub struct TagDispatcher {
    values: Arc<TaggingValues>,
    ddl: DataLayer,
    agent: Arc<dyn AnalyticsAgent>,
    clock: Arc<dyn Clock>,
    environment: PageEnvironment,
    load_times: PageLoadTimes,
    snapshots: SnapshotStack,
    deferred: DeferredQueue,
    seen_help_labels: HashSet<String>,
}

impl TagDispatcher {
    /// Create a dispatcher and start timing the initial page
    pub fn new(
        values: Arc<TaggingValues>,
        agent: Arc<dyn AnalyticsAgent>,
        clock: Arc<dyn Clock>,
        environment: PageEnvironment,
    ) -> Self {
        let classifier = Arc::new(PropertyClassifier::new(&values));
        let ddl = DataLayer::new(classifier, &values.ddl);

        let mut dispatcher = Self {
            values,
            ddl,
            agent,
            clock,
            environment,
            load_times: PageLoadTimes::default(),
            snapshots: SnapshotStack::default(),
            deferred: DeferredQueue::default(),
            seen_help_labels: HashSet::new(),
        };

        let initial = PageDescriptor::from(dispatcher.values.page.initial.clone());
        dispatcher.load_start(&initial);
        info!(
            initial_page = %dispatcher.page_name(&initial),
            "🏷️ Tag dispatcher ready"
        );
        dispatcher
    }

    /// Keep up to `depth` overlay snapshots instead of a single slot
    pub fn with_backup_depth(mut self, depth: usize) -> Self {
        self.snapshots = SnapshotStack::new(depth);
        self
    }

    pub fn data_layer(&self) -> &DataLayer {
        &self.ddl
    }

    pub fn data_layer_mut(&mut self) -> &mut DataLayer {
        &mut self.ddl
    }

    /// The live DigitalData snapshot
    pub fn digital_data(&self) -> &Value {
        self.ddl.digital_data()
    }

    pub fn values(&self) -> &TaggingValues {
        &self.values
    }

    pub fn environment(&self) -> &PageEnvironment {
        &self.environment
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.environment.viewport = viewport;
    }

    pub fn load_times(&self) -> &PageLoadTimes {
        &self.load_times
    }

    pub fn snapshots(&self) -> &SnapshotStack {
        &self.snapshots
    }

    /// Fully qualified page name for a descriptor
    pub fn page_name(&self, descriptor: &PageDescriptor) -> String {
        self.ddl.classifier().page_name(descriptor)
    }

    /// Start timing a page load, returning the clock reading
    pub fn load_start(&mut self, descriptor: &PageDescriptor) -> f64 {
        let page_name = self.page_name(descriptor);
        let now = self.clock.now_ms();
        debug!(page_name = %page_name, at = now, "Page load started");
        self.load_times.start(&page_name, now)
    }

    // ---- agent notifications ----

    fn notify_view(&self) -> bool {
        safely(WA_VIEW, || self.agent.view(self.ddl.digital_data()))
    }

    fn notify_action(&self, event: &str) -> bool {
        safely(WA_ACTION, || {
            self.agent.action(event, self.ddl.digital_data())
        })
    }

    // ---- data layer helpers ----

    /// Replace DigitalData with a new page object
    pub fn set_page(&mut self, descriptor: &PageDescriptor) {
        let page_name = self.page_name(descriptor);
        let load_time = self.load_times.end(&page_name, self.clock.now_ms());
        let device = DeviceData::classify(self.environment.viewport, &self.values.page.breakpoints);
        let service = ServiceData::new(&self.values, &self.environment);

        let mut page_info = json!({ "pageName": page_name });
        if let Some(load_time) = load_time {
            page_info["nbs_page_load_time"] = json!(load_time);
        }
        extend_object(&mut page_info, json!(device));

        let mut page = json!({ "pageInfo": page_info, "category": "" });
        extend_object(&mut page, json!(service));

        debug!(page_name = %page_name, load_time = ?load_time, "Setting page");
        self.ddl.create(json!({ PAGE_PROPERTY: page }));
    }

    /// Rename the current page in place, keeping everything else
    pub fn update_page_name(&mut self, descriptor: &PageDescriptor) {
        let page_name = self.page_name(descriptor);
        self.ddl.update(
            PAGE_PROPERTY,
            json!({ "pageInfo": { "pageName": page_name }, "category": "" }),
            true,
        );
        self.ddl.refresh();
    }

    pub fn set_user_application_route(&mut self, route: &str) {
        self.ddl.update(
            USER_PROPERTY,
            json!({ "nbs_user_application_route": normalize_str(route) }),
            true,
        );
    }

    pub fn set_journey_data(&mut self, journey: &JourneyData) {
        self.ddl.update(USER_PROPERTY, journey.user_fields(), true);
        self.ddl
            .update(MORTGAGE_PROPERTY, journey.application_fields(), true);
    }

    /// Prepend a message without deduplication
    pub fn add_message(&mut self, category: &str, text: &str, cause: &str) {
        let item = message_item(category, text, cause);
        self.ddl.add(MESSAGE_PROPERTY, item, true);
    }

    /// Prepend a message, dropping older messages with the same cause
    pub fn replace_message(&mut self, category: &str, text: &str, cause: &str) {
        let item = message_item(category, text, cause);
        self.ddl.replace(MESSAGE_PROPERTY, item, true);
    }

    pub fn add_user_input(
        &mut self,
        name: &str,
        message: &str,
        is_valid: Option<bool>,
        apply_defaults: bool,
    ) {
        let mut item = Map::new();
        item.insert("name".into(), Value::from(normalize_str(name)));
        item.insert("message".into(), Value::from(normalize_str(message)));
        if let Some(status) = self.values.input_validity(is_valid) {
            item.insert("status".into(), Value::from(status));
        }
        self.ddl.add(USER_INPUT_PROPERTY, item, apply_defaults);
    }

    pub fn add_interaction(&mut self, interaction_type: &str, label: &str) {
        let mut item = Map::new();
        item.insert("type".into(), Value::from(normalize_str(interaction_type)));
        item.insert("label".into(), Value::from(normalize_str(label)));
        self.ddl.add(INTERACTION_PROPERTY, item, true);
    }

    /// Record arbitrary field values on the application object.
    ///
    /// Keys are flattened: `mortgageLength.years` becomes
    /// `mortgage_length_years`. Values are kept as given.
    pub fn record_field_values(&mut self, values: &Map<String, Value>) {
        let fields: Map<String, Value> = values
            .iter()
            .map(|(key, value)| (field_key(key), value.clone()))
            .collect();
        debug!(count = fields.len(), "Recording field values");
        self.ddl.update(MORTGAGE_PROPERTY, Value::Object(fields), true);
    }

    // ---- tags ----

    pub fn page_view(&mut self, options: &ViewOptions) {
        self.set_page(&options.name);
        self.notify_view();
    }

    pub fn page_name_update_view(&mut self, descriptor: &PageDescriptor) {
        self.update_page_name(descriptor);
        self.notify_view();
    }

    /// Save DigitalData and tag the overlay as its own page view
    pub fn open(&mut self, kind: OverlayKind, options: &ViewOptions) -> SnapshotHandle {
        safely(DDL_BACKUP, || {
            self.agent.ddl_backup(self.ddl.digital_data())
        });
        let handle = self.snapshots.push(self.ddl.digital_data().clone());

        info!(
            kind = %kind,
            snapshot = handle.id(),
            page_name = %self.page_name(&options.name),
            "📂 Overlay opened"
        );
        self.page_view(options);
        handle
    }

    /// Put the saved DigitalData back and schedule the refresh.
    ///
    /// Loaders never return to the page underneath, so they never re-fire a
    /// view.
    pub fn close(&mut self, kind: OverlayKind, options: &CloseOptions) {
        let notify_view = options.is_returning && kind != OverlayKind::Loader;
        safely(DDL_RESTORE, || self.agent.ddl_restore());

        let snapshot = match options.snapshot {
            Some(handle) => self.snapshots.take(handle),
            None => self.snapshots.pop(),
        };
        match snapshot {
            Some(snapshot) => self.ddl.restore(snapshot),
            None => warn!(kind = %kind, "⚠️ No snapshot to restore, keeping current data"),
        }

        info!(kind = %kind, returning = notify_view, "📁 Overlay closed");
        self.deferred.schedule(Deferred::Refresh { notify_view });
    }

    pub fn overlay_open(&mut self, options: &ViewOptions) -> SnapshotHandle {
        self.open(OverlayKind::Overlay, options)
    }

    pub fn modal_open(&mut self, options: &ViewOptions) -> SnapshotHandle {
        self.open(OverlayKind::Modal, options)
    }

    pub fn loader_open(&mut self, options: &ViewOptions) -> SnapshotHandle {
        self.open(OverlayKind::Loader, options)
    }

    pub fn slider_open(&mut self, options: &ViewOptions) -> SnapshotHandle {
        self.open(OverlayKind::Slider, options)
    }

    pub fn overlay_close(&mut self, options: &CloseOptions) {
        self.close(OverlayKind::Overlay, options)
    }

    pub fn modal_close(&mut self, options: &CloseOptions) {
        self.close(OverlayKind::Modal, options)
    }

    pub fn loader_close(&mut self, options: &CloseOptions) {
        self.close(OverlayKind::Loader, options)
    }

    pub fn slider_close(&mut self, options: &CloseOptions) {
        self.close(OverlayKind::Slider, options)
    }

    /// Tag a message of a configured kind such as `BUSINESS` or `USER`
    pub fn message(&mut self, kind: &str, text: &str, cause: &str) -> bool {
        let Some(category) = self.values.message_category(kind).map(str::to_string) else {
            warn!(error = %DomainError::UnknownTagKind(kind.to_string()), "Message not tagged");
            return false;
        };
        self.add_message(&category, text, cause);
        true
    }

    pub fn business_error_message(&mut self, text: &str, cause: &str) -> bool {
        self.message(MESSAGE_BUSINESS, text, cause)
    }

    pub fn user_input(&mut self, options: &UserInputOptions) {
        self.add_user_input(&options.label, &options.message, options.is_valid, false);
        let code = self.values.action_code(ACTION_INPUT).to_string();
        self.notify_action(&code);
    }

    /// Tag an interaction of a configured kind.
    ///
    /// Returns whether anything was tagged.
    pub fn interaction(&mut self, kind: &str, label: &str) -> bool {
        match kind {
            INTERACTION_HELP => self.help_interaction(label),
            INTERACTION_REVEAL => self.reveal_interaction(label, Disclosure::Revealing),
            _ => self.record_interaction(kind, label),
        }
    }

    /// Only the first help interaction per label is tagged
    pub fn help_interaction(&mut self, label: &str) -> bool {
        if self.seen_help_labels.contains(label) {
            debug!(label = %label, "Help interaction already tagged");
            return false;
        }

        let tagged = self.record_interaction(INTERACTION_HELP, label);
        if tagged {
            self.seen_help_labels.insert(label.to_string());
        }
        tagged
    }

    /// Whether a help interaction with this label was already tagged
    pub fn help_label_seen(&self, label: &str) -> bool {
        self.seen_help_labels.contains(label)
    }

    /// Only revealing is tagged, hiding is ignored
    pub fn reveal_interaction(&mut self, label: &str, disclosure: Disclosure) -> bool {
        match disclosure {
            Disclosure::Revealing => self.record_interaction(INTERACTION_REVEAL, label),
            Disclosure::Hiding => false,
        }
    }

    pub fn link_interaction(&mut self, label: &str) -> bool {
        self.interaction(INTERACTION_LINK, label)
    }

    /// Let every help label be tagged once more
    pub fn forget_help_labels(&mut self) {
        self.seen_help_labels.clear();
    }

    fn record_interaction(&mut self, kind: &str, label: &str) -> bool {
        let Some(interaction_type) = self.values.interaction_type(kind).map(str::to_string) else {
            warn!(error = %DomainError::UnknownTagKind(kind.to_string()), "Interaction not tagged");
            return false;
        };
        self.add_interaction(&interaction_type, label);
        let code = self.values.action_code(kind).to_string();
        self.notify_action(&code);
        true
    }

    /// Tag a form submission and its validation outcome.
    ///
    /// Returns whether the view was re-fired because the form stays on the
    /// same page.
    pub fn submit_with_validation(&mut self, options: &SubmitOptions) -> bool {
        let submit_type = self.values.action_code(ACTION_SUBMIT).to_string();
        self.add_interaction(&submit_type, &options.label);

        if let Some(values) = options.analytics_values.as_ref().filter(|v| !v.is_empty()) {
            self.record_field_values(values);
        }

        let user_category = self
            .values
            .message_category(MESSAGE_USER)
            .unwrap_or(MESSAGE_USER)
            .to_string();
        for message in &options.messages {
            self.replace_message(&user_category, &message.message, &message.cause);
        }

        self.notify_action(FORM_SUBMISSION_EVENT);

        let stays_on_page = match options.valid {
            Some(valid) => !valid,
            None => !options.messages.is_empty(),
        };
        if stays_on_page {
            self.notify_view();
        }
        stays_on_page
    }

    // ---- deferred work ----

    pub fn has_pending(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Run every continuation scheduled so far, in schedule order.
    ///
    /// Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let tasks = self.deferred.take_pending();
        let count = tasks.len();

        for task in tasks {
            match task {
                Deferred::Refresh { notify_view } => {
                    self.ddl.refresh();
                    if notify_view {
                        self.notify_view();
                    }
                }
            }
        }

        if count > 0 {
            debug!(count = count, "Deferred continuations ran");
        }
        count
    }
}

fn message_item(category: &str, text: &str, cause: &str) -> Map<String, Value> {
    let mut item = Map::new();
    item.insert("category".into(), Value::from(normalize_str(category)));
    item.insert("text".into(), Value::from(normalize_str(text)));
    item.insert("cause".into(), Value::from(normalize_str(cause)));
    item
}

fn extend_object(target: &mut Value, fields: Value) {
    if let (Value::Object(target), Value::Object(fields)) = (target, fields) {
        target.extend(fields);
    }
}
