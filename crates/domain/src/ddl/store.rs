use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::tree::{dedup_by_key, deep_defaults, get_path, pick, set_path};
use crate::region::{PropertyClassifier, Region};

/// Property routed to the live snapshot regardless of classification
pub const PAGE_PROPERTY: &str = "page";

/// Field used to deduplicate replaced items
const CAUSE_FIELD: &str = "cause";

/// Which of the three trees a property is read from and written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Session-wide context defaults
    Context,
    /// The live DigitalData snapshot
    Digital,
    /// Defaults for the next page view
    View,
}

/// The digital data layer.
///
/// Owns the live DigitalData snapshot together with the context and view
/// default trees. Every read and write is routed by [`DataLayer::source_for`].
#[derive(Debug, Clone)]
pub struct DataLayer {
    classifier: Arc<PropertyClassifier>,
    digital: Value,
    context: Value,
    view: Value,
    initial_view: Value,
}

impl DataLayer {
    /// Seed context and view defaults from the configured default tree
    pub fn new(classifier: Arc<PropertyClassifier>, seed: &Map<String, Value>) -> Self {
        let context = pick(seed, classifier.properties(Region::Context));
        let initial_view = pick(
            seed,
            classifier
                .properties(Region::View)
                .chain(classifier.properties(Region::Action)),
        );

        Self {
            classifier,
            digital: Value::Object(Map::new()),
            context,
            view: initial_view.clone(),
            initial_view,
        }
    }

    pub fn classifier(&self) -> &PropertyClassifier {
        &self.classifier
    }

    /// Route a property (or dot path) by its root segment
    pub fn source_for(&self, property: &str) -> Source {
        let root = root_property(property);
        if self.classifier.is_context(root) {
            Source::Context
        } else if self.classifier.is_action(root) || root == PAGE_PROPERTY {
            Source::Digital
        } else {
            Source::View
        }
    }

    fn source(&self, source: Source) -> &Value {
        match source {
            Source::Context => &self.context,
            Source::Digital => &self.digital,
            Source::View => &self.view,
        }
    }

    fn source_mut(&mut self, source: Source) -> &mut Value {
        match source {
            Source::Context => &mut self.context,
            Source::Digital => &mut self.digital,
            Source::View => &mut self.view,
        }
    }

    /// Read a dot path from the tree the property routes to
    pub fn get(&self, property: &str) -> Option<&Value> {
        get_path(self.source(self.source_for(property)), property)
    }

    /// The live DigitalData snapshot
    pub fn digital_data(&self) -> &Value {
        &self.digital
    }

    pub fn context_data(&self) -> &Value {
        &self.context
    }

    pub fn view_data(&self) -> &Value {
        &self.view
    }

    /// Replace DigitalData for a new page.
    ///
    /// Provided values win, then context defaults, then the accumulated view
    /// defaults. View defaults are reset afterwards.
    pub fn create(&mut self, data: Value) {
        let mut data = match data {
            Value::Object(_) => data,
            _ => Value::Object(Map::new()),
        };
        deep_defaults(&mut data, &self.context);
        deep_defaults(&mut data, &self.view);

        self.digital = data;
        self.view = self.initial_view.clone();
        debug!("Data layer created");
    }

    /// Re-apply context values without discarding view or action fields
    pub fn refresh(&mut self) {
        let mut fresh = self.context.clone();
        deep_defaults(&mut fresh, &self.digital);
        self.digital = fresh;
        trace!("Data layer refreshed");
    }

    /// Replace DigitalData wholesale with a saved snapshot
    pub fn restore(&mut self, snapshot: Value) {
        self.digital = snapshot;
    }

    /// Write a value at a dot path.
    ///
    /// With `apply_defaults` the new value's fields win and anything already
    /// at the path fills the gaps; without it the value replaces the path.
    pub fn update(&mut self, property: &str, value: Value, apply_defaults: bool) {
        let mut value = value;
        if apply_defaults {
            if let Some(existing) = self.get(property) {
                deep_defaults(&mut value, existing);
            }
        }

        let source = self.source_for(property);
        trace!(property = %property, source = ?source, "Data layer update");
        set_path(self.source_mut(source), property, value);
    }

    /// Prepend an item to the list at `item_property`
    pub fn add(&mut self, item_property: &str, item: Map<String, Value>, apply_defaults: bool) {
        let items = self.prepend_item(item_property, item);
        self.update(item_property, Value::Array(items), apply_defaults);
    }

    /// Prepend an item, then keep only the newest item per cause
    pub fn replace(&mut self, item_property: &str, item: Map<String, Value>, apply_defaults: bool) {
        let items = self.prepend_item(item_property, item);
        let cause_key = self.classifier.item_key_for(item_property, CAUSE_FIELD);
        let items = dedup_by_key(items, cause_key);
        self.update(item_property, Value::Array(items), apply_defaults);
    }

    fn prepend_item(&self, item_property: &str, item: Map<String, Value>) -> Vec<Value> {
        let renamed: Map<String, Value> = item
            .into_iter()
            .map(|(field, value)| {
                let key = self.classifier.item_key_for(item_property, &field).to_string();
                (key, value)
            })
            .collect();

        let mut items = match self.get(item_property) {
            Some(Value::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        items.insert(0, Value::Object(renamed));
        items
    }
}

fn root_property(property: &str) -> &str {
    property.split('.').next().unwrap_or(property)
}
