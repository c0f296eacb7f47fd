use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::naming::{PageDescriptor, join_name_segments};
use crate::values::TaggingValues;

/// Data region a property belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Session-wide defaults such as user identity
    Context,
    /// Defaults for the next page view, reset on every page
    #[default]
    View,
    /// Data written straight into the live snapshot
    Action,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Context => "context",
            Self::View => "view",
            Self::Action => "action",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cumulative breadcrumb categories of a page name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCategories {
    #[serde(rename = "nbs_sub_category_1")]
    pub level1: String,
    #[serde(rename = "nbs_sub_category_2")]
    pub level2: String,
    #[serde(rename = "nbs_sub_category_3")]
    pub level3: String,
}

/// Classifies properties into regions and derives names from segments.
///
/// Pure and deterministic: built once from the configuration tables.
#[derive(Debug, Clone, Default)]
pub struct PropertyClassifier {
    regions: Vec<(Region, HashSet<String>)>,
    item_keys: HashMap<String, BTreeMap<String, String>>,
    prefix: Vec<String>,
}

impl PropertyClassifier {
    pub fn new(values: &TaggingValues) -> Self {
        let collect = |properties: &[String]| properties.iter().cloned().collect::<HashSet<_>>();

        Self {
            regions: vec![
                (Region::Context, collect(&values.regions.context)),
                (Region::View, collect(&values.regions.view)),
                (Region::Action, collect(&values.regions.action)),
            ],
            item_keys: values.item_keys.clone(),
            prefix: values
                .page
                .prefix
                .iter()
                .filter(|segment| !segment.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Region of a property; unlisted properties are view-scoped
    pub fn region_of(&self, property: &str) -> Region {
        self.regions
            .iter()
            .find(|(_, properties)| properties.contains(property))
            .map(|(region, _)| *region)
            .unwrap_or_default()
    }

    pub fn is_context(&self, property: &str) -> bool {
        self.region_of(property) == Region::Context
    }

    pub fn is_action(&self, property: &str) -> bool {
        self.region_of(property) == Region::Action
    }

    /// Properties explicitly listed for a region
    pub fn properties(&self, region: Region) -> impl Iterator<Item = &str> {
        self.regions
            .iter()
            .filter(move |(r, _)| *r == region)
            .flat_map(|(_, properties)| properties.iter().map(String::as_str))
    }

    /// Renamed key for an item field, or the field itself when unmapped
    pub fn item_key_for<'a>(&'a self, container: &str, field: &'a str) -> &'a str {
        self.item_keys
            .get(container)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
            .filter(|key| !key.is_empty())
            .unwrap_or(field)
    }

    /// Prefix chain followed by the descriptor's segments
    pub fn name_segments(&self, descriptor: &PageDescriptor) -> Vec<Value> {
        self.prefix
            .iter()
            .map(|segment| Value::from(segment.as_str()))
            .chain(descriptor.segments().iter().cloned())
            .collect()
    }

    pub fn page_name(&self, descriptor: &PageDescriptor) -> String {
        join_name_segments(&self.name_segments(descriptor))
    }

    pub fn page_categories(&self, descriptor: &PageDescriptor) -> PageCategories {
        let segments = self.name_segments(descriptor);
        let take = |n: usize| join_name_segments(&segments[..n.min(segments.len())]);

        PageCategories {
            level1: take(2),
            level2: take(3),
            level3: take(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::sample_values;
    use serde_json::json;

    fn classifier() -> PropertyClassifier {
        PropertyClassifier::new(&sample_values())
    }

    #[test]
    fn test_region_of_known_properties() {
        let values = sample_values();
        let classifier = classifier();
        for property in &values.regions.context {
            assert_eq!(classifier.region_of(property), Region::Context);
        }
        for property in &values.regions.view {
            assert_eq!(classifier.region_of(property), Region::View);
        }
        for property in &values.regions.action {
            assert_eq!(classifier.region_of(property), Region::Action);
        }
    }

    #[test]
    fn test_unknown_property_defaults_to_view() {
        let classifier = classifier();
        assert_eq!(classifier.region_of("unknown"), Region::View);
        assert_eq!(Region::default(), Region::View);
        assert!(!classifier.is_context("unknown"));
        assert!(!classifier.is_action("unknown"));
    }

    #[test]
    fn test_is_context_and_is_action() {
        let classifier = classifier();
        assert!(classifier.is_context("nbs_user"));
        assert!(!classifier.is_action("nbs_user"));
        assert!(classifier.is_action("nbs_message"));
        assert!(!classifier.is_context("nbs_message"));
    }

    #[test]
    fn test_item_key_for() {
        let classifier = classifier();
        assert_eq!(classifier.item_key_for("nbs_message", "text"), "message");
        // Empty mapping falls back to the field name
        assert_eq!(classifier.item_key_for("nbs_message", "cause"), "cause");
        assert_eq!(classifier.item_key_for("nbs_message", "other"), "other");
        assert_eq!(classifier.item_key_for("nbs_unknown", "text"), "text");
    }

    #[test]
    fn test_page_name_with_prefix() {
        let classifier = classifier();
        assert_eq!(
            classifier.page_name(&PageDescriptor::from(json!(null))),
            "nbs-aws:application:overpayment"
        );
        assert_eq!(
            classifier.page_name(&PageDescriptor::from(json!([0, 1, "0", "Foo", "bar"]))),
            "nbs-aws:application:overpayment:1:0:foo:bar"
        );
    }

    #[test]
    fn test_page_categories() {
        let classifier = classifier();
        let categories = classifier.page_categories(&PageDescriptor::from(["bar 1", "bar 2"]));
        assert_eq!(categories.level1, "nbs-aws:application");
        assert_eq!(categories.level2, "nbs-aws:application:overpayment");
        assert_eq!(categories.level3, "nbs-aws:application:overpayment:bar 1");

        let serialized = serde_json::to_value(&categories).unwrap();
        assert_eq!(serialized["nbs_sub_category_1"], json!("nbs-aws:application"));
    }

    #[test]
    fn test_page_categories_short_chain() {
        let classifier = PropertyClassifier::default();
        let categories = classifier.page_categories(&PageDescriptor::from("foo"));
        assert_eq!(categories.level1, "foo");
        assert_eq!(categories.level3, "foo");
    }
}
