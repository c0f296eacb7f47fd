use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, Result};

/// Action code used when an interaction kind has no dedicated code
pub const ACTION_DEFAULT: &str = "DEFAULT";
/// Action code for user input events
pub const ACTION_INPUT: &str = "INPUT";
/// Action code (and interaction type) for form submissions
pub const ACTION_SUBMIT: &str = "SUBMIT";
/// Event name sent with every validated form submission
pub const FORM_SUBMISSION_EVENT: &str = "form_submission";

pub const MESSAGE_BUSINESS: &str = "BUSINESS";
pub const MESSAGE_USER: &str = "USER";

pub const INTERACTION_HELP: &str = "HELP";
pub const INTERACTION_REVEAL: &str = "REVEAL";
pub const INTERACTION_LINK: &str = "LINK";

/// Static tagging tables supplied at startup.
///
/// Read-only once loaded. Every lookup is tolerant: unknown keys resolve to
/// `None` or to a documented fallback.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaggingValues {
    #[serde(default)]
    pub page: PageValues,
    #[serde(default)]
    pub regions: RegionValues,
    /// container property -> field name -> renamed key
    #[serde(default)]
    pub item_keys: HashMap<String, BTreeMap<String, String>>,
    /// Seed for context and view defaults
    #[serde(default)]
    pub ddl: Map<String, Value>,
    #[serde(default)]
    pub types: TypeValues,
    #[serde(default)]
    pub value_maps: ValueMaps,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PageValues {
    /// Product / application identifiers prepended to every page name
    #[serde(default)]
    pub prefix: Vec<String>,
    /// Name segments of the page loaded with the application shell
    #[serde(default)]
    pub initial: Vec<String>,
    #[serde(default)]
    pub breakpoints: Breakpoints,
}

/// Responsive breakpoints (inclusive maximum widths)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Breakpoints {
    #[serde(default = "default_small")]
    pub small: u32,
    #[serde(default = "default_medium")]
    pub medium: u32,
}

fn default_small() -> u32 {
    480
}

fn default_medium() -> u32 {
    768
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            small: default_small(),
            medium: default_medium(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegionValues {
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub view: Vec<String>,
    #[serde(default)]
    pub action: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TypeValues {
    /// message kind -> category label
    #[serde(default)]
    pub message: BTreeMap<String, String>,
    /// interaction kind -> interaction type label
    #[serde(default)]
    pub interaction: BTreeMap<String, String>,
    /// kind -> action code
    #[serde(default)]
    pub action: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValueMaps {
    /// "true" / "false" / "null" -> validity label
    #[serde(default)]
    pub input_validity: BTreeMap<String, String>,
    /// run mode -> environment label
    #[serde(default)]
    pub environments: BTreeMap<String, String>,
    #[serde(default)]
    pub routes: RouteValues,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteValues {
    #[serde(default)]
    pub default_route: String,
    /// Checked in order against the document referrer
    #[serde(default)]
    pub referrers: Vec<RoutePattern>,
    /// Checked in order against the query string
    #[serde(default)]
    pub url_params: Vec<RoutePattern>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoutePattern {
    pub pattern: String,
    pub route: String,
}

impl TaggingValues {
    /// Parse values from a JSON document and validate them
    pub fn from_json(value: Value) -> Result<Self> {
        let values: Self = serde_json::from_value(value)
            .map_err(|e| DomainError::InvalidConfiguration(e.to_string()))?;
        values.validate()?;
        Ok(values)
    }

    /// Check the cross-table invariants
    pub fn validate(&self) -> Result<()> {
        let regions = [
            ("context", &self.regions.context),
            ("view", &self.regions.view),
            ("action", &self.regions.action),
        ];

        let mut owners: HashMap<&str, &str> = HashMap::new();
        for (region, properties) in regions {
            for property in properties {
                if let Some(previous) = owners.insert(property.as_str(), region) {
                    if previous != region {
                        return Err(DomainError::InvalidConfiguration(format!(
                            "property {property} is classified as both {previous} and {region}"
                        )));
                    }
                }
            }
        }

        if !self.types.action.contains_key(ACTION_DEFAULT) {
            return Err(DomainError::InvalidConfiguration(format!(
                "types.action must define a {ACTION_DEFAULT} action code"
            )));
        }

        Ok(())
    }

    /// Action code for a kind, falling back to the default code
    pub fn action_code(&self, kind: &str) -> &str {
        self.types
            .action
            .get(kind)
            .or_else(|| self.types.action.get(ACTION_DEFAULT))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn message_category(&self, kind: &str) -> Option<&str> {
        self.types.message.get(kind).map(String::as_str)
    }

    pub fn interaction_type(&self, kind: &str) -> Option<&str> {
        self.types.interaction.get(kind).map(String::as_str)
    }

    /// Validity label for an input: `Some(true)`, `Some(false)` or unvalidated
    pub fn input_validity(&self, is_valid: Option<bool>) -> Option<&str> {
        let key = match is_valid {
            Some(true) => "true",
            Some(false) => "false",
            None => "null",
        };
        self.value_maps.input_validity.get(key).map(String::as_str)
    }

    /// Environment label for a run mode, the raw name when unmapped
    pub fn environment_label<'a>(&'a self, run_mode: &'a str) -> &'a str {
        self.value_maps
            .environments
            .get(run_mode)
            .map(String::as_str)
            .unwrap_or(run_mode)
    }
}

#[cfg(test)]
pub(crate) fn sample_values() -> TaggingValues {
    TaggingValues::from_json(serde_json::json!({
        "page": {
            "prefix": ["nbs-aws", "application", "overpayment"],
            "initial": ["landing"]
        },
        "regions": {
            "context": ["nbs_user"],
            "view": ["nbs_page_title"],
            "action": ["nbs_message", "nbs_user_input", "nbs_element_interaction", "nbs_app_mortgage"]
        },
        "item_keys": {
            "nbs_message": { "category": "type", "text": "message", "cause": "" },
            "nbs_element_interaction": { "type": "nbs_interaction_type", "label": "nbs_interaction_label" }
        },
        "ddl": {
            "nbs_user": { "nbs_user_logged_in": "no" },
            "nbs_page_title": "untitled",
            "nbs_message": []
        },
        "types": {
            "message": { "BUSINESS": "business error", "USER": "user error" },
            "interaction": { "HELP": "help icon", "REVEAL": "reveal", "LINK": "link" },
            "action": { "DEFAULT": "interaction", "INPUT": "input", "HELP": "help" }
        },
        "value_maps": {
            "input_validity": { "true": "valid", "false": "invalid", "null": "not validated" },
            "environments": { "local": "dev" }
        }
    }))
    .expect("sample values are valid")
}
