use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use domain::PageDescriptor;

use super::snapshot::SnapshotHandle;

/// Options for a page view or an overlay open
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    #[serde(default)]
    pub name: PageDescriptor,
}

impl ViewOptions {
    pub fn named(name: impl Into<PageDescriptor>) -> Self {
        Self { name: name.into() }
    }
}

/// Options for closing an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloseOptions {
    /// Whether the flow returns to the page underneath (re-fires a view)
    pub is_returning: bool,
    /// Snapshot to restore; the most recent one when absent
    pub snapshot: Option<SnapshotHandle>,
}

impl Default for CloseOptions {
    fn default() -> Self {
        Self {
            is_returning: true,
            snapshot: None,
        }
    }
}

impl CloseOptions {
    pub fn not_returning() -> Self {
        Self {
            is_returning: false,
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, handle: SnapshotHandle) -> Self {
        self.snapshot = Some(handle);
        self
    }
}

/// Direction of a reveal interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disclosure {
    Revealing,
    Hiding,
}

impl Disclosure {
    pub fn from_hiding(is_hiding: bool) -> Self {
        if is_hiding { Self::Hiding } else { Self::Revealing }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInputOptions {
    pub label: String,
    pub message: String,
    /// `None` means the input was not validated
    pub is_valid: Option<bool>,
}

/// Caller-supplied overrides for [`crate::lifecycle::tag_user_interaction`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputOverride {
    pub label: Option<String>,
    pub message: Option<String>,
    pub is_valid: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub message: String,
    /// Usually the field path the message belongs to
    pub cause: String,
}

impl ValidationMessage {
    pub fn new(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: cause.into(),
        }
    }
}

/// Form submission outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitOptions {
    pub label: String,
    pub messages: Vec<ValidationMessage>,
    /// Explicit validity; when absent, any message means invalid
    pub valid: Option<bool>,
    /// Field values recorded before anything else
    pub analytics_values: Option<Map<String, Value>>,
}

/// Identifiers of the current customer journey
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JourneyData {
    pub case_id: Option<String>,
    pub customer_number: Option<String>,
    pub application_id: Option<String>,
    pub overpayment_count: Option<u32>,
}

impl JourneyData {
    /// Fields recorded on the user object
    pub fn user_fields(&self) -> Value {
        let mut fields = Map::new();
        insert_some(&mut fields, "nbs_journey_id", &self.case_id);
        insert_some(&mut fields, "nbs_user_customer_number", &self.customer_number);
        Value::Object(fields)
    }

    /// Fields recorded on the application object
    pub fn application_fields(&self) -> Value {
        let mut fields = Map::new();
        insert_some(&mut fields, "application_id", &self.application_id);
        if let Some(count) = self.overpayment_count {
            fields.insert(
                "existing_mortgage_valid_overpayment_count".to_string(),
                Value::from(count),
            );
        }
        Value::Object(fields)
    }
}

fn insert_some(fields: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), Value::from(value.as_str()));
    }
}

/// Flatten a nested form error tree into messages keyed by field path.
///
/// Object keys and array indices are joined with `.`; leaves keep document
/// order.
pub fn flatten_validation_errors(errors: &Value) -> Vec<ValidationMessage> {
    let mut messages = Vec::new();
    collect_errors(errors, None, &mut messages);
    messages
}

fn collect_errors(node: &Value, path: Option<&str>, out: &mut Vec<ValidationMessage>) {
    let child_path = |key: &str| match path {
        Some(path) => format!("{path}.{key}"),
        None => key.to_string(),
    };

    match node {
        Value::Object(fields) => {
            for (key, value) in fields {
                collect_errors(value, Some(&child_path(key)), out);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                collect_errors(value, Some(&child_path(&index.to_string())), out);
            }
        }
        leaf => {
            if let Some(path) = path {
                let message = match leaf {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                out.push(ValidationMessage::new(message, path));
            }
        }
    }
}
