use serde::{Deserialize, Serialize};

use crate::device::Viewport;
use crate::values::TaggingValues;

/// Read-only facts about the host page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEnvironment {
    pub viewport: Viewport,
    /// Scheme, host and port of the current location
    pub origin: String,
    /// Run mode, mapped to an environment label when tagging
    pub run_mode: String,
}

impl Default for PageEnvironment {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            origin: "http://localhost".to_string(),
            run_mode: "dev".to_string(),
        }
    }
}

/// Technical service fields recorded on every page view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceData {
    pub nbs_environment: String,
    pub nbs_server: String,
}

impl ServiceData {
    pub fn new(values: &TaggingValues, environment: &PageEnvironment) -> Self {
        Self {
            nbs_environment: values.environment_label(&environment.run_mode).to_string(),
            nbs_server: environment.origin.clone(),
        }
    }
}
