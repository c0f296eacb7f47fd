//! View-Tag Factory - named tag handlers built from scenario descriptors

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use domain::{DomainError, PageDescriptor};

use crate::tag::{CloseOptions, OverlayKind, TagDispatcher, ViewOptions};

/// Options passed to a scenario tag
pub type TagOptions = Map<String, Value>;

/// A caller-supplied tag body
pub type TagFn = Arc<dyn Fn(&mut TagDispatcher, &TagOptions) + Send + Sync>;

/// The tag a scenario runs
#[derive(Clone)]
pub enum ScenarioTag {
    PageView,
    PageNameUpdate,
    Open(OverlayKind),
    Close(OverlayKind),
    Custom(TagFn),
}

impl ScenarioTag {
    pub fn custom<F>(tag: F) -> Self
    where
        F: Fn(&mut TagDispatcher, &TagOptions) + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(tag))
    }

    /// Look up a built-in tag by its call-site name, e.g. `modalOpen`
    pub fn from_name(name: &str) -> domain::error::Result<Self> {
        let tag = match name {
            "pageView" => Self::PageView,
            "pageNameUpdateView" => Self::PageNameUpdate,
            "overlayOpen" => Self::Open(OverlayKind::Overlay),
            "modalOpen" => Self::Open(OverlayKind::Modal),
            "loaderOpen" => Self::Open(OverlayKind::Loader),
            "sliderOpen" => Self::Open(OverlayKind::Slider),
            "overlayClose" => Self::Close(OverlayKind::Overlay),
            "modalClose" => Self::Close(OverlayKind::Modal),
            "loaderClose" => Self::Close(OverlayKind::Loader),
            "sliderClose" => Self::Close(OverlayKind::Slider),
            other => return Err(DomainError::UnknownTagKind(other.to_string())),
        };
        Ok(tag)
    }

    pub fn invoke(&self, dispatcher: &mut TagDispatcher, options: &TagOptions) {
        match self {
            Self::PageView => dispatcher.page_view(&parse_options::<ViewOptions>(options)),
            Self::PageNameUpdate => {
                let view = parse_options::<ViewOptions>(options);
                dispatcher.page_name_update_view(&view.name);
            }
            Self::Open(kind) => {
                dispatcher.open(*kind, &parse_options::<ViewOptions>(options));
            }
            Self::Close(kind) => dispatcher.close(*kind, &parse_options::<CloseOptions>(options)),
            Self::Custom(tag) => tag(dispatcher, options),
        }
    }
}

impl fmt::Debug for ScenarioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageView => f.write_str("PageView"),
            Self::PageNameUpdate => f.write_str("PageNameUpdate"),
            Self::Open(kind) => write!(f, "Open({kind})"),
            Self::Close(kind) => write!(f, "Close({kind})"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

// Malformed options degrade to defaults; tagging never fails the caller.
fn parse_options<T: DeserializeOwned + Default>(options: &TagOptions) -> T {
    serde_json::from_value(Value::Object(options.clone())).unwrap_or_else(|e| {
        warn!(
            error = %DomainError::InvalidTagOptions(e.to_string()),
            "Using default tag options"
        );
        T::default()
    })
}

/// A tag plus the options fixed when the scenario was declared
#[derive(Debug, Clone)]
pub struct Scenario {
    pub tag: ScenarioTag,
    pub options: TagOptions,
}

impl Scenario {
    pub fn new(tag: ScenarioTag) -> Self {
        Self {
            tag,
            options: TagOptions::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn named(self, name: impl Into<PageDescriptor>) -> Self {
        let descriptor: PageDescriptor = name.into();
        self.with_option("name", Value::from(descriptor))
    }

    /// Parse `{"type": "<tagName>", ...fixed options}`
    pub fn from_descriptor(descriptor: &Value) -> domain::error::Result<Self> {
        let Value::Object(fields) = descriptor else {
            return Err(DomainError::InvalidTagOptions(
                "scenario must be an object".to_string(),
            ));
        };

        let mut options = fields.clone();
        let tag_name = match options.remove("type") {
            Some(Value::String(name)) => name,
            _ => {
                return Err(DomainError::InvalidTagOptions(
                    "scenario needs a string type".to_string(),
                ));
            }
        };

        Ok(Self {
            tag: ScenarioTag::from_name(&tag_name)?,
            options,
        })
    }
}

/// A named handler produced from a [`Scenario`]
#[derive(Debug, Clone)]
pub struct ViewTagHandler {
    tag: ScenarioTag,
    options: TagOptions,
}

impl ViewTagHandler {
    /// Options fixed at declaration, readable before the handler runs
    pub fn options(&self) -> &TagOptions {
        &self.options
    }

    /// The fixed `name` option as a page descriptor
    pub fn name(&self) -> PageDescriptor {
        self.options
            .get("name")
            .cloned()
            .map(PageDescriptor::from)
            .unwrap_or_default()
    }

    /// Run the tag; call-time options win over the fixed ones
    pub fn call(&self, dispatcher: &mut TagDispatcher, call_options: TagOptions) {
        let mut merged = call_options;
        for (key, value) in &self.options {
            if !merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
        self.tag.invoke(dispatcher, &merged);
    }

    pub fn call_default(&self, dispatcher: &mut TagDispatcher) {
        self.call(dispatcher, TagOptions::new());
    }
}

/// Handlers by scenario name
#[derive(Debug, Clone, Default)]
pub struct ViewTags {
    handlers: BTreeMap<String, ViewTagHandler>,
}

impl ViewTags {
    pub fn get(&self, name: &str) -> Option<&ViewTagHandler> {
        self.handlers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run a handler by name; unknown names are logged and skipped
    pub fn call(&self, name: &str, dispatcher: &mut TagDispatcher, options: TagOptions) -> bool {
        match self.handlers.get(name) {
            Some(handler) => {
                handler.call(dispatcher, options);
                true
            }
            None => {
                warn!(scenario = %name, "⚠️ No view tag with this name");
                false
            }
        }
    }

    /// Build handlers from a JSON object of scenario descriptors
    pub fn from_descriptors(descriptors: &Value) -> domain::error::Result<Self> {
        let Value::Object(entries) = descriptors else {
            return Err(DomainError::InvalidTagOptions(
                "view tags must be an object".to_string(),
            ));
        };

        let scenarios = entries
            .iter()
            .map(|(name, descriptor)| Ok((name.clone(), Scenario::from_descriptor(descriptor)?)))
            .collect::<domain::error::Result<Vec<_>>>()?;
        Ok(create_view_tags(scenarios))
    }
}

/// Build a named handler for every scenario
pub fn create_view_tags<I, K>(scenarios: I) -> ViewTags
where
    I: IntoIterator<Item = (K, Scenario)>,
    K: Into<String>,
{
    let handlers = scenarios
        .into_iter()
        .map(|(name, scenario)| {
            let handler = ViewTagHandler {
                tag: scenario.tag,
                options: scenario.options,
            };
            (name.into(), handler)
        })
        .collect();

    ViewTags { handlers }
}
