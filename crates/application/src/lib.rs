//! Application layer - Tagging use cases on top of the data layer

pub mod lifecycle;
pub mod session;
pub mod tag;
pub mod view_tags;

pub use lifecycle::{BusinessErrorWatcher, ViewKind, ViewTagController, tag_user_interaction};
pub use session::{SessionHandle, TagCommand, TagSession};
pub use tag::TagDispatcher;
pub use view_tags::{
    Scenario, ScenarioTag, TagOptions, ViewTagHandler, ViewTags, create_view_tags,
};
