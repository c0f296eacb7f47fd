mod deferred;
mod dispatcher;
mod load_time;
mod options;
mod snapshot;

pub use deferred::{Deferred, DeferredQueue};
pub use dispatcher::{
    INTERACTION_PROPERTY, MESSAGE_PROPERTY, MORTGAGE_PROPERTY, OverlayKind, TagDispatcher,
    USER_INPUT_PROPERTY, USER_PROPERTY,
};
pub use load_time::{LoadTiming, PageLoadTimes};
pub use options::{
    CloseOptions, Disclosure, InputOverride, JourneyData, SubmitOptions, UserInputOptions,
    ValidationMessage, ViewOptions, flatten_validation_errors,
};
pub use snapshot::{DEFAULT_BACKUP_DEPTH, SnapshotHandle, SnapshotStack};
