//! Infrastructure layer - Settings, concrete agents and host environment

pub mod agent;
pub mod clock;
pub mod config;
pub mod environment;

pub use agent::{CompositeAgent, ConsoleAgent, HookAgent, RecordingAgent};
pub use clock::{ManualClock, MonotonicClock, WallClock};
pub use config::{ClockKind, Settings, load_values};
pub use environment::entry_route;
