//! Replays recorded tagging scenarios against a tag session.
//!
//! A scenario is a JSON document with optional view tag descriptors and an
//! ordered list of steps. Each step is either a tag command or a pause.

pub mod replay;

pub use replay::{ReplayOutcome, ReplayScenario, ReplayStep, build_dispatcher, replay};
