//! Domain layer - Pure data layer logic with no external dependencies
//!
//! This crate contains:
//! - Property classification (regions, item keys, page naming)
//! - The Data Layer Store and its deep-merge primitives
//! - Device classification
//! - Configuration value tables
//! - Ports for the analytics agent and the time source
//!
//! Principles:
//! - No I/O, no global state
//! - Tolerant reads: missing data resolves to nothing, never to an error
//! - Testable in isolation

pub mod agent;
pub mod clock;
pub mod ddl;
pub mod device;
pub mod environment;
pub mod error;
pub mod region;
pub mod values;

// Re-export commonly used types
pub use agent::{AgentCall, AgentError, AnalyticsAgent};
pub use clock::Clock;
pub use ddl::{DataLayer, Source};
pub use device::{DeviceData, Orientation, SizeState, Viewport};
pub use environment::{PageEnvironment, ServiceData};
pub use error::DomainError;
pub use region::{PageCategories, PageDescriptor, PropertyClassifier, Region};
pub use values::TaggingValues;
