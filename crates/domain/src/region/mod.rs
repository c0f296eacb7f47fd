mod classifier;
pub mod naming;

pub use classifier::{PageCategories, PropertyClassifier, Region};
pub use naming::{PageDescriptor, field_key, join_name_segments, normalize_str, normalize_text};
