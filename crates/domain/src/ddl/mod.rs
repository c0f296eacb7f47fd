mod store;
pub mod tree;

pub use store::{DataLayer, PAGE_PROPERTY, Source};
