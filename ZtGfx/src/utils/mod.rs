//! Utility functions

pub mod path;

pub use path::{normalize_path, stored_name_to_path};
