//! Validation modules

pub mod tags;

pub use tags::{is_valid_tag_key, validate_tag_keys, validate_tags, TAG_PREFIX};
