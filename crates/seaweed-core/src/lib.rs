//! SeaweedFS Core Library
//!
//! Domain types shared by the client crates: file identifiers, request
//! options and response models, tag validation, connection configuration and
//! the error taxonomy. Nothing in here talks to the network.

pub mod config;
pub mod error;
pub mod fid;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{ClientConfig, FilerConfig};
pub use error::{WeedError, WeedResult};
pub use fid::{parse_volume_id, FileId};
pub use validation::{validate_tag_keys, validate_tags, TAG_PREFIX};
