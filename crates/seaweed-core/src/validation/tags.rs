//! Filer tag validation
//!
//! The filer stores tags as extended attributes sent in request headers, and
//! only keys under the `Seaweed-` namespace are accepted. Validation runs
//! before a request is built so an invalid set is never partially applied.

use crate::error::{WeedError, WeedResult};

/// Namespace prefix every tag key must carry.
pub const TAG_PREFIX: &str = "Seaweed-";

/// Check whether a single key carries the tag namespace.
pub fn is_valid_tag_key(key: &str) -> bool {
    key.starts_with(TAG_PREFIX)
}

/// Validate every key, reporting all offenders in input order.
pub fn validate_tag_keys<I, K>(keys: I) -> WeedResult<()>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let offending: Vec<String> = keys
        .into_iter()
        .filter(|key| !is_valid_tag_key(key.as_ref()))
        .map(|key| key.as_ref().to_string())
        .collect();

    if offending.is_empty() {
        Ok(())
    } else {
        Err(WeedError::InvalidTag(offending))
    }
}

/// Validate a tag set given as key/value pairs.
pub fn validate_tags<'a, I>(tags: I) -> WeedResult<()>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    validate_tag_keys(tags.into_iter().map(|(key, _)| key))
}
