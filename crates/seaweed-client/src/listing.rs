//! Paged directory listings.
//!
//! The filer returns at most `limit` entries per request. A full page may be
//! followed by more entries, so the next request starts after the last name
//! seen; a short page (including an empty one) is the last.

use futures::stream::{self, BoxStream, StreamExt};
use seaweed_core::models::{FilerEntry, ListOptions, DEFAULT_LIST_LIMIT};
use seaweed_core::{WeedError, WeedResult};

use crate::FilerClient;

/// Pages of one directory listing, in filer order.
pub type EntryPages = BoxStream<'static, WeedResult<Vec<FilerEntry>>>;

/// Position of a directory listing between page requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCursor {
    pub path: String,
    pub last_file_name: Option<String>,
    pub limit: u32,
    pub name_pattern: Option<String>,
    pub name_pattern_exclude: Option<String>,
    exhausted: bool,
}

impl ListingCursor {
    pub fn new(path: impl Into<String>, options: ListOptions) -> WeedResult<Self> {
        let limit = options.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if limit == 0 {
            return Err(WeedError::InvalidInput(
                "listing limit must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            path: path.into(),
            last_file_name: options.last_file_name.filter(|name| !name.is_empty()),
            limit,
            name_pattern: options.name_pattern.filter(|p| !p.is_empty()),
            name_pattern_exclude: options.name_pattern_exclude.filter(|p| !p.is_empty()),
            exhausted: false,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Query parameters for the next page. Unset options are left out.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.limit.to_string())];
        if let Some(name) = &self.last_file_name {
            query.push(("lastFileName", name.clone()));
        }
        if let Some(pattern) = &self.name_pattern {
            query.push(("namePattern", pattern.clone()));
        }
        if let Some(pattern) = &self.name_pattern_exclude {
            query.push(("namePatternExclude", pattern.clone()));
        }
        query
    }

    /// Record a received page. Returns whether another page should be requested.
    pub fn advance(&mut self, entries: &[FilerEntry]) -> WeedResult<bool> {
        let full_page = entries.len() >= self.limit as usize;

        if let Some(last) = entries.last() {
            let name = last.name();
            // A full page that ends where the previous one did would repeat forever.
            if full_page && self.last_file_name.as_deref() == Some(name) {
                self.exhausted = true;
                return Err(WeedError::transfer(format!(
                    "Listing of {} did not advance past '{}'",
                    self.path, name
                )));
            }
            self.last_file_name = Some(name.to_string());
        }

        self.exhausted = !full_page;
        Ok(full_page)
    }
}

/// Lazily request pages until the cursor is exhausted.
pub(crate) fn pages(client: FilerClient, cursor: ListingCursor) -> EntryPages {
    stream::try_unfold(cursor, move |mut cursor| {
        let client = client.clone();
        async move {
            if cursor.is_exhausted() {
                return Ok(None);
            }
            let page = client.list_page(&cursor).await?;
            cursor.advance(&page.entries)?;
            tracing::debug!(
                path = %cursor.path,
                entries = page.entries.len(),
                last_file_name = ?cursor.last_file_name,
                "Listed directory page"
            );
            Ok::<_, WeedError>(Some((page.entries, cursor)))
        }
    })
    .boxed()
}
