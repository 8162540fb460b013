//! SeaweedFS HTTP client
//!
//! [`SeaweedClient`] talks to a master and the volume servers it points to:
//! assigning file ids, resolving volume locations and moving object bytes.
//! [`FilerClient`] talks to a filer: path-addressed uploads, metadata, paged
//! directory listings and `Seaweed-` tags.
//!
//! Both clients are cheap `Clone` handles over one `reqwest` connection pool.
//! They keep no state between calls; volume locations are resolved again for
//! every operation that needs one.
//!
//! ```no_run
//! use seaweed_client::{FileLocator, SeaweedClient};
//! use seaweed_core::{models::AssignOptions, ClientConfig};
//!
//! # async fn run() -> seaweed_core::WeedResult<()> {
//! let client = SeaweedClient::new(ClientConfig::default())?;
//! let assigned = client.assign(&AssignOptions::default()).await?;
//! client
//!     .write(&assigned.fid, &assigned.url, "CONTENTS", "hello.txt")
//!     .await?;
//! let bytes = client.get(&FileLocator::new(&assigned.fid)).await?;
//! assert_eq!(&bytes[..], b"CONTENTS");
//! # Ok(())
//! # }
//! ```

mod filer;
mod listing;
mod master;
mod stream;
mod transport;
mod volume;

pub use filer::FilerClient;
pub use listing::{EntryPages, ListingCursor};
pub use master::DEFAULT_GARBAGE_THRESHOLD;
pub use stream::FileStream;
pub use volume::FileLocator;

pub use seaweed_core::{WeedError, WeedResult};

use seaweed_core::ClientConfig;
use tokio_util::sync::CancellationToken;
use transport::Transport;

/// Client for a SeaweedFS master and its volume servers.
#[derive(Clone, Debug)]
pub struct SeaweedClient {
    transport: Transport,
    master_url: String,
}

impl SeaweedClient {
    /// Create a client for the master described by `config`.
    pub fn new(config: ClientConfig) -> WeedResult<Self> {
        config.validate()?;
        let transport = Transport::new(&config)?;
        Ok(Self {
            transport,
            master_url: config.base_url(),
        })
    }

    /// Create a client from SEAWEED_MASTER_* environment variables.
    pub fn from_env() -> WeedResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn master_url(&self) -> &str {
        &self.master_url
    }

    /// A handle whose requests fail with [`WeedError::Cancelled`] once
    /// `token` is cancelled. Shares the connection pool with `self`.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            transport: self.transport.with_cancellation(token),
            master_url: self.master_url.clone(),
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        self.transport.cancellation_token()
    }

    fn master_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.master_url, path)
    }
}
