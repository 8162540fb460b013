//! Master server operations: file id assignment, volume lookup and cluster
//! administration.

use seaweed_core::models::{
    AssignOptions, AssignResult, ClusterStatus, GrowOptions, LookupOptions, LookupResult,
    VolumeLocation, VolumeServerStatus,
};
use seaweed_core::{WeedError, WeedResult};
use std::time::Instant;
use tracing::{debug, info};

use crate::SeaweedClient;

/// Garbage ratio above which `vacuum` compacts a volume when none is given.
pub const DEFAULT_GARBAGE_THRESHOLD: f64 = 0.3;

impl SeaweedClient {
    /// Reserve a file id (or `count` consecutive ids) and the volume server to
    /// write it to.
    #[tracing::instrument(skip(self))]
    pub async fn assign(&self, options: &AssignOptions) -> WeedResult<AssignResult> {
        let request = self
            .transport
            .client()
            .get(self.master_endpoint("/dir/assign"))
            .query(options);
        let result: AssignResult = self.transport.fetch_json(request).await?;

        debug!(fid = %result.fid, url = %result.url, count = result.count, "Assigned file id");
        Ok(result)
    }

    /// Raw master lookup. Any non-success answer is reported as
    /// [`WeedError::NoVolumeFound`].
    pub async fn lookup(&self, options: &LookupOptions) -> WeedResult<LookupResult> {
        let request = self
            .transport
            .client()
            .get(self.master_endpoint("/dir/lookup"))
            .query(options);
        let response = self.transport.send(request).await?;

        if !response.status().is_success() {
            debug!(
                volume_id = options.volume_id,
                status = %response.status(),
                "Volume lookup failed"
            );
            return Err(WeedError::NoVolumeFound(options.volume_id));
        }

        self.transport.json(response).await
    }

    /// Every server currently hosting `volume_id`, in master order.
    ///
    /// Not cached: each call asks the master again, so a volume that moved
    /// is found at its new location.
    pub async fn resolve(&self, volume_id: u32) -> WeedResult<Vec<VolumeLocation>> {
        let start = Instant::now();
        let result = self.lookup(&LookupOptions::new(volume_id)).await?;

        debug!(
            volume_id = volume_id,
            locations = result.locations.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Resolved volume locations"
        );
        Ok(result.locations)
    }

    /// Compact volumes whose garbage ratio exceeds `threshold`
    /// (default [`DEFAULT_GARBAGE_THRESHOLD`]).
    pub async fn vacuum(&self, threshold: Option<f64>) -> WeedResult<serde_json::Value> {
        let threshold = threshold.unwrap_or(DEFAULT_GARBAGE_THRESHOLD);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(WeedError::InvalidInput(format!(
                "garbage threshold must be between 0 and 1, got {}",
                threshold
            )));
        }

        let request = self
            .transport
            .client()
            .get(self.master_endpoint("/vol/vacuum"))
            .query(&[("garbageThreshold", threshold)]);
        let topology = self.transport.fetch_json(request).await?;

        info!(threshold = threshold, "Volume vacuum completed");
        Ok(topology)
    }

    /// Pre-allocate volumes for a collection or placement.
    pub async fn grow_volumes(&self, options: &GrowOptions) -> WeedResult<serde_json::Value> {
        let request = self
            .transport
            .client()
            .get(self.master_endpoint("/vol/grow"))
            .query(options);
        let result = self.transport.fetch_json(request).await?;

        info!(count = ?options.count, collection = ?options.collection, "Volumes grown");
        Ok(result)
    }

    /// Delete a collection and every volume in it.
    pub async fn delete_collection(&self, collection: &str) -> WeedResult<()> {
        if collection.is_empty() {
            return Err(WeedError::InvalidInput(
                "collection name cannot be empty".to_string(),
            ));
        }

        let request = self
            .transport
            .client()
            .get(self.master_endpoint("/col/delete"))
            .query(&[("collection", collection)]);
        let response = self.transport.send(request).await?;
        self.transport.error_for_status(response).await?;

        info!(collection = %collection, "Collection deleted");
        Ok(())
    }

    pub async fn cluster_status(&self) -> WeedResult<ClusterStatus> {
        let request = self
            .transport
            .client()
            .get(self.master_endpoint("/cluster/status"));
        self.transport.fetch_json(request).await
    }

    /// HTTP status code of the master's health check. A non-success code is
    /// returned as-is, not turned into an error.
    pub async fn cluster_health(&self) -> WeedResult<u16> {
        let request = self
            .transport
            .client()
            .get(self.master_endpoint("/cluster/healthz"));
        let response = self.transport.send(request).await?;
        Ok(response.status().as_u16())
    }

    /// Cluster topology as reported by the master.
    pub async fn volume_statuses(&self) -> WeedResult<serde_json::Value> {
        let request = self.transport.client().get(self.master_endpoint("/dir/status"));
        self.transport.fetch_json(request).await
    }

    /// Disk and volume status of one volume server (`host:port`).
    pub async fn volume_server_status(&self, server: &str) -> WeedResult<VolumeServerStatus> {
        let url = self.transport.server_url(server, "status");
        self.transport
            .fetch_json(self.transport.client().get(url))
            .await
    }
}
