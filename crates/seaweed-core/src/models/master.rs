use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::WeedError;

/// Replica placement code (`xyz`: other data centers, other racks, same rack).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Replication {
    /// No replication
    #[serde(rename = "000")]
    None,
    /// One copy on the same rack
    #[serde(rename = "001")]
    SameRack,
    /// One copy on another rack in the same data center
    #[serde(rename = "010")]
    DifferentRack,
    /// One copy in another data center
    #[serde(rename = "100")]
    DifferentDataCenter,
    /// Two copies in two other data centers
    #[serde(rename = "200")]
    TwoDataCenters,
    /// One copy on another rack and one in another data center
    #[serde(rename = "110")]
    RackAndDataCenter,
}

impl FromStr for Replication {
    type Err = WeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "000" => Ok(Replication::None),
            "001" => Ok(Replication::SameRack),
            "010" => Ok(Replication::DifferentRack),
            "100" => Ok(Replication::DifferentDataCenter),
            "200" => Ok(Replication::TwoDataCenters),
            "110" => Ok(Replication::RackAndDataCenter),
            other => Err(WeedError::InvalidInput(format!(
                "unknown replication '{}', expected one of 000, 001, 010, 100, 200, 110",
                other
            ))),
        }
    }
}

/// Optional parameters for `/dir/assign`. Unset fields use the master's defaults.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignOptions {
    /// Number of file ids to reserve (master default 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_center: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication: Option<Replication>,
    /// Time to live, e.g. "3m", "4h", "5d"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    /// Bytes to preallocate for a newly created volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preallocate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_map_max_size_mb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writable_volume_count: Option<u32>,
    /// Disk type, e.g. "hdd" or "ssd"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<String>,
}

/// Optional parameters for `/vol/grow`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowOptions {
    /// Number of volumes to create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_center: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication: Option<Replication>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preallocate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_map_max_size_mb: Option<u32>,
}

/// Parameters for `/dir/lookup`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOptions {
    pub volume_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Ask the master for a read/write JWT bound to this file id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl LookupOptions {
    pub fn new(volume_id: u32) -> Self {
        Self {
            volume_id,
            ..Self::default()
        }
    }
}

/// Response of `/dir/assign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignResult {
    pub count: u32,
    pub fid: String,
    pub url: String,
    pub public_url: String,
}

/// One server hosting a volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeLocation {
    pub url: String,
    pub public_url: String,
    #[serde(default)]
    pub data_center: String,
}

/// Response of `/dir/lookup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    #[serde(default)]
    pub volume_id: Option<String>,
    #[serde(default)]
    pub locations: Vec<VolumeLocation>,
}

/// Response of `/cluster/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterStatus {
    pub is_leader: bool,
    #[serde(default)]
    pub leader: String,
    #[serde(default)]
    pub peers: Vec<String>,
}
