use serde::{Deserialize, Serialize};

/// Response of a volume server upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    #[serde(default)]
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub e_tag: String,
}

/// Response of a volume server delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskStatus {
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub all: u64,
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub free: u64,
    #[serde(default)]
    pub percent_free: f64,
    #[serde(default)]
    pub percent_used: f64,
}

/// One volume as reported by a volume server's `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VolumeInfo {
    pub id: u32,
    pub size: u64,
    pub collection: String,
    pub disk_type: String,
    pub version: u32,
    pub file_count: u64,
    pub delete_count: u64,
    pub deleted_byte_count: u64,
    pub read_only: bool,
    pub compact_revision: u32,
    pub modified_at_second: i64,
}

/// Response of a volume server's `/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeServerStatus {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub disk_statuses: Vec<DiskStatus>,
    #[serde(default)]
    pub volumes: Vec<VolumeInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_result_parses_volume_response() {
        let body = r#"{"name":"f.txt","size":8,"eTag":"e8a1f9f7"}"#;
        let result: WriteResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.name, "f.txt");
        assert_eq!(result.size, 8);
        assert_eq!(result.e_tag, "e8a1f9f7");
    }

    #[test]
    fn server_status_tolerates_missing_fields() {
        let body = r#"{"Version":"30GB 3.59","Volumes":[{"Id":3,"Size":1024,"Collection":""}]}"#;
        let status: VolumeServerStatus = serde_json::from_str(body).unwrap();
        assert_eq!(status.volumes[0].id, 3);
        assert!(status.disk_statuses.is_empty());
    }
}
