//! Filer request options and response shapes.
//!
//! The filer answers metadata and listing requests with one JSON object shape
//! for both files and directories; files are the entries that carry a
//! `chunks` list. [`FilerEntry`] makes that distinction once, while the
//! response is deserialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::master::Replication;

/// Default page size for directory listings.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Optional parameters for a directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Entries per page (default [`DEFAULT_LIST_LIMIT`], must be > 0)
    pub limit: Option<u32>,
    /// Start listing after this file name
    pub last_file_name: Option<String>,
    /// Include only names matching this `*`/`?` pattern (case sensitive)
    pub name_pattern: Option<String>,
    /// Exclude names matching this `*`/`?` pattern (case sensitive)
    pub name_pattern_exclude: Option<String>,
}

/// Filer write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilerOp {
    /// Append the body to the end of the existing file
    Append,
}

/// Optional parameters for filer uploads (POST/PUT).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_center: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication: Option<Replication>,
    /// fsync the file content (metadata is written separately)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fsync: Option<bool>,
    /// Store the content inside the metadata entry (default false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_inside: Option<bool>,
    /// Time to live, e.g. "3m", "4h", "5d", "6w", "7M", "8y"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    /// Maximum chunk size in MB
    #[serde(rename = "maxMB", skip_serializing_if = "Option::is_none")]
    pub max_mb: Option<u32>,
    /// File mode, default "0660"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<FilerOp>,
    /// Skip the parent directory existence check (one less metadata call)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_check_parent_dir: Option<bool>,
}

/// Optional parameters for filer deletes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOptions {
    /// Default comes from `recursive_delete` in the filer's filer.toml
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_recursive_error: Option<bool>,
    /// Keep the file chunks on the volume servers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_chunk_deletion: Option<bool>,
}

/// Response of a filer upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub name: String,
    pub size: u64,
}

/// Attributes shared by files and directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntryAttributes {
    pub full_path: String,
    pub mtime: Option<DateTime<Utc>>,
    pub crtime: Option<DateTime<Utc>>,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub mime: Option<String>,
    pub ttl_sec: i32,
    pub user_name: Option<String>,
    pub group_names: Option<Vec<String>>,
    pub symlink_target: Option<String>,
    pub md5: Option<String>,
    pub file_size: u64,
    /// Extended attributes, including `Seaweed-` tags (values base64 encoded)
    pub extended: Option<BTreeMap<String, String>>,
}

/// Chunk location of a file's content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChunk {
    pub file_id: String,
    pub offset: i64,
    pub size: u64,
    pub modified_ts_ns: i64,
    pub e_tag: String,
    pub fid: Option<ChunkFid>,
    pub is_compressed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkFid {
    pub volume_id: u32,
    pub file_key: u64,
    pub cookie: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileEntry {
    #[serde(flatten)]
    pub attributes: EntryAttributes,
    pub replication: Option<String>,
    pub collection: Option<String>,
    #[serde(rename = "chunks")]
    pub chunks: Vec<FileChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectoryEntry {
    #[serde(flatten)]
    pub attributes: EntryAttributes,
    pub rdev: u32,
    pub inode: u64,
    pub hard_link_id: Option<String>,
    pub hard_link_counter: i32,
    pub content: Option<String>,
    pub remote: Option<serde_json::Value>,
    pub quota: i64,
}

/// A filer entry, either a file or a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilerEntry {
    File(FileEntry),
    Directory(DirectoryEntry),
}

impl FilerEntry {
    pub fn attributes(&self) -> &EntryAttributes {
        match self {
            FilerEntry::File(file) => &file.attributes,
            FilerEntry::Directory(dir) => &dir.attributes,
        }
    }

    pub fn full_path(&self) -> &str {
        &self.attributes().full_path
    }

    /// Last path component (the name the listing cursor pages by).
    pub fn name(&self) -> &str {
        let path = self.full_path().trim_end_matches('/');
        path.rsplit('/').next().unwrap_or(path)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FilerEntry::Directory(_))
    }
}

/// Wire shape of an entry before the file/directory split.
#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawEntry {
    full_path: String,
    mtime: Option<DateTime<Utc>>,
    crtime: Option<DateTime<Utc>>,
    mode: u32,
    uid: u32,
    gid: u32,
    mime: Option<String>,
    ttl_sec: i32,
    user_name: Option<String>,
    group_names: Option<Vec<String>>,
    symlink_target: Option<String>,
    md5: Option<String>,
    file_size: u64,
    extended: Option<BTreeMap<String, String>>,
    replication: Option<String>,
    collection: Option<String>,
    #[serde(rename = "chunks")]
    chunks: Option<Vec<FileChunk>>,
    rdev: u32,
    inode: u64,
    hard_link_id: Option<String>,
    hard_link_counter: i32,
    content: Option<String>,
    remote: Option<serde_json::Value>,
    quota: i64,
}

impl From<RawEntry> for FilerEntry {
    fn from(raw: RawEntry) -> Self {
        let attributes = EntryAttributes {
            full_path: raw.full_path,
            mtime: raw.mtime,
            crtime: raw.crtime,
            mode: raw.mode,
            uid: raw.uid,
            gid: raw.gid,
            mime: raw.mime.filter(|m| !m.is_empty()),
            ttl_sec: raw.ttl_sec,
            user_name: raw.user_name,
            group_names: raw.group_names,
            symlink_target: raw.symlink_target.filter(|s| !s.is_empty()),
            md5: raw.md5,
            file_size: raw.file_size,
            extended: raw.extended,
        };

        match raw.chunks {
            Some(chunks) => FilerEntry::File(FileEntry {
                attributes,
                replication: raw.replication,
                collection: raw.collection,
                chunks,
            }),
            None => FilerEntry::Directory(DirectoryEntry {
                attributes,
                rdev: raw.rdev,
                inode: raw.inode,
                hard_link_id: raw.hard_link_id,
                hard_link_counter: raw.hard_link_counter,
                content: raw.content,
                remote: raw.remote,
                quota: raw.quota,
            }),
        }
    }
}

impl<'de> Deserialize<'de> for FilerEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawEntry::deserialize(deserializer).map(FilerEntry::from)
    }
}

/// Response of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListResponse {
    #[serde(default)]
    pub path: String,
    /// `null` from the filer for an empty page
    #[serde(default, deserialize_with = "null_as_empty")]
    pub entries: Vec<FilerEntry>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub last_file_name: String,
    #[serde(default)]
    pub should_display_load_more: bool,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
