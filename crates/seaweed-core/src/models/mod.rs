//! Request options and response types for the master, volume servers and filer.

pub mod filer;
pub mod master;
pub mod volume;

pub use filer::{
    ChunkFid, DeleteOptions, DirectoryEntry, EntryAttributes, FileChunk, FileEntry, FilerEntry,
    FilerOp, ListOptions, ListResponse, UploadOptions, UploadResult, DEFAULT_LIST_LIMIT,
};
pub use master::{
    AssignOptions, AssignResult, ClusterStatus, GrowOptions, LookupOptions, LookupResult,
    Replication, VolumeLocation,
};
pub use volume::{DeleteResult, DiskStatus, VolumeInfo, VolumeServerStatus, WriteResult};
