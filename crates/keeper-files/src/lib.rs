//! # keeper-files
//!
//! File secrets: an object storage collaborator with one bucket per owner,
//! and the [`FileService`] that sits in front of it.

mod fs;
mod memory;
mod service;
mod storage;

pub use fs::FsObjectStorage;
pub use memory::MemoryObjectStorage;
pub use service::{CreateFileDto, DefaultFileService, FileService, FileServiceConfig};
pub use storage::{ObjectEntry, ObjectMeta, ObjectReader, ObjectStorage, StoredObject};
