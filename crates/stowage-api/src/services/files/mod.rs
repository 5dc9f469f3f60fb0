//! File lifecycle: upload, access-controlled retrieval, listing and the
//! publish toggle.
//!
//! [`FileService`] talks to the metadata store, blob store and job queue only
//! through their traits and keeps no state of its own between calls.

mod access;
mod listing;
mod publish;
mod types;
mod upload;

use std::sync::Arc;
use stowage_db::MetadataStore;
use stowage_storage::Storage;
use stowage_worker::JobQueue;

pub use access::NodeContent;
pub use types::CreateFileRequest;

#[derive(Clone)]
pub struct FileService {
    metadata: Arc<dyn MetadataStore>,
    storage: Arc<dyn Storage>,
    queue: Arc<dyn JobQueue>,
}

impl FileService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        storage: Arc<dyn Storage>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            metadata,
            storage,
            queue,
        }
    }
}
