//! Shared request state.

use std::sync::Arc;

use keeper_files::FileService;
use keeper_store::Store;

/// State shared by every handler.
pub struct AppState {
    /// Secret, user and session repositories.
    pub store: Store,

    /// File secrets.
    pub files: Arc<dyn FileService>,
}

impl AppState {
    pub fn new(store: Store, files: Arc<dyn FileService>) -> Self {
        Self { store, files }
    }
}
