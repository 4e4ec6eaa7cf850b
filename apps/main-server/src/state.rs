//! Application state.

use std::sync::Arc;

use auth::{JwtManager, RevocationStore};
use doc_store::DocumentStore;

use crate::config::Config;
use crate::services::blob_store::BlobStore;

/// Shared application state.
pub struct AppState<S: DocumentStore> {
    /// Server configuration.
    pub config: Config,
    /// Document store.
    pub store: S,
    /// JWT manager.
    pub jwt_manager: JwtManager,
    /// Tokens revoked by sign-out.
    pub revocations: Box<dyn RevocationStore>,
    /// Uploaded file storage.
    pub blobs: Arc<dyn BlobStore>,
}

impl<S: DocumentStore> AppState<S> {
    /// Creates new application state.
    pub fn new(
        config: Config,
        store: S,
        jwt_manager: JwtManager,
        revocations: Box<dyn RevocationStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            config,
            store,
            jwt_manager,
            revocations,
            blobs,
        }
    }
}
