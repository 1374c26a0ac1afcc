use std::sync::Arc;

use crate::db::LinkStore;
use crate::extractor::MetadataExtractor;

/// Shared application state passed to all handlers. The store and extractor
/// are built once at startup and owned here rather than living in globals.
#[derive(Clone)]
pub struct AppState {
    pub store: LinkStore,
    pub extractor: Arc<MetadataExtractor>,
}

impl AppState {
    pub fn new(store: LinkStore, extractor: MetadataExtractor) -> Self {
        AppState {
            store,
            extractor: Arc::new(extractor),
        }
    }
}
