//! Shared application state.

use crate::config::Config;
use crate::context::ServiceContext;
use crate::processing::Processor;
use crate::selection::Selector;
use crate::storage::UploadStore;

/// Services shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Best-photo selection.
    pub selector: Selector,
    /// Upscale, background removal and CDN uploads.
    pub processor: Processor,
    /// The validated general upload store.
    pub uploads: UploadStore,
    /// The "My Photos" store.
    pub my_photos: UploadStore,
}

impl AppState {
    /// Wire the services to the ports in `ctx`.
    #[must_use]
    pub fn new(ctx: &ServiceContext, config: &Config, model: &str) -> Self {
        Self {
            selector: Selector::new(ctx.vision.clone(), model)
                .with_transport_retries(config.selection.transport_retries),
            processor: Processor::new(ctx.cdn.clone(), config.cloud_name()),
            uploads: UploadStore::uploads(config.uploads_dir()),
            my_photos: UploadStore::my_photos(config.my_photos_dir()),
        }
    }
}
