//! Replaying adapter for the `ImageCdn` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::{CassetteReplayer, Port};
use crate::ports::image_cdn::{AssetInfo, AssetUpload, CdnFuture, ImageCdn, UploadedAsset};

/// Answers CDN calls from a cassette.
pub struct ReplayingImageCdn {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageCdn {
    /// Create a replaying CDN backed by `replayer`.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageCdn for ReplayingImageCdn {
    fn resource(&self, _public_id: &str) -> CdnFuture<'_, AssetInfo> {
        let output = next_output(&self.replayer, Port::ImageCdn, "resource");
        Box::pin(async move { replay_result::<AssetInfo>(output?) })
    }

    fn upload(&self, _upload: &AssetUpload) -> CdnFuture<'_, UploadedAsset> {
        let output = next_output(&self.replayer, Port::ImageCdn, "upload");
        Box::pin(async move { replay_result::<UploadedAsset>(output?) })
    }
}
