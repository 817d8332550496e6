//! Recording adapter for the `ImageCdn` port.

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::record_result;
use crate::cassette::{CassetteRecorder, Port};
use crate::ports::image_cdn::{AssetInfo, AssetUpload, CdnFuture, ImageCdn, UploadedAsset};

/// Passes calls to a live CDN and records every result.
pub struct RecordingImageCdn {
    inner: Arc<dyn ImageCdn>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageCdn {
    /// Wrap `inner`, writing interactions to `recorder`.
    pub fn new(inner: Arc<dyn ImageCdn>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageCdn for RecordingImageCdn {
    fn resource(&self, public_id: &str) -> CdnFuture<'_, AssetInfo> {
        let public_id = public_id.to_string();
        Box::pin(async move {
            let result = self.inner.resource(&public_id).await;
            let input = json!({ "public_id": public_id });
            record_result(&self.recorder, Port::ImageCdn, "resource", input, &result);
            result
        })
    }

    fn upload(&self, upload: &AssetUpload) -> CdnFuture<'_, UploadedAsset> {
        let upload = upload.clone();
        Box::pin(async move {
            let result = self.inner.upload(&upload).await;
            // The bytes are already on the CDN; the cassette only needs the name.
            let input = json!({ "file_name": upload.file_name, "bytes": upload.data.len() });
            record_result(&self.recorder, Port::ImageCdn, "upload", input, &result);
            result
        })
    }
}
