//! Post-processing of hosted images: AI upscaling and background removal.
//!
//! Derived images are addressed by Cloudinary delivery URLs built locally; only
//! reading asset dimensions and uploading touch the network.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::info;

use crate::error::PhotoError;
use crate::ports::{AssetUpload, ImageCdn, UploadedAsset};

const DELIVERY_BASE: &str = "https://res.cloudinary.com";

/// Supported upscale factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpscaleFactor {
    /// Double each dimension.
    Two,
    /// Quadruple each dimension.
    Four,
}

impl UpscaleFactor {
    /// The multiplier applied to each dimension.
    #[must_use]
    pub fn multiplier(self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

impl TryFrom<u64> for UpscaleFactor {
    type Error = PhotoError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            _ => Err(PhotoError::InvalidArgument(
                "Invalid upscale factor. Must be 2 or 4.".to_string(),
            )),
        }
    }
}

impl fmt::Display for UpscaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.multiplier())
    }
}

/// A delivery-time transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transformation {
    /// Crop mode (`c_`).
    pub crop: Option<&'static str>,
    /// Effect (`e_`).
    pub effect: Option<&'static str>,
    /// Target width (`w_`).
    pub width: Option<u32>,
    /// Target height (`h_`).
    pub height: Option<u32>,
    /// Quality (`q_`).
    pub quality: Option<&'static str>,
    /// Output format, appended as the file extension.
    pub format: Option<&'static str>,
}

impl Transformation {
    /// AI upscale to exactly `width` x `height`.
    #[must_use]
    pub fn upscale(width: u32, height: u32) -> Self {
        Self {
            crop: Some("scale"),
            effect: Some("upscale"),
            width: Some(width),
            height: Some(height),
            quality: Some("auto"),
            format: None,
        }
    }

    /// AI background removal, delivered as PNG for transparency.
    #[must_use]
    pub fn background_removal() -> Self {
        Self {
            effect: Some("background_removal"),
            quality: Some("auto"),
            format: Some("png"),
            ..Self::default()
        }
    }

    /// The comma-separated parameter list, keys in alphabetical order.
    #[must_use]
    pub fn segment(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(c) = self.crop {
            params.push(("c", c.to_string()));
        }
        if let Some(e) = self.effect {
            params.push(("e", e.to_string()));
        }
        if let Some(h) = self.height {
            params.push(("h", h.to_string()));
        }
        if let Some(q) = self.quality {
            params.push(("q", q.to_string()));
        }
        if let Some(w) = self.width {
            params.push(("w", w.to_string()));
        }
        params.sort_by_key(|(k, _)| *k);
        params.iter().map(|(k, v)| format!("{k}_{v}")).collect::<Vec<_>>().join(",")
    }
}

/// Build a delivery URL for `public_id` with a transformation applied.
#[must_use]
pub fn delivery_url(cloud_name: &str, public_id: &str, transformation: &Transformation) -> String {
    let mut url = format!("{DELIVERY_BASE}/{cloud_name}/image/upload");
    let segment = transformation.segment();
    if !segment.is_empty() {
        url.push('/');
        url.push_str(&segment);
    }
    url.push('/');
    url.push_str(&escape_public_id(public_id));
    if let Some(format) = transformation.format {
        url.push('.');
        url.push_str(format);
    }
    url
}

/// Percent-encode everything but unreserved characters and folder separators.
pub(crate) fn escape_public_id(public_id: &str) -> String {
    let mut out = String::with_capacity(public_id.len());
    for byte in public_id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~' | b'/') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Runs post-processing against the image CDN.
#[derive(Clone)]
pub struct Processor {
    cdn: Arc<dyn ImageCdn>,
    cloud_name: Option<String>,
}

impl Processor {
    /// Create a processor for the given CDN account.
    pub fn new(cdn: Arc<dyn ImageCdn>, cloud_name: Option<String>) -> Self {
        Self { cdn, cloud_name }
    }

    fn cloud_name(&self) -> Result<&str, PhotoError> {
        self.cloud_name.as_deref().filter(|c| !c.is_empty()).ok_or(PhotoError::MissingCloudName)
    }

    /// Build the URL of an AI-upscaled copy of `public_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the public ID is empty, the cloud name is not
    /// configured, the asset lookup fails, or the asset has no dimensions.
    pub async fn upscale(
        &self,
        public_id: &str,
        factor: UpscaleFactor,
    ) -> Result<String, PhotoError> {
        require_public_id(public_id)?;
        let cloud_name = self.cloud_name()?;

        let asset = self.cdn.resource(public_id).await?;
        let (Some(width), Some(height)) = (asset.width, asset.height) else {
            return Err(PhotoError::MissingDimensions);
        };
        if width == 0 || height == 0 {
            return Err(PhotoError::MissingDimensions);
        }

        let target = Transformation::upscale(
            width.saturating_mul(factor.multiplier()),
            height.saturating_mul(factor.multiplier()),
        );
        let url = delivery_url(cloud_name, public_id, &target);
        info!(public_id, %factor, width, height, "upscaled url generated");
        Ok(url)
    }

    /// Build the URL of a background-removed copy of `public_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the public ID is empty or the cloud name is not configured.
    pub fn remove_background(&self, public_id: &str) -> Result<String, PhotoError> {
        require_public_id(public_id)?;
        let transformation = Transformation::background_removal();
        let url = delivery_url(self.cloud_name()?, public_id, &transformation);
        info!(public_id, "background-removed url generated");
        Ok(url)
    }

    /// Upload a file to the CDN so it can be processed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is empty or the upload fails.
    pub async fn upload(&self, upload: &AssetUpload) -> Result<UploadedAsset, PhotoError> {
        if upload.data.is_empty() {
            return Err(PhotoError::InvalidUpload(format!("{} is empty", upload.file_name)));
        }
        let asset = self.cdn.upload(upload).await?;
        info!(file = %upload.file_name, public_id = %asset.public_id, "uploaded to cdn");
        Ok(asset)
    }
}

fn require_public_id(public_id: &str) -> Result<(), PhotoError> {
    if public_id.trim().is_empty() {
        Err(PhotoError::InvalidArgument("public_id is required".to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ports::image_cdn::CdnFuture;
    use crate::ports::AssetInfo;

    struct FixedCdn {
        width: Option<u32>,
        height: Option<u32>,
        calls: AtomicUsize,
    }

    impl FixedCdn {
        fn new(width: Option<u32>, height: Option<u32>) -> Arc<Self> {
            Arc::new(Self { width, height, calls: AtomicUsize::new(0) })
        }
    }

    impl ImageCdn for FixedCdn {
        fn resource(&self, public_id: &str) -> CdnFuture<'_, AssetInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let info = AssetInfo {
                public_id: public_id.to_string(),
                width: self.width,
                height: self.height,
                secure_url: None,
            };
            Box::pin(async move { Ok(info) })
        }

        fn upload(&self, upload: &AssetUpload) -> CdnFuture<'_, UploadedAsset> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let asset = UploadedAsset {
                public_id: format!("bestphoto/{}", upload.file_name),
                secure_url: "https://example.test/a.jpg".into(),
            };
            Box::pin(async move { Ok(asset) })
        }
    }

    #[test]
    fn factor_must_be_two_or_four() {
        assert_eq!(UpscaleFactor::try_from(2).unwrap(), UpscaleFactor::Two);
        assert_eq!(UpscaleFactor::try_from(4).unwrap(), UpscaleFactor::Four);
        for bad in [0, 1, 3, 8] {
            assert!(UpscaleFactor::try_from(bad).is_err(), "factor {bad}");
        }
    }

    #[test]
    fn upscale_segment_is_sorted() {
        assert_eq!(
            Transformation::upscale(1200, 800).segment(),
            "c_scale,e_upscale,h_800,q_auto,w_1200"
        );
    }

    #[test]
    fn background_removal_url() {
        let url = delivery_url("demo", "bestphoto/cat", &Transformation::background_removal());
        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/e_background_removal,q_auto/bestphoto/cat.png"
        );
    }

    #[test]
    fn public_id_is_escaped() {
        let url = delivery_url("demo", "my photo#1", &Transformation::default());
        assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/my%20photo%231");
    }

    #[tokio::test]
    async fn upscale_multiplies_dimensions() {
        let processor = Processor::new(FixedCdn::new(Some(600), Some(400)), Some("demo".into()));
        let url = processor.upscale("bestphoto/dog", UpscaleFactor::Four).await.unwrap();
        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/c_scale,e_upscale,h_1600,q_auto,w_2400/bestphoto/dog"
        );
    }

    #[tokio::test]
    async fn upscale_without_dimensions_fails() {
        let processor = Processor::new(FixedCdn::new(Some(600), None), Some("demo".into()));
        let err = processor.upscale("x", UpscaleFactor::Two).await.unwrap_err();
        assert!(matches!(err, PhotoError::MissingDimensions));
    }

    #[tokio::test]
    async fn missing_cloud_name_skips_lookup() {
        let cdn = FixedCdn::new(Some(1), Some(1));
        let processor = Processor::new(cdn.clone(), None);
        let err = processor.upscale("x", UpscaleFactor::Two).await.unwrap_err();
        assert!(matches!(err, PhotoError::MissingCloudName));
        assert_eq!(cdn.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn remove_background_requires_public_id() {
        let processor = Processor::new(FixedCdn::new(None, None), Some("demo".into()));
        assert!(matches!(
            processor.remove_background(" "),
            Err(PhotoError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_locally() {
        let cdn = FixedCdn::new(None, None);
        let processor = Processor::new(cdn.clone(), Some("demo".into()));
        let upload = AssetUpload { file_name: "empty.jpg".into(), data: vec![] };
        assert!(processor.upload(&upload).await.is_err());
        assert_eq!(cdn.calls.load(Ordering::SeqCst), 0);
    }
}
