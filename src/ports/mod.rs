//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`.

pub mod image_cdn;
pub mod vision_model;

pub use image_cdn::{AssetInfo, AssetUpload, ImageCdn, UploadedAsset};
pub use vision_model::{VisionModel, VisionRequest, VisionResponse};
