//! Recording adapters: delegate to a live port and write each call to a cassette.

pub mod image_cdn;
pub mod vision_model;

use std::fmt::Display;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::cassette::{CassetteRecorder, Port};

/// Record one call. Successes are stored as `{"Ok": value}`, failures as
/// `{"Err": message}`. Recording never changes the call's result.
pub(crate) fn record_result<T: Serialize, E: Display>(
    recorder: &Mutex<CassetteRecorder>,
    port: Port,
    method: &str,
    input: Value,
    result: &Result<T, E>,
) {
    let output = match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(value) => json!({ "Ok": value }),
            Err(e) => {
                warn!(%port, method, error = %e, "could not serialize result for the cassette");
                return;
            }
        },
        Err(e) => json!({ "Err": e.to_string() }),
    };

    match recorder.lock() {
        Ok(mut recorder) => recorder.record(port, method, input, output),
        Err(_) => warn!(%port, method, "cassette recorder lock poisoned, call not recorded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhotoError;
    use crate::ports::UploadedAsset;

    #[test]
    fn ok_and_err_are_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.yaml");
        let recorder = Mutex::new(CassetteRecorder::new(&path, "t", "c"));

        let ok: Result<UploadedAsset, PhotoError> = Ok(UploadedAsset {
            public_id: "bestphoto/cat".into(),
            secure_url: "https://x/cat.jpg".into(),
        });
        let err: Result<UploadedAsset, PhotoError> =
            Err(PhotoError::Api { status: 401, message: "bad key".into() });
        record_result(&recorder, Port::ImageCdn, "upload", json!({"file_name": "cat.jpg"}), &ok);
        record_result(&recorder, Port::ImageCdn, "upload", Value::Null, &err);

        let recorder = recorder.into_inner().unwrap();
        assert_eq!(recorder.len(), 2);
        let cassette = crate::cassette::Cassette::load(&recorder.finish().unwrap()).unwrap();
        assert_eq!(cassette.interactions[0].output["Ok"]["public_id"], "bestphoto/cat");
        assert_eq!(cassette.interactions[1].output["Err"], "API error (401): bad key");
    }
}
