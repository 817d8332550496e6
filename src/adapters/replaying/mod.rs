//! Replaying adapters: answer port calls from a cassette without touching the network.

pub mod image_cdn;
pub mod vision_model;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::{CassetteReplayer, Port};
use crate::error::PhotoError;

/// Take the next recorded output for a port method.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: Port,
    method: &str,
) -> Result<serde_json::Value, PhotoError> {
    replayer
        .lock()
        .map_err(|_| PhotoError::Config("Cassette replayer lock poisoned".to_string()))?
        .next_output(port, method)
}

/// Turn a recorded output back into a result.
///
/// A recorded failure comes back as [`PhotoError::Api`] with status 0 and the
/// recorded message; an output that does not match `T` is reported the same way.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, PhotoError> {
    let replayed = |message: String| PhotoError::Api { status: 0, message };

    if let Some(err) = output.get("Err").or_else(|| output.get("err")) {
        return Err(replayed(err.as_str().unwrap_or("replayed error").to_string()));
    }
    let ok = output.get("Ok").or_else(|| output.get("ok")).cloned();
    serde_json::from_value(ok.unwrap_or(output))
        .map_err(|e| replayed(format!("Malformed cassette output: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ports::VisionResponse;

    #[test]
    fn ok_output_is_deserialized() {
        let response: VisionResponse = replay_result(json!({"Ok": {"text": "3"}})).unwrap();
        assert_eq!(response.text.as_deref(), Some("3"));
    }

    #[test]
    fn bare_output_is_accepted() {
        let response: VisionResponse = replay_result(json!({"text": "1"})).unwrap();
        assert_eq!(response.text.as_deref(), Some("1"));
    }

    #[test]
    fn err_output_becomes_api_error() {
        let err = replay_result::<VisionResponse>(json!({"Err": "quota exceeded"})).unwrap_err();
        assert!(matches!(
            err,
            PhotoError::Api { status: 0, ref message } if message == "quota exceeded"
        ));
    }
}
