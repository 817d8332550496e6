//! Scripted port doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::PhotoError;
use crate::ports::vision_model::VisionFuture;
use crate::ports::{VisionModel, VisionRequest, VisionResponse};

/// A successful reply with the given text.
pub fn reply(text: &str) -> Result<VisionResponse, PhotoError> {
    Ok(VisionResponse {
        text: Some(text.to_string()),
        usage: None,
        raw: serde_json::json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }),
    })
}

/// A real transport error: a connection to a port nothing listens on.
pub async fn transport_error() -> PhotoError {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = reqwest::Client::new().get(format!("http://{addr}/")).send().await.unwrap_err();
    PhotoError::Network(err)
}

/// Vision model that serves queued results in order and records every request.
pub struct ScriptedVision {
    results: Mutex<VecDeque<Result<VisionResponse, PhotoError>>>,
    requests: Mutex<Vec<VisionRequest>>,
    calls: AtomicUsize,
}

impl ScriptedVision {
    pub fn new(results: Vec<Result<VisionResponse, PhotoError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<VisionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl VisionModel for ScriptedVision {
    fn generate(&self, request: &VisionRequest) -> VisionFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.results.lock().unwrap().pop_front();
        Box::pin(async move { next.expect("scripted vision model ran out of results") })
    }
}
