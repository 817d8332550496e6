//! Per-session selection state: the uploaded batch and the current selection.
//!
//! A `PhotoSession` is created per CLI run (or per client session) and passed to
//! whoever drives a selection. Nothing here is global.

use std::fmt;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::category::Category;
use crate::encoder::{encode_bytes, EncodedImage};
use crate::error::PhotoError;
use crate::selection::{resolve, Named, SelectionRequest, Selector};

/// Upload lifecycle of a file in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Selected but not yet read.
    Pending,
    /// Being read or uploaded.
    Uploading,
    /// Ready to be analysed.
    Completed,
    /// Failed; excluded from analysis.
    Error,
}

impl UploadStatus {
    /// Whether moving from `self` to `next` is allowed.
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Uploading)
                | (Self::Uploading, Self::Completed)
                | (Self::Uploading, Self::Error)
        )
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Completed => "completed",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// A locally selected photo.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Opaque client-generated identifier.
    pub id: Uuid,
    /// Original file name.
    pub name: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// Declared MIME type, if any.
    pub mime_type: Option<String>,
    /// Display handle for the file (a path or URL).
    pub preview: String,
    /// Where the file is in its upload lifecycle.
    pub status: UploadStatus,
}

impl Named for UploadedFile {
    fn name(&self) -> &str {
        &self.name
    }
}

/// The session's current best pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    /// Identifier of the selected file.
    pub best_photo_id: Option<Uuid>,
    /// Name of the selected file.
    pub best_photo_name: Option<String>,
    /// 0-based position within the analysed batch.
    pub best_photo_index: Option<usize>,
    /// Why it was selected.
    pub reason: String,
    /// Raw model response, kept for chaining.
    pub raw_response: serde_json::Value,
    /// The model's reply text.
    pub reply: String,
}

/// Explicit state for one user's selection workflow.
#[derive(Debug)]
pub struct PhotoSession {
    category: Category,
    files: Vec<UploadedFile>,
    result: Option<SelectionResult>,
}

impl PhotoSession {
    /// An empty session for `category`.
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self { category, files: Vec::new(), result: None }
    }

    /// The session's category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// All files, in the order they were added.
    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// The current selection, if any.
    #[must_use]
    pub fn result(&self) -> Option<&SelectionResult> {
        self.result.as_ref()
    }

    /// Add a pending file and return its id.
    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
        mime_type: Option<String>,
        preview: impl Into<String>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.files.push(UploadedFile {
            id,
            name: name.into(),
            bytes,
            mime_type,
            preview: preview.into(),
            status: UploadStatus::Pending,
        });
        id
    }

    /// Add a pending file from an already-encoded image, keeping its MIME type.
    ///
    /// # Errors
    ///
    /// Returns an error if the image payload is not valid base64.
    pub fn add_encoded(
        &mut self,
        image: EncodedImage,
        preview: impl Into<String>,
    ) -> Result<Uuid, PhotoError> {
        let bytes = image.decode()?;
        let mime_type = Some(image.mime_type).filter(|t| !t.is_empty());
        Ok(self.add_file(image.name, bytes, mime_type, preview))
    }

    /// Mark a file as uploading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unknown or not pending.
    pub fn mark_uploading(&mut self, id: Uuid) -> Result<(), PhotoError> {
        self.transition(id, UploadStatus::Uploading)
    }

    /// Mark a file as ready for analysis.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unknown or not uploading.
    pub fn complete(&mut self, id: Uuid) -> Result<(), PhotoError> {
        self.transition(id, UploadStatus::Completed)
    }

    /// Mark a file as failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unknown or not uploading.
    pub fn fail(&mut self, id: Uuid) -> Result<(), PhotoError> {
        self.transition(id, UploadStatus::Error)
    }

    fn transition(&mut self, id: Uuid, next: UploadStatus) -> Result<(), PhotoError> {
        let file = self
            .files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| PhotoError::InvalidArgument(format!("Unknown file id {id}")))?;
        if !file.status.can_become(next) {
            return Err(PhotoError::InvalidArgument(format!(
                "Cannot move '{}' from {} to {next}",
                file.name, file.status
            )));
        }
        debug!(file = %file.name, from = %file.status, to = %next, "file status changed");
        file.status = next;
        Ok(())
    }

    /// Remove a file. Clears the selection if it pointed at that file.
    pub fn remove(&mut self, id: Uuid) -> Option<UploadedFile> {
        let pos = self.files.iter().position(|f| f.id == id)?;
        if self.result.as_ref().and_then(|r| r.best_photo_id) == Some(id) {
            self.result = None;
        }
        Some(self.files.remove(pos))
    }

    /// Drop every file and the selection.
    pub fn reset(&mut self) {
        self.files.clear();
        self.result = None;
    }

    /// Files ready for analysis, in order. Indices in replies refer to this list.
    #[must_use]
    pub fn completed(&self) -> Vec<&UploadedFile> {
        self.files.iter().filter(|f| f.status == UploadStatus::Completed).collect()
    }

    /// Encode the analysable batch.
    #[must_use]
    pub fn encode_batch(&self) -> Vec<EncodedImage> {
        self.completed()
            .into_iter()
            .map(|f| encode_bytes(&f.name, &f.bytes, f.mime_type.as_deref()))
            .collect()
    }

    /// Run a first round over the completed files and store the result.
    ///
    /// # Errors
    ///
    /// Returns any error from the selector; the previous result is kept.
    pub async fn analyze(&mut self, selector: &Selector) -> Result<&SelectionResult, PhotoError> {
        let request = SelectionRequest::first_round(self.encode_batch());
        self.run(selector, &request).await
    }

    /// Run a feedback round, replaying the previous reply, and store the result.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError::InvalidArgument`] if the feedback is blank, and any
    /// error from the selector; the previous result is kept.
    pub async fn refine(
        &mut self,
        selector: &Selector,
        feedback: &str,
    ) -> Result<&SelectionResult, PhotoError> {
        if feedback.trim().is_empty() {
            return Err(PhotoError::InvalidArgument("Feedback must not be empty".to_string()));
        }
        let first_output = self.result.as_ref().map(|r| r.reply.clone());
        let request = SelectionRequest::feedback_round(self.encode_batch(), first_output, feedback);
        self.run(selector, &request).await
    }

    async fn run(
        &mut self,
        selector: &Selector,
        request: &SelectionRequest,
    ) -> Result<&SelectionResult, PhotoError> {
        let outcome = selector.select(self.category, request).await?;

        let batch = self.completed();
        let resolution =
            resolve(&batch, outcome.best_photo_index, outcome.best_photo_id.as_deref());
        let picked = resolution.item().map(|f| (f.id, f.name.clone()));
        let best_photo_index = resolution.index();

        let result = SelectionResult {
            best_photo_id: picked.as_ref().map(|(id, _)| *id),
            best_photo_name: picked.map(|(_, name)| name),
            best_photo_index,
            reason: outcome.reason,
            raw_response: outcome.raw_response,
            reply: outcome.reply,
        };
        Ok(self.result.insert(result))
    }
}
