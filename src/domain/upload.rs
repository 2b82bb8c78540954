use std::sync::Arc;

use crate::domain::types::ImageUrl;

/// A file selected for upload together with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Arc<[u8]>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes: Arc::from(bytes),
        }
    }

    /// Whether the declared content type is an image type.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.starts_with("image/"))
    }

    /// Local preview sharing this file's buffer.
    pub fn preview(&self) -> Preview {
        Preview {
            name: self.name.clone(),
            bytes: Arc::clone(&self.bytes),
        }
    }
}

/// Local preview handle of a selected file.
///
/// The buffer is shared with the in-flight upload and released once both the
/// preview and the upload task are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl Preview {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Remote state of one file's upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Pending,
    Succeeded(ImageUrl),
    Failed(String),
}

impl UploadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// One tracked upload: the local preview and its remote state.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub preview: Preview,
    pub state: UploadState,
}

impl UploadTask {
    pub fn new(file: &UploadFile) -> Self {
        Self {
            preview: file.preview(),
            state: UploadState::Pending,
        }
    }

    pub fn name(&self) -> &str {
        &self.preview.name
    }
}
