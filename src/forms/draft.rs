//! Product drafts stored as YAML files for the command line client.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::upload::UploadFile;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse draft: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{} is not a supported image file", .0.display())]
    NotAnImage(PathBuf),
}

/// Values to replay into an add product form.
///
/// Prices are whole numbers; `child_category` is the id of the child
/// category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: u32,
    #[serde(default)]
    pub discount: u32,
    pub sku: String,
    pub unit: String,
    pub parent_category: String,
    pub child_category: String,
    /// Image paths, relative to the draft file.
    #[serde(default)]
    pub images: Vec<PathBuf>,
}

impl ProductDraft {
    pub fn from_yaml(source: &str) -> Result<Self, DraftError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, DraftError> {
        let source = fs::read_to_string(path).map_err(|source| DraftError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&source)
    }

    /// Reads every image, resolving relative paths against `base_dir`.
    pub fn read_images(&self, base_dir: &Path) -> Result<Vec<UploadFile>, DraftError> {
        self.images
            .iter()
            .map(|image| {
                let path = base_dir.join(image);
                let content_type =
                    image_content_type(&path).ok_or_else(|| DraftError::NotAnImage(path.clone()))?;
                let bytes = fs::read(&path).map_err(|source| DraftError::Read {
                    path: path.clone(),
                    source,
                })?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Ok(UploadFile::new(name, Some(content_type.to_string()), bytes))
            })
            .collect()
    }
}

/// Image MIME type guessed from the file extension.
pub fn image_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
