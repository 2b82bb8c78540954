use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::domain::types::ImageUrl;
use crate::domain::upload::UploadFile;
use crate::repository::{ImageUploader, RepositoryError, RepositoryResult};

/// Uploads images to an external host accepting unsigned multipart uploads.
///
/// Every request carries the file under `file` and the configured preset
/// under `upload_preset`; the host answers with JSON holding `secure_url`.
#[derive(Clone)]
pub struct HttpImageUploader {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Deserialize)]
struct UploadErrorBody {
    message: String,
}

impl HttpImageUploader {
    pub fn new(
        upload_url: impl Into<String>,
        upload_preset: impl Into<String>,
        timeout: Duration,
    ) -> RepositoryResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            upload_url: upload_url.into(),
            upload_preset: upload_preset.into(),
        })
    }

    fn form(&self, file: &UploadFile) -> RepositoryResult<Form> {
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| RepositoryError::Http(e.to_string()))?;
        }
        Ok(Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone()))
    }
}

#[async_trait]
impl ImageUploader for HttpImageUploader {
    async fn upload(&self, file: &UploadFile) -> RepositoryResult<ImageUrl> {
        let form = self.form(file)?;
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        log::debug!("Image host answered {status} for {}", file.name);
        parse_upload_response(status, &body)
    }
}

fn parse_upload_response(status: StatusCode, body: &str) -> RepositoryResult<ImageUrl> {
    let response: UploadResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if !status.is_success() => {
            return Err(RepositoryError::Http(format!("HTTP {status}")));
        }
        Err(e) => return Err(RepositoryError::Decode(e.to_string())),
    };

    if let Some(error) = response.error {
        return Err(RepositoryError::Server(error.message));
    }
    if !status.is_success() {
        return Err(RepositoryError::Http(format!("HTTP {status}")));
    }
    match response.secure_url {
        Some(url) => Ok(ImageUrl::new(url)?),
        None => Err(RepositoryError::Decode(
            "upload response has no secure_url".to_string(),
        )),
    }
}
