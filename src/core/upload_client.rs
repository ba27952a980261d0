use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::errors::CoreError;
use super::models::DocumentBlob;

// The service reads the job description from the same field name.
const DOCUMENT_FIELD: &str = "resume_file";

const PDF_MIME: &str = "application/pdf";
const DOC_MIME: &str = "application/msword";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const TEXT_MIME: &str = "text/plain";
const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
struct ExtractTextResponse {
    resume_text: String,
}

pub struct UploadClient {
    client: Client,
    endpoint: Url,
}

impl UploadClient {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub async fn extract_text(
        &self,
        document: &DocumentBlob,
        token: Option<&str>,
    ) -> Result<String, CoreError> {
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(content_type_for(&document.file_name))?;
        let form = Form::new().part(DOCUMENT_FIELD, part);

        info!(file = %document.file_name, "extracting document text");
        debug!(bytes = document.bytes.len(), "upload payload size");

        let mut request = self.client.post(self.endpoint.clone()).multipart(form);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = status.as_u16(), "text extraction rejected");
            return Err(CoreError::Upload {
                status: status.as_u16(),
                body,
            });
        }

        let payload = serde_json::from_str::<ExtractTextResponse>(&body)
            .map_err(|err| CoreError::MalformedResponse(format!("upload_resume: {err}")))?;

        Ok(payload.resume_text)
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|v| v.to_str())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => PDF_MIME,
        "doc" => DOC_MIME,
        "docx" => DOCX_MIME,
        "txt" => TEXT_MIME,
        _ => FALLBACK_MIME,
    }
}
