use async_trait::async_trait;
use url::Url;

use super::errors::CoreError;
use super::match_client::MatchClient;
use super::models::{DocumentBlob, MatchReport};
use super::upload_client::UploadClient;

const UPLOAD_RESUME_PATH: &str = "upload_resume";
const MATCH_RESUME_PATH: &str = "match_resume";
const TOKEN_PATH: &str = "token";
const REGISTER_PATH: &str = "register";

/// The two remote operations a submission run depends on.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn extract_text(
        &self,
        document: &DocumentBlob,
        token: Option<&str>,
    ) -> Result<String, CoreError>;

    async fn match_resume(
        &self,
        resume_text: &str,
        job_description: &str,
        token: Option<&str>,
    ) -> Result<MatchReport, CoreError>;
}

#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub upload_resume: Url,
    pub match_resume: Url,
    pub token: Url,
    pub register: Url,
}

impl ServiceEndpoints {
    pub fn from_base(base_url: &str) -> Result<Self, CoreError> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|err| CoreError::InvalidSettings(format!("api base url {base_url:?}: {err}")))?;

        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(CoreError::InvalidSettings(format!(
                "api base url must be http(s): {base_url}"
            )));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |path: &str| {
            base.join(path)
                .map_err(|err| CoreError::InvalidSettings(format!("endpoint {path}: {err}")))
        };

        Ok(Self {
            upload_resume: join(UPLOAD_RESUME_PATH)?,
            match_resume: join(MATCH_RESUME_PATH)?,
            token: join(TOKEN_PATH)?,
            register: join(REGISTER_PATH)?,
        })
    }
}

pub struct HttpAnalysisBackend {
    upload: UploadClient,
    matcher: MatchClient,
}

impl HttpAnalysisBackend {
    pub fn new(client: reqwest::Client, endpoints: &ServiceEndpoints) -> Self {
        Self {
            upload: UploadClient::new(client.clone(), endpoints.upload_resume.clone()),
            matcher: MatchClient::new(client, endpoints.match_resume.clone()),
        }
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn extract_text(
        &self,
        document: &DocumentBlob,
        token: Option<&str>,
    ) -> Result<String, CoreError> {
        self.upload.extract_text(document, token).await
    }

    async fn match_resume(
        &self,
        resume_text: &str,
        job_description: &str,
        token: Option<&str>,
    ) -> Result<MatchReport, CoreError> {
        self.matcher
            .match_resume_to_job(resume_text, job_description, token)
            .await
    }
}
