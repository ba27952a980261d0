use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use super::errors::CoreError;
use super::models::MatchReport;

pub struct MatchClient {
    client: Client,
    endpoint: Url,
}

impl MatchClient {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub async fn match_resume_to_job(
        &self,
        resume_text: &str,
        job_description: &str,
        token: Option<&str>,
    ) -> Result<MatchReport, CoreError> {
        let form = vec![
            ("resume_text", resume_text),
            ("job_description", job_description),
        ];

        info!("requesting resume match");
        debug!(
            resume_chars = resume_text.len(),
            job_description_chars = job_description.len(),
            "match payload size"
        );

        let mut request = self.client.post(self.endpoint.clone()).form(&form);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = status.as_u16(), "match request rejected");
            return Err(CoreError::Match {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<MatchReport>(&body)
            .map_err(|err| CoreError::MalformedResponse(format!("match_resume: {err}")))
    }
}
