use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{CoreError, ValidationError, SUBMISSION_ERROR_MESSAGE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlob {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentBlob {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, CoreError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|v| v.to_str())
            .unwrap_or("document")
            .to_string();

        Ok(Self { file_name, bytes })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDescriptionSource {
    File(DocumentBlob),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionInput {
    pub resume: Option<DocumentBlob>,
    pub job_description: Option<JobDescriptionSource>,
}

impl SubmissionInput {
    pub fn job_description_file(&self) -> Option<&DocumentBlob> {
        match &self.job_description {
            Some(JobDescriptionSource::File(blob)) => Some(blob),
            _ => None,
        }
    }

    pub fn job_description_text(&self) -> Option<&str> {
        match &self.job_description {
            Some(JobDescriptionSource::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// The analysis service's verdict, deserialized from its wire field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    #[serde(rename = "JDMatch")]
    pub match_percentage: String,
    #[serde(rename = "MissingKeywords")]
    pub missing_keywords: Vec<String>,
    #[serde(rename = "ProfileSummary")]
    pub profile_summary: String,
    #[serde(rename = "Advice")]
    pub advice: Vec<String>,
    #[serde(rename = "AlternativeJob")]
    pub alternative_job: String,
}

impl MatchReport {
    pub fn has_gaps(&self) -> bool {
        !self.missing_keywords.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionPhase {
    Idle,
    Validating,
    UploadingResume,
    UploadingJobDescription,
    Matching,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Validating => "validating",
            SubmissionPhase::UploadingResume => "uploading_resume",
            SubmissionPhase::UploadingJobDescription => "uploading_job_description",
            SubmissionPhase::Matching => "matching",
            SubmissionPhase::Succeeded => "succeeded",
            SubmissionPhase::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum FailureReason {
    Validation {
        #[serde(serialize_with = "serialize_validation_code")]
        error: ValidationError,
    },
    Submission {
        step: SubmissionPhase,
        detail: String,
        auth_rejected: bool,
    },
}

fn serialize_validation_code<S>(error: &ValidationError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(error.code())
}

impl FailureReason {
    pub fn submission(step: SubmissionPhase, error: &CoreError) -> Self {
        FailureReason::Submission {
            step,
            detail: error.to_string(),
            auth_rejected: error.is_auth_rejection(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::Validation { error } => error.code(),
            FailureReason::Submission { .. } => "submission_error",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            FailureReason::Validation { error } => error.to_string(),
            FailureReason::Submission { .. } => SUBMISSION_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            FailureReason::Submission {
                auth_rejected: true,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "phase", content = "detail")]
pub enum SubmissionState {
    Idle,
    Validating,
    UploadingResume,
    UploadingJobDescription,
    Matching,
    Succeeded(MatchReport),
    Failed(FailureReason),
}

impl SubmissionState {
    pub fn phase(&self) -> SubmissionPhase {
        match self {
            SubmissionState::Idle => SubmissionPhase::Idle,
            SubmissionState::Validating => SubmissionPhase::Validating,
            SubmissionState::UploadingResume => SubmissionPhase::UploadingResume,
            SubmissionState::UploadingJobDescription => SubmissionPhase::UploadingJobDescription,
            SubmissionState::Matching => SubmissionPhase::Matching,
            SubmissionState::Succeeded(_) => SubmissionPhase::Succeeded,
            SubmissionState::Failed(_) => SubmissionPhase::Failed,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SubmissionState::Validating
                | SubmissionState::UploadingResume
                | SubmissionState::UploadingJobDescription
                | SubmissionState::Matching
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded(_) | SubmissionState::Failed(_)
        )
    }

    pub fn report(&self) -> Option<&MatchReport> {
        match self {
            SubmissionState::Succeeded(report) => Some(report),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            SubmissionState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub run_id: Option<Uuid>,
    pub phase: SubmissionPhase,
    pub state: SubmissionState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub signed_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_to_terms: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSettings {
    pub api_base_url: String,
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

fn default_user_agent() -> String {
    format!("JobfitClient/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSettingsUpdate {
    pub api_base_url: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOk {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_report_uses_wire_field_names() {
        let body = r#"{
            "JDMatch": "75%",
            "MissingKeywords": ["Kubernetes", "gRPC"],
            "ProfileSummary": "Backend engineer with Go experience.",
            "Advice": ["Mention Kubernetes work", "Quantify latency wins"],
            "AlternativeJob": "Site Reliability Engineer"
        }"#;

        let report = serde_json::from_str::<MatchReport>(body).unwrap();
        assert_eq!(report.match_percentage, "75%");
        assert_eq!(report.missing_keywords, vec!["Kubernetes", "gRPC"]);
        assert!(report.has_gaps());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["JDMatch"], "75%");
        assert_eq!(json["AlternativeJob"], "Site Reliability Engineer");
    }

    #[test]
    fn match_report_requires_keyword_list() {
        let body = r#"{"JDMatch":"10%","ProfileSummary":"","Advice":[],"AlternativeJob":""}"#;
        assert!(serde_json::from_str::<MatchReport>(body).is_err());
    }

    #[test]
    fn in_flight_covers_only_working_phases() {
        assert!(!SubmissionState::Idle.is_in_flight());
        assert!(SubmissionState::Validating.is_in_flight());
        assert!(SubmissionState::UploadingResume.is_in_flight());
        assert!(SubmissionState::UploadingJobDescription.is_in_flight());
        assert!(SubmissionState::Matching.is_in_flight());

        let failed = SubmissionState::Failed(FailureReason::Validation {
            error: ValidationError::MissingResume,
        });
        assert!(!failed.is_in_flight());
        assert!(failed.is_terminal());
        assert_eq!(failed.phase(), SubmissionPhase::Failed);
    }

    #[test]
    fn failure_reason_maps_remote_errors_to_generic_message() {
        let reason = FailureReason::submission(
            SubmissionPhase::UploadingResume,
            &CoreError::Upload {
                status: 401,
                body: "expired".to_string(),
            },
        );

        assert_eq!(reason.code(), "submission_error");
        assert_eq!(reason.user_message(), SUBMISSION_ERROR_MESSAGE);
        assert!(reason.is_auth_rejection());
    }

    #[test]
    fn state_serializes_with_phase_tag() {
        let state = SubmissionState::Failed(FailureReason::Validation {
            error: ValidationError::MissingJobDescription,
        });
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["phase"], "failed");
        assert_eq!(json["detail"]["kind"], "validation");
        assert_eq!(json["detail"]["error"], "missing_job_description");
    }
}
