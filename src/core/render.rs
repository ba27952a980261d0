use std::fmt::Write;

use super::models::{MatchReport, SubmissionState};

pub const IDLE_PLACEHOLDER: &str = "Submit your resume to see match results";
pub const NO_MISSING_KEYWORDS: &str = "No missing keywords found!";

pub fn render_report(report: &MatchReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== JD Match ===");
    let _ = writeln!(out, "  {}\n", report.match_percentage);

    let _ = writeln!(out, "=== Missing Keywords ===");
    if report.has_gaps() {
        for keyword in &report.missing_keywords {
            let _ = writeln!(out, "  - {keyword}");
        }
        out.push('\n');
    } else {
        let _ = writeln!(out, "  {NO_MISSING_KEYWORDS}\n");
    }

    let _ = writeln!(out, "=== Profile Summary ===");
    let _ = writeln!(out, "  {}\n", report.profile_summary);

    let _ = writeln!(out, "=== Improvement Advice ===");
    for (i, tip) in report.advice.iter().enumerate() {
        let _ = writeln!(out, "  {}. {tip}", i + 1);
    }
    out.push('\n');

    let _ = writeln!(out, "=== Alternative Job Suggestion ===");
    let _ = writeln!(out, "  {}", report.alternative_job);

    out
}

pub fn render_state(state: &SubmissionState) -> String {
    match state {
        SubmissionState::Idle => IDLE_PLACEHOLDER.to_string(),
        SubmissionState::Validating => "Checking input...".to_string(),
        SubmissionState::UploadingResume => "Uploading resume...".to_string(),
        SubmissionState::UploadingJobDescription => {
            "Uploading job description...".to_string()
        }
        SubmissionState::Matching => "Matching resume to job description...".to_string(),
        SubmissionState::Succeeded(report) => render_report(report),
        SubmissionState::Failed(reason) => reason.user_message(),
    }
}

pub fn report_json(report: &MatchReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ValidationError, MISSING_INPUT_MESSAGE, SUBMISSION_ERROR_MESSAGE};
    use crate::core::models::{FailureReason, SubmissionPhase};

    fn report(missing: Vec<&str>) -> MatchReport {
        MatchReport {
            match_percentage: "82%".to_string(),
            missing_keywords: missing.into_iter().map(str::to_string).collect(),
            profile_summary: "Backend engineer, 6 years of Go.".to_string(),
            advice: vec![
                "Lead with distributed systems work".to_string(),
                "Quantify on-call improvements".to_string(),
            ],
            alternative_job: "Site Reliability Engineer".to_string(),
        }
    }

    #[test]
    fn report_lists_every_section_in_order() {
        let text = render_report(&report(vec!["Kubernetes", "gRPC"]));

        let order = [
            "JD Match",
            "82%",
            "Missing Keywords",
            "- Kubernetes",
            "- gRPC",
            "Profile Summary",
            "Improvement Advice",
            "1. Lead with distributed systems work",
            "2. Quantify on-call improvements",
            "Alternative Job Suggestion",
            "Site Reliability Engineer",
        ];
        let mut cursor = 0;
        for needle in order {
            let at = text[cursor..]
                .find(needle)
                .unwrap_or_else(|| panic!("{needle:?} missing or out of order"));
            cursor += at + needle.len();
        }
        assert!(!text.contains(NO_MISSING_KEYWORDS));
    }

    #[test]
    fn empty_keywords_show_placeholder() {
        let text = render_report(&report(vec![]));
        assert!(text.contains(NO_MISSING_KEYWORDS));
    }

    #[test]
    fn state_messages() {
        assert_eq!(render_state(&SubmissionState::Idle), IDLE_PLACEHOLDER);

        let invalid = SubmissionState::Failed(FailureReason::Validation {
            error: ValidationError::MissingJobDescription,
        });
        assert_eq!(render_state(&invalid), MISSING_INPUT_MESSAGE);

        let remote = SubmissionState::Failed(FailureReason::Submission {
            step: SubmissionPhase::Matching,
            detail: "match request failed with status 500: boom".to_string(),
            auth_rejected: false,
        });
        assert_eq!(render_state(&remote), SUBMISSION_ERROR_MESSAGE);
    }

    #[test]
    fn json_keeps_wire_names() {
        let json = report_json(&report(vec!["Kubernetes"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["JDMatch"], "82%");
        assert_eq!(value["MissingKeywords"][0], "Kubernetes");
        assert_eq!(value["Advice"].as_array().map(Vec::len), Some(2));
    }
}
