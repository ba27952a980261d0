use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::ValidationError;
use super::models::{LoginRequest, RegistrationRequest, SubmissionInput};

/// File-picker hint only; nothing here rejects other extensions.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub fn validate(input: &SubmissionInput) -> Result<(), ValidationError> {
    if input.resume.is_none() {
        return Err(ValidationError::MissingResume);
    }

    if input.job_description.is_none() {
        return Err(ValidationError::MissingJobDescription);
    }

    Ok(())
}

pub fn is_accepted_file_type(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|v| v.to_str())
        .map(|v| v.to_ascii_lowercase())
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn validate_login(request: &LoginRequest) -> Result<(), ValidationError> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }

    Ok(())
}

pub fn validate_registration(request: &RegistrationRequest) -> Result<(), ValidationError> {
    let required = [
        &request.username,
        &request.full_name,
        &request.email,
        &request.password,
        &request.confirm_password,
    ];
    if required.iter().any(|field| field.is_empty()) {
        return Err(ValidationError::IncompleteRegistration);
    }

    if !EMAIL_RE.is_match(&request.email) {
        return Err(ValidationError::InvalidEmail);
    }

    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }

    if request.password != request.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }

    if !request.agree_to_terms {
        return Err(ValidationError::TermsNotAccepted);
    }

    Ok(())
}
