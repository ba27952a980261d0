use thiserror::Error;

pub const MISSING_INPUT_MESSAGE: &str = "Please upload a resume and provide a job description.";
pub const SUBMISSION_ERROR_MESSAGE: &str = "An error occurred while submitting. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload a resume and provide a job description.")]
    MissingResume,
    #[error("Please upload a resume and provide a job description.")]
    MissingJobDescription,
    #[error("Username and password are required.")]
    MissingCredentials,
    #[error("Please fill in all fields.")]
    IncompleteRegistration,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least 8 characters long.")]
    PasswordTooShort,
    #[error("Passwords do not match!")]
    PasswordMismatch,
    #[error("You must agree to the Terms and Conditions.")]
    TermsNotAccepted,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingResume => "missing_resume",
            ValidationError::MissingJobDescription => "missing_job_description",
            ValidationError::MissingCredentials => "missing_credentials",
            ValidationError::IncompleteRegistration => "incomplete_registration",
            ValidationError::InvalidEmail => "invalid_email",
            ValidationError::PasswordTooShort => "password_too_short",
            ValidationError::PasswordMismatch => "password_mismatch",
            ValidationError::TermsNotAccepted => "terms_not_accepted",
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("text extraction failed with status {status}: {body}")]
    Upload { status: u16, body: String },
    #[error("match request failed with status {status}: {body}")]
    Match { status: u16, body: String },
    #[error("{message}")]
    Auth { status: u16, message: String },
    #[error("request to analysis service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from analysis service: {0}")]
    MalformedResponse(String),
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// The remote service refused the bearer token.
    pub fn is_auth_rejection(&self) -> bool {
        match self {
            CoreError::Upload { status, .. }
            | CoreError::Match { status, .. }
            | CoreError::Auth { status, .. } => *status == 401 || *status == 403,
            CoreError::Transport(err) => err
                .status()
                .map(|status| status.as_u16() == 401 || status.as_u16() == 403)
                .unwrap_or(false),
            _ => false,
        }
    }
}
