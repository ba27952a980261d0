use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use super::errors::CoreError;
use super::models::{LoginRequest, RegistrationRequest};

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct RegisterPayload<'a> {
    username: &'a str,
    full_name: &'a str,
    email: &'a str,
    password: &'a str,
}

pub struct AuthClient {
    client: Client,
    token_endpoint: Url,
    register_endpoint: Url,
}

impl AuthClient {
    pub fn new(client: Client, token_endpoint: Url, register_endpoint: Url) -> Self {
        Self {
            client,
            token_endpoint,
            register_endpoint,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<String, CoreError> {
        let form = vec![
            ("username", request.username.as_str()),
            ("password", request.password.as_str()),
        ];

        info!(username = %request.username, "logging in");
        let response = self
            .client
            .post(self.token_endpoint.clone())
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!(status = status.as_u16(), "login rejected");
            return Err(CoreError::Auth {
                status: status.as_u16(),
                message: login_error_message(&body),
            });
        }

        parse_access_token(&body)
    }

    pub async fn register(&self, request: &RegistrationRequest) -> Result<String, CoreError> {
        let payload = RegisterPayload {
            username: &request.username,
            full_name: &request.full_name,
            email: &request.email,
            password: &request.password,
        };

        info!(username = %request.username, "registering account");
        let response = self
            .client
            .post(self.register_endpoint.clone())
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!(status = status.as_u16(), "registration rejected");
            return Err(CoreError::Auth {
                status: status.as_u16(),
                message: registration_error_message(&body),
            });
        }

        parse_access_token(&body)
    }
}

fn parse_access_token(body: &str) -> Result<String, CoreError> {
    let payload = serde_json::from_str::<AccessTokenResponse>(body)
        .map_err(|err| CoreError::MalformedResponse(format!("access token: {err}")))?;

    if payload.access_token.trim().is_empty() {
        return Err(CoreError::MalformedResponse(
            "access token was empty".to_string(),
        ));
    }

    Ok(payload.access_token)
}

/// `detail` is either a list of `{loc, msg}` field errors or a plain string.
pub fn login_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return LOGIN_FAILED.to_string();
    };

    match value.get("detail") {
        Some(Value::Array(items)) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(|loc| loc.get(1))
                        .map(|field| match field {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .unwrap_or_else(|| "request".to_string());
                    Some(format!("{field}: {msg}"))
                })
                .collect();

            if messages.is_empty() {
                LOGIN_FAILED.to_string()
            } else {
                messages.join(", ")
            }
        }
        Some(Value::String(detail)) if !detail.trim().is_empty() => detail.clone(),
        _ => LOGIN_FAILED.to_string(),
    }
}

pub fn registration_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("msg").and_then(Value::as_str).map(str::to_string))
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| REGISTRATION_FAILED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_field_errors_are_joined() {
        let body = r#"{"detail":[
            {"loc":["body","username"],"msg":"field required","type":"value_error.missing"},
            {"loc":["body","password"],"msg":"field required","type":"value_error.missing"}
        ]}"#;

        assert_eq!(
            login_error_message(body),
            "username: field required, password: field required"
        );
    }

    #[test]
    fn login_string_detail_is_used_verbatim() {
        let body = r#"{"detail":"Incorrect username or password"}"#;
        assert_eq!(login_error_message(body), "Incorrect username or password");
    }

    #[test]
    fn login_falls_back_to_generic_message() {
        assert_eq!(login_error_message("<html>502</html>"), LOGIN_FAILED);
        assert_eq!(login_error_message(r#"{"detail":[]}"#), LOGIN_FAILED);
    }

    #[test]
    fn registration_uses_msg_field() {
        assert_eq!(
            registration_error_message(r#"{"msg":"Username already exists"}"#),
            "Username already exists"
        );
        assert_eq!(registration_error_message("{}"), REGISTRATION_FAILED);
    }

    #[test]
    fn empty_access_token_is_rejected() {
        assert!(parse_access_token(r#"{"access_token":"abc","token_type":"bearer"}"#).is_ok());
        assert!(matches!(
            parse_access_token(r#"{"access_token":""}"#),
            Err(CoreError::MalformedResponse(_))
        ));
    }
}
