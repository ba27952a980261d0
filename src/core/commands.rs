use std::path::Path;
use std::sync::Arc;

use super::models::{
    AuthStatus, CommandOk, LoginRequest, RegistrationRequest, RuntimeSettings,
    RuntimeSettingsUpdate, SubmissionView,
};
use super::service::CoreService;

pub struct AppState {
    pub core: Arc<CoreService>,
}

pub async fn login(
    state: &AppState,
    username: String,
    password: String,
) -> Result<AuthStatus, String> {
    state
        .core
        .login(LoginRequest { username, password })
        .await
        .map_err(|err| err.to_string())
}

pub async fn register(
    state: &AppState,
    request: RegistrationRequest,
) -> Result<AuthStatus, String> {
    state
        .core
        .register(request)
        .await
        .map_err(|err| err.to_string())
}

pub async fn logout(state: &AppState) -> Result<AuthStatus, String> {
    Ok(state.core.logout().await)
}

pub fn auth_status(state: &AppState) -> Result<AuthStatus, String> {
    Ok(state.core.auth_status())
}

pub async fn select_resume(state: &AppState, path: &Path) -> Result<String, String> {
    state
        .core
        .select_resume(path)
        .await
        .map(|blob| blob.file_name)
        .map_err(|err| format!("could not read {}: {err}", path.display()))
}

pub async fn clear_resume(state: &AppState) -> Result<CommandOk, String> {
    state.core.clear_resume().await;
    Ok(CommandOk { ok: true })
}

pub async fn select_job_description_file(
    state: &AppState,
    path: &Path,
) -> Result<String, String> {
    state
        .core
        .select_job_description_file(path)
        .await
        .map(|blob| blob.file_name)
        .map_err(|err| format!("could not read {}: {err}", path.display()))
}

pub async fn clear_job_description_file(state: &AppState) -> Result<CommandOk, String> {
    state.core.clear_job_description_file().await;
    Ok(CommandOk { ok: true })
}

pub async fn enter_job_description_text(
    state: &AppState,
    text: String,
) -> Result<CommandOk, String> {
    state.core.enter_job_description_text(text).await;
    Ok(CommandOk { ok: true })
}

// Validation and remote failures come back as a Failed view, not Err.
pub async fn submit(state: &AppState) -> Result<SubmissionView, String> {
    state.core.submit().await.map_err(|err| err.to_string())?;
    Ok(state.core.status().await)
}

pub async fn reset(state: &AppState) -> Result<CommandOk, String> {
    state.core.reset().await;
    Ok(CommandOk { ok: true })
}

pub async fn get_submission_status(state: &AppState) -> Result<SubmissionView, String> {
    Ok(state.core.status().await)
}

pub async fn get_settings(state: &AppState) -> Result<RuntimeSettings, String> {
    Ok(state.core.get_settings().await)
}

pub async fn save_settings(
    state: &AppState,
    settings: RuntimeSettingsUpdate,
) -> Result<RuntimeSettings, String> {
    state
        .core
        .save_settings(settings)
        .await
        .map_err(|err| format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::MISSING_INPUT_MESSAGE;
    use crate::core::models::SubmissionPhase;
    use crate::core::settings_store::SettingsStore;
    use crate::core::token_store::SessionTokenStore;

    fn app_state(dir: &tempfile::TempDir) -> AppState {
        AppState {
            core: CoreService::from_parts(
                SettingsStore::new_with_path(dir.path().join("settings.json")),
                RuntimeSettings::default(),
                SessionTokenStore::new(),
            )
            .unwrap(),
        }
    }

    #[tokio::test]
    async fn submit_without_input_reports_failed_view() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir);

        let view = submit(&state).await.unwrap();

        assert_eq!(view.phase, SubmissionPhase::Failed);
        assert_eq!(view.message.as_deref(), Some(MISSING_INPUT_MESSAGE));
        assert!(view.run_id.is_some());
    }

    #[tokio::test]
    async fn clearing_job_description_file_keeps_pasted_text() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir);
        let jd = dir.path().join("jd.pdf");
        std::fs::write(&jd, b"%PDF-1.7").unwrap();

        select_job_description_file(&state, &jd).await.unwrap();
        clear_job_description_file(&state).await.unwrap();
        assert!(state.core.input().await.job_description.is_none());

        enter_job_description_text(&state, "Data Engineer".to_string())
            .await
            .unwrap();
        clear_job_description_file(&state).await.unwrap();
        assert_eq!(
            state.core.input().await.job_description_text(),
            Some("Data Engineer")
        );
    }

    #[tokio::test]
    async fn missing_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir);
        let path = dir.path().join("absent.docx");

        let err = select_resume(&state, &path).await.unwrap_err();

        assert!(err.contains("absent.docx"));
    }

    #[tokio::test]
    async fn bad_api_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir);

        let err = save_settings(
            &state,
            RuntimeSettingsUpdate {
                api_base_url: Some("localhost:8000".to_string()),
                request_timeout_seconds: None,
            },
        )
        .await
        .unwrap_err();

        assert!(err.contains("invalid settings"));
        assert_eq!(
            get_settings(&state).await.unwrap(),
            RuntimeSettings::default()
        );
    }
}
