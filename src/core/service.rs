use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use super::auth_client::AuthClient;
use super::backend::{HttpAnalysisBackend, ServiceEndpoints};
use super::errors::CoreError;
use super::models::{
    AuthStatus, DocumentBlob, LoginRequest, RegistrationRequest, RuntimeSettings,
    RuntimeSettingsUpdate, SubmissionInput, SubmissionState, SubmissionView,
};
use super::orchestrator::SubmissionOrchestrator;
use super::settings_store::{self, SettingsStore};
use super::token_store::SessionTokenStore;
use super::validator;

pub struct CoreService {
    settings_store: SettingsStore,
    file_settings: RwLock<RuntimeSettings>,
    api_url_override: Option<String>,
    settings: RwLock<RuntimeSettings>,
    tokens: SessionTokenStore,
    auth: AuthClient,
    orchestrator: Arc<SubmissionOrchestrator>,
}

impl CoreService {
    pub async fn new() -> anyhow::Result<Arc<Self>> {
        let settings_store = SettingsStore::new();
        let settings = match settings_store.load().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "ignoring unreadable settings file");
                RuntimeSettings::default()
            }
        };
        let api_url_override = settings_store::api_url_from_env();

        let tokens = SessionTokenStore::new();
        if let Some(token) = settings_store::token_from_env() {
            info!("session token seeded from environment");
            tokens.set(token);
        }

        Self::from_layers(settings_store, settings, api_url_override, tokens)
    }

    pub fn from_parts(
        settings_store: SettingsStore,
        settings: RuntimeSettings,
        tokens: SessionTokenStore,
    ) -> anyhow::Result<Arc<Self>> {
        Self::from_layers(settings_store, settings, None, tokens)
    }

    // The override is layered for this process only and never saved.
    pub fn from_layers(
        settings_store: SettingsStore,
        file_settings: RuntimeSettings,
        api_url_override: Option<String>,
        tokens: SessionTokenStore,
    ) -> anyhow::Result<Arc<Self>> {
        let settings =
            settings_store::apply_api_url_override(file_settings.clone(), api_url_override.clone())?;
        let endpoints = ServiceEndpoints::from_base(&settings.api_base_url)?;
        let client = build_http_client(&settings)?;

        let auth = AuthClient::new(
            client.clone(),
            endpoints.token.clone(),
            endpoints.register.clone(),
        );
        let backend = Arc::new(HttpAnalysisBackend::new(client, &endpoints));
        let orchestrator = Arc::new(SubmissionOrchestrator::new(backend, tokens.clone()));

        info!(api_base_url = %settings.api_base_url, "client ready");

        Ok(Arc::new(Self {
            settings_store,
            file_settings: RwLock::new(file_settings),
            api_url_override,
            settings: RwLock::new(settings),
            tokens,
            auth,
            orchestrator,
        }))
    }

    pub async fn get_settings(&self) -> RuntimeSettings {
        self.settings.read().await.clone()
    }

    pub async fn save_settings(
        &self,
        update: RuntimeSettingsUpdate,
    ) -> anyhow::Result<RuntimeSettings> {
        let mut file_settings = self.file_settings.write().await;
        let next = settings_store::apply_update(&file_settings, update);
        let effective =
            settings_store::apply_api_url_override(next.clone(), self.api_url_override.clone())?;

        self.settings_store.save(&next).await?;
        *file_settings = next.clone();
        *self.settings.write().await = effective;
        Ok(next)
    }

    pub fn settings_path(&self) -> &Path {
        self.settings_store.path()
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthStatus, CoreError> {
        validator::validate_login(&request)?;
        let token = self.auth.login(&request).await?;
        self.tokens.set(token);
        info!(username = %request.username, "signed in");
        Ok(self.auth_status())
    }

    pub async fn register(&self, request: RegistrationRequest) -> Result<AuthStatus, CoreError> {
        validator::validate_registration(&request)?;
        let token = self.auth.register(&request).await?;
        self.tokens.set(token);
        info!(username = %request.username, "account registered");
        Ok(self.auth_status())
    }

    pub async fn logout(&self) -> AuthStatus {
        self.tokens.clear();
        self.orchestrator.reset().await;
        info!("signed out");
        self.auth_status()
    }

    pub fn use_token(&self, token: impl Into<String>) {
        self.tokens.set(token);
    }

    pub fn auth_status(&self) -> AuthStatus {
        AuthStatus {
            signed_in: self.tokens.is_set(),
        }
    }

    pub async fn select_resume(&self, path: &Path) -> Result<DocumentBlob, CoreError> {
        let blob = DocumentBlob::from_path(path).await?;
        self.orchestrator.select_resume(blob.clone()).await;
        Ok(blob)
    }

    pub async fn clear_resume(&self) {
        self.orchestrator.clear_resume().await;
    }

    pub async fn select_job_description_file(
        &self,
        path: &Path,
    ) -> Result<DocumentBlob, CoreError> {
        let blob = DocumentBlob::from_path(path).await?;
        self.orchestrator
            .select_job_description_file(blob.clone())
            .await;
        Ok(blob)
    }

    pub async fn clear_job_description_file(&self) {
        self.orchestrator.clear_job_description_file().await;
    }

    pub async fn enter_job_description_text(&self, text: impl Into<String>) {
        self.orchestrator.enter_job_description_text(text).await;
    }

    pub async fn input(&self) -> SubmissionInput {
        self.orchestrator.input_snapshot().await
    }

    pub async fn submit(&self) -> Result<SubmissionState, CoreError> {
        self.orchestrator.submit().await
    }

    pub async fn reset(&self) {
        self.orchestrator.reset().await;
    }

    pub async fn status(&self) -> SubmissionView {
        self.orchestrator.view().await
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.orchestrator.subscribe()
    }
}

fn build_http_client(settings: &RuntimeSettings) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.clone());
    if let Some(secs) = settings.request_timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build().context("failed to build HTTP client")
}
