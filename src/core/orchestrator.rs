use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::backend::AnalysisBackend;
use super::errors::{CoreError, ValidationError};
use super::input::InputCollector;
use super::models::{
    DocumentBlob, FailureReason, JobDescriptionSource, MatchReport, SubmissionInput,
    SubmissionPhase, SubmissionState, SubmissionView,
};
use super::token_store::SessionTokenStore;
use super::validator;

struct RunRecord {
    id: Uuid,
    cancel: CancellationToken,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    fn start() -> Self {
        Self {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

struct Slot {
    input: InputCollector,
    state: SubmissionState,
    run: Option<RunRecord>,
}

enum RunError {
    Failed(FailureReason),
    Discarded,
}

/// One submission at a time: validate, upload résumé, [upload job
/// description], match. State writes re-check the run's cancel token under
/// the slot lock, so nothing lands after a reset.
pub struct SubmissionOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    tokens: SessionTokenStore,
    slot: Mutex<Slot>,
    state_tx: watch::Sender<SubmissionState>,
}

impl SubmissionOrchestrator {
    pub fn new(backend: Arc<dyn AnalysisBackend>, tokens: SessionTokenStore) -> Self {
        let (state_tx, _) = watch::channel(SubmissionState::Idle);

        Self {
            backend,
            tokens,
            slot: Mutex::new(Slot {
                input: InputCollector::new(),
                state: SubmissionState::Idle,
                run: None,
            }),
            state_tx,
        }
    }

    pub async fn select_resume(&self, resume: DocumentBlob) {
        self.slot.lock().await.input.select_resume(resume);
    }

    pub async fn clear_resume(&self) {
        self.slot.lock().await.input.clear_resume();
    }

    pub async fn select_job_description_file(&self, file: DocumentBlob) {
        self.slot.lock().await.input.select_job_description_file(file);
    }

    pub async fn clear_job_description_file(&self) {
        self.slot.lock().await.input.clear_job_description_file();
    }

    pub async fn enter_job_description_text(&self, text: impl Into<String>) {
        self.slot.lock().await.input.enter_job_description_text(text);
    }

    pub async fn input_snapshot(&self) -> SubmissionInput {
        self.slot.lock().await.input.snapshot()
    }

    pub async fn state(&self) -> SubmissionState {
        self.slot.lock().await.state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state_tx.subscribe()
    }

    pub async fn view(&self) -> SubmissionView {
        let slot = self.slot.lock().await;
        let run = slot.run.as_ref();

        SubmissionView {
            run_id: run.map(|r| r.id),
            phase: slot.state.phase(),
            state: slot.state.clone(),
            started_at: run.map(|r| r.started_at),
            finished_at: run.and_then(|r| r.finished_at),
            message: slot.state.failure().map(FailureReason::user_message),
        }
    }

    pub async fn submit(&self) -> Result<SubmissionState, CoreError> {
        let (run_id, cancel, input) = {
            let mut slot = self.slot.lock().await;
            if slot.state.is_in_flight() {
                warn!(
                    phase = slot.state.phase().as_str(),
                    "submit refused while a run is in flight"
                );
                return Err(CoreError::SubmissionInFlight);
            }

            let run = RunRecord::start();
            let handle = (run.id, run.cancel.clone());
            slot.run = Some(run);
            self.publish(&mut slot, SubmissionState::Validating);
            (handle.0, handle.1, slot.input.snapshot())
        };

        info!(%run_id, "submission started");
        let next = match self.run_pipeline(&cancel, input).await {
            Ok(report) => SubmissionState::Succeeded(report),
            Err(RunError::Failed(reason)) => SubmissionState::Failed(reason),
            Err(RunError::Discarded) => {
                info!(%run_id, "submission discarded after reset");
                return Ok(self.state().await);
            }
        };

        let mut slot = self.slot.lock().await;
        if cancel.is_cancelled() {
            info!(%run_id, "late result discarded after reset");
            return Ok(slot.state.clone());
        }

        match &next {
            SubmissionState::Succeeded(report) => info!(
                %run_id,
                match_percentage = %report.match_percentage,
                missing_keywords = report.missing_keywords.len(),
                "submission succeeded"
            ),
            SubmissionState::Failed(reason) => {
                warn!(%run_id, code = reason.code(), "submission failed")
            }
            _ => {}
        }

        if let Some(run) = slot.run.as_mut() {
            run.finished_at = Some(Utc::now());
        }
        self.publish(&mut slot, next.clone());
        Ok(next)
    }

    pub async fn reset(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(run) = slot.run.take() {
            run.cancel.cancel();
        }
        slot.input.reset();
        self.publish(&mut slot, SubmissionState::Idle);
    }

    async fn run_pipeline(
        &self,
        cancel: &CancellationToken,
        input: SubmissionInput,
    ) -> Result<MatchReport, RunError> {
        if let Err(error) = validator::validate(&input) {
            return Err(RunError::Failed(FailureReason::Validation { error }));
        }

        let SubmissionInput {
            resume: Some(resume),
            job_description: Some(job_description),
        } = input
        else {
            return Err(RunError::Failed(FailureReason::Validation {
                error: ValidationError::MissingResume,
            }));
        };

        self.advance(cancel, SubmissionState::UploadingResume).await?;
        let token = self.tokens.get();
        let resume_text = self
            .guarded(
                cancel,
                SubmissionPhase::UploadingResume,
                self.backend.extract_text(&resume, token.as_deref()),
            )
            .await?;

        let job_description_content = match job_description {
            JobDescriptionSource::File(file) => {
                self.advance(cancel, SubmissionState::UploadingJobDescription)
                    .await?;
                let token = self.tokens.get();
                self.guarded(
                    cancel,
                    SubmissionPhase::UploadingJobDescription,
                    self.backend.extract_text(&file, token.as_deref()),
                )
                .await?
            }
            JobDescriptionSource::Text(text) => text,
        };

        self.advance(cancel, SubmissionState::Matching).await?;
        let token = self.tokens.get();
        self.guarded(
            cancel,
            SubmissionPhase::Matching,
            self.backend
                .match_resume(&resume_text, &job_description_content, token.as_deref()),
        )
        .await
    }

    async fn advance(
        &self,
        cancel: &CancellationToken,
        next: SubmissionState,
    ) -> Result<(), RunError> {
        let mut slot = self.slot.lock().await;
        if cancel.is_cancelled() {
            return Err(RunError::Discarded);
        }

        info!(phase = next.phase().as_str(), "submission phase");
        self.publish(&mut slot, next);
        Ok(())
    }

    async fn guarded<T>(
        &self,
        cancel: &CancellationToken,
        step: SubmissionPhase,
        call: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, RunError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RunError::Discarded),
            result = call => result.map_err(|err| {
                warn!(step = step.as_str(), error = %err, "remote call failed");
                RunError::Failed(FailureReason::submission(step, &err))
            }),
        }
    }

    fn publish(&self, slot: &mut Slot, next: SubmissionState) {
        slot.state = next.clone();
        self.state_tx.send_replace(next);
    }
}
