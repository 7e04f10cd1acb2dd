//! Outbound boundary of the wizard.
//!
//! The HTTP layer that talks to the ConfRadar API implements
//! [`ConferenceGateway`]. [`RecordingGateway`] keeps everything in memory and
//! backs dry runs and tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use ts_rs::TS;
use uuid::Uuid;

use super::draft::{DraftData, DraftLists};
use super::state::WizardMode;
use super::steps::ConferenceKind;
use crate::error::SubmissionError;

/// Per-step save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StepSaveRequest {
    /// Absent until the first step creates the conference server-side
    pub conference_id: Option<String>,
    pub step: u32,
    pub mode: WizardMode,
    #[ts(type = "Record<string, unknown>")]
    pub fields: DraftData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StepSaveResponse {
    pub conference_id: String,
}

/// Final "save all" submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaveAllRequest {
    pub conference_id: Option<String>,
    #[ts(type = "Record<string, unknown>")]
    pub draft: DraftData,
    pub entities: DraftLists,
    /// Only categories with at least one id, keyed `deleted<Category>Ids`
    pub deletions: BTreeMap<String, Vec<String>>,
}

/// An existing conference as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoadedConference {
    pub id: String,
    #[serde(default)]
    pub kind: ConferenceKind,
    #[serde(default)]
    pub max_step: Option<u32>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub basic_data: DraftData,
    #[serde(default)]
    pub entities: DraftLists,
}

#[async_trait]
pub trait ConferenceGateway: Send + Sync {
    /// Persist one step's fields, creating the conference if needed
    async fn save_step(&self, request: StepSaveRequest)
        -> Result<StepSaveResponse, SubmissionError>;

    /// Submit the whole draft together with pending deletions
    async fn save_all(&self, request: SaveAllRequest) -> Result<(), SubmissionError>;

    async fn load_conference(&self, id: &str) -> Result<LoadedConference, SubmissionError>;
}

/// In-memory gateway that records every request it receives
#[derive(Debug, Default)]
pub struct RecordingGateway {
    conferences: Mutex<HashMap<String, LoadedConference>>,
    step_requests: Mutex<Vec<StepSaveRequest>>,
    save_all_requests: Mutex<Vec<SaveAllRequest>>,
    /// Error returned by the next call, then cleared
    fail_next: Mutex<Option<SubmissionError>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a conference that `load_conference` can return
    pub fn with_conference(mut self, conference: LoadedConference) -> Self {
        self.conferences
            .get_mut()
            .insert(conference.id.clone(), conference);
        self
    }

    /// Make the next gateway call fail with `error`
    pub async fn fail_next(&self, error: SubmissionError) {
        *self.fail_next.lock().await = Some(error);
    }

    pub async fn step_requests(&self) -> Vec<StepSaveRequest> {
        self.step_requests.lock().await.clone()
    }

    pub async fn save_all_requests(&self) -> Vec<SaveAllRequest> {
        self.save_all_requests.lock().await.clone()
    }

    async fn take_failure(&self) -> Result<(), SubmissionError> {
        match self.fail_next.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConferenceGateway for RecordingGateway {
    async fn save_step(
        &self,
        request: StepSaveRequest,
    ) -> Result<StepSaveResponse, SubmissionError> {
        self.take_failure().await?;

        let conference_id = request
            .conference_id
            .clone()
            .unwrap_or_else(|| format!("conf-{}", Uuid::new_v4()));
        tracing::info!(conference_id = %conference_id, step = request.step, "recorded step save");

        self.step_requests.lock().await.push(request);
        Ok(StepSaveResponse { conference_id })
    }

    async fn save_all(&self, request: SaveAllRequest) -> Result<(), SubmissionError> {
        self.take_failure().await?;

        tracing::info!(
            conference_id = ?request.conference_id,
            deletions = request.deletions.len(),
            "recorded save-all"
        );
        self.save_all_requests.lock().await.push(request);
        Ok(())
    }

    async fn load_conference(&self, id: &str) -> Result<LoadedConference, SubmissionError> {
        self.take_failure().await?;

        self.conferences
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SubmissionError::NotFound(id.to_string()))
    }
}
