use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::SelectionEntity,
    dto::{
        format_system_time,
        validation::{validate_custom_text, validate_submitted_name},
    },
    state::workflow::{Snapshot, WorkflowStep},
};

/// Workflow step as exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleStep {
    /// Picking a name from the roster.
    Selecting,
    /// Guessing which participant the selected name drew.
    Guessing,
    /// Choosing a gift.
    GiftPicking,
    /// Selection persisted; summary available.
    Drafted,
}

impl From<WorkflowStep> for VisibleStep {
    fn from(value: WorkflowStep) -> Self {
        match value {
            WorkflowStep::Selecting => VisibleStep::Selecting,
            WorkflowStep::Guessing => VisibleStep::Guessing,
            WorkflowStep::GiftPicking => VisibleStep::GiftPicking,
            WorkflowStep::Drafted => VisibleStep::Drafted,
        }
    }
}

/// Snapshot of one session's workflow, polled by the frontend after each step.
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkflowSnapshot {
    /// Current step.
    pub step: VisibleStep,
    /// Name recorded during the selecting step, if reached.
    pub selected_name: Option<String>,
    /// Guess recorded during the guessing step, if reached.
    pub guessed_name: Option<String>,
    /// Resolved gift recorded at the final step, if reached.
    pub gift: Option<String>,
    /// Whether a submit is currently in flight; the frontend disables its
    /// submit control while this is set.
    pub submitting: bool,
}

impl From<&Snapshot> for WorkflowSnapshot {
    fn from(value: &Snapshot) -> Self {
        Self {
            step: value.step.into(),
            selected_name: value.draft.selected_name.clone(),
            guessed_name: value.draft.guessed_name.clone(),
            gift: value.draft.gift.clone(),
            submitting: value.is_submitting(),
        }
    }
}

/// Response returned when a new workflow session is started.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartSessionResponse {
    /// Identifier to use on the per-session routes.
    pub session_id: Uuid,
    /// Initial snapshot (always the selecting step).
    pub snapshot: WorkflowSnapshot,
}

/// Body for the selection and guess submit routes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitNameRequest {
    /// Roster name being submitted.
    pub name: String,
}

impl Validate for SubmitNameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_submitted_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Body for the gift submit route.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitGiftRequest {
    /// One of the configured gift labels, or the custom marker.
    pub choice: String,
    /// Free-text gift, used only when `choice` is the custom marker.
    #[serde(default)]
    pub custom_text: Option<String>,
}

impl Validate for SubmitGiftRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_submitted_name(&self.choice) {
            errors.add("choice", e);
        }

        if let Some(ref text) = self.custom_text {
            if let Err(e) = validate_custom_text(text) {
                errors.add("custom_text", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Summary of the persisted selection returned once the workflow is drafted.
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionSummary {
    /// Name the participant picked.
    pub selected_name: String,
    /// Name the participant guessed.
    pub guessed_name: String,
    /// Effective gift value.
    pub gift: String,
    /// RFC 3339 timestamp of when the selection was drafted.
    pub created_at: String,
}

impl From<SelectionEntity> for SelectionSummary {
    fn from(value: SelectionEntity) -> Self {
        Self {
            selected_name: value.selected_name,
            guessed_name: value.guessed_name,
            gift: value.gift,
            created_at: format_system_time(value.created_at),
        }
    }
}

/// Response of the final gift submit: the new snapshot plus the persisted summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct DraftedResponse {
    /// Snapshot after the transition (step is `drafted`).
    pub snapshot: WorkflowSnapshot,
    /// The selection as persisted.
    pub selection: SelectionSummary,
}
