use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

/// Steps of the gift-exchange workflow, from name selection to the drafted summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    /// Picking a name from the roster.
    Selecting,
    /// Guessing which participant the selected name drew.
    Guessing,
    /// Choosing a gift (or entering a custom one).
    GiftPicking,
    /// Terminal: the selection has been persisted.
    Drafted,
}

/// Fields of a selection accumulated across the workflow steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDraft {
    /// Name picked during the selecting step.
    pub selected_name: Option<String>,
    /// Guess recorded during the guessing step.
    pub guessed_name: Option<String>,
    /// Resolved gift recorded during the gift step.
    pub gift: Option<String>,
}

/// Events that can be applied to the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// The selected name passed validation and the uniqueness check.
    ConfirmSelection {
        /// Roster name being selected.
        selected_name: String,
    },
    /// The guess passed validation.
    ConfirmGuess {
        /// Roster name being guessed.
        guessed_name: String,
    },
    /// The resolved gift passed validation and the selection was persisted.
    ConfirmGift {
        /// Effective gift value (custom text already resolved).
        gift: String,
    },
}

/// Error returned when attempting an event that is not legal from the current step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The step the workflow was in when the invalid event was received.
    pub from: WorkflowStep,
    /// The event that cannot be applied from this step.
    pub event: WorkflowEvent,
}

/// Errors that can occur when planning a workflow transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted first.
    AlreadyPending,
    /// The requested transition is not valid from the current step.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned workflow transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Errors that can occur when aborting a planned workflow transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned workflow transition.
pub type PlanId = Uuid;

/// A transition that has been validated but whose side effect has not completed yet.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Step the workflow is currently in.
    pub from: WorkflowStep,
    /// Step the workflow will move to when applied.
    pub to: WorkflowStep,
    /// Event that triggered this transition.
    pub event: WorkflowEvent,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of the workflow state handed to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current step of the workflow.
    pub step: WorkflowStep,
    /// Fields accumulated so far.
    pub draft: SelectionDraft,
    /// Version number (increments on each applied transition).
    pub version: usize,
    /// Step a pending transition would move to, if a submit is in flight.
    pub pending: Option<WorkflowStep>,
}

impl Snapshot {
    /// Whether a submit is currently in flight for this workflow.
    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }
}

/// State machine driving one participant's selection/guess/gift workflow.
///
/// Transitions with an awaited side effect (the uniqueness read, the final
/// insert) are bracketed with [`Workflow::plan`] and [`Workflow::apply`] /
/// [`Workflow::abort`] so a failed side effect leaves the step and draft
/// untouched, and no second submit can start while one is in flight.
#[derive(Debug, Clone)]
pub struct Workflow {
    step: WorkflowStep,
    draft: SelectionDraft,
    version: usize,
    pending: Option<Plan>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            step: WorkflowStep::Selecting,
            draft: SelectionDraft::default(),
            version: 0,
            pending: None,
        }
    }
}

impl Workflow {
    /// Create a workflow at the selecting step with an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current step.
    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    /// Fields accumulated so far.
    pub fn draft(&self) -> &SelectionDraft {
        &self.draft
    }

    /// Create a snapshot of the current workflow state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step,
            draft: self.draft.clone(),
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.to),
        }
    }

    /// Plan a transition by validating that the event is legal from the current step.
    /// Returns a [`Plan`] that must later be applied or aborted.
    pub fn plan(&mut self, event: WorkflowEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self
            .compute_transition(event.clone())
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.step,
            to: next,
            event,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition: advance the step, fold the event payload
    /// into the draft, and bump the version.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<WorkflowStep, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected,
                got: plan_id,
            });
        }

        match plan.event {
            WorkflowEvent::ConfirmSelection { selected_name } => {
                self.draft.selected_name = Some(selected_name);
            }
            WorkflowEvent::ConfirmGuess { guessed_name } => {
                self.draft.guessed_name = Some(guessed_name);
            }
            WorkflowEvent::ConfirmGift { gift } => {
                self.draft.gift = Some(gift);
            }
        }

        self.step = plan.to;
        self.version += 1;

        Ok(self.step)
    }

    /// Abort a planned transition without applying it, leaving step and draft unchanged.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    /// Compute the step an event would move to, if the transition is legal.
    fn compute_transition(&self, event: WorkflowEvent) -> Result<WorkflowStep, InvalidTransition> {
        let next = match (self.step, &event) {
            (WorkflowStep::Selecting, WorkflowEvent::ConfirmSelection { .. }) => {
                WorkflowStep::Guessing
            }
            (WorkflowStep::Guessing, WorkflowEvent::ConfirmGuess { .. }) => {
                WorkflowStep::GiftPicking
            }
            (WorkflowStep::GiftPicking, WorkflowEvent::ConfirmGift { .. }) => WorkflowStep::Drafted,
            (from, _) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(workflow: &mut Workflow, event: WorkflowEvent) -> WorkflowStep {
        let plan = workflow.plan(event).unwrap();
        workflow.apply(plan.id).unwrap()
    }

    #[test]
    fn initial_step_is_selecting() {
        let workflow = Workflow::new();
        assert_eq!(workflow.step(), WorkflowStep::Selecting);
        assert_eq!(workflow.draft(), &SelectionDraft::default());
    }

    #[test]
    fn full_happy_path_accumulates_draft() {
        let mut workflow = Workflow::new();

        assert_eq!(
            apply(
                &mut workflow,
                WorkflowEvent::ConfirmSelection {
                    selected_name: "Kornis".into(),
                }
            ),
            WorkflowStep::Guessing
        );
        assert_eq!(
            apply(
                &mut workflow,
                WorkflowEvent::ConfirmGuess {
                    guessed_name: "Ignas".into(),
                }
            ),
            WorkflowStep::GiftPicking
        );
        assert_eq!(
            apply(
                &mut workflow,
                WorkflowEvent::ConfirmGift {
                    gift: "kepure".into(),
                }
            ),
            WorkflowStep::Drafted
        );

        assert_eq!(
            workflow.draft(),
            &SelectionDraft {
                selected_name: Some("Kornis".into()),
                guessed_name: Some("Ignas".into()),
                gift: Some("kepure".into()),
            }
        );
        assert_eq!(workflow.snapshot().version, 3);
    }

    #[test]
    fn drafted_is_terminal() {
        let mut workflow = Workflow::new();
        apply(
            &mut workflow,
            WorkflowEvent::ConfirmSelection {
                selected_name: "Kornis".into(),
            },
        );
        apply(
            &mut workflow,
            WorkflowEvent::ConfirmGuess {
                guessed_name: "Ignas".into(),
            },
        );
        apply(
            &mut workflow,
            WorkflowEvent::ConfirmGift {
                gift: "kepure".into(),
            },
        );

        let err = workflow
            .plan(WorkflowEvent::ConfirmSelection {
                selected_name: "Rokas".into(),
            })
            .unwrap_err();
        match err {
            PlanError::InvalidTransition(invalid) => {
                assert_eq!(invalid.from, WorkflowStep::Drafted);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_transition_returns_error() {
        let mut workflow = Workflow::new();
        let err = workflow
            .plan(WorkflowEvent::ConfirmGift {
                gift: "kepure".into(),
            })
            .unwrap_err();
        match err {
            PlanError::InvalidTransition(invalid) => {
                assert_eq!(invalid.from, WorkflowStep::Selecting);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn second_plan_rejected_while_pending() {
        let mut workflow = Workflow::new();
        let _plan = workflow
            .plan(WorkflowEvent::ConfirmSelection {
                selected_name: "Kornis".into(),
            })
            .unwrap();

        let err = workflow
            .plan(WorkflowEvent::ConfirmSelection {
                selected_name: "Ignas".into(),
            })
            .unwrap_err();
        assert_eq!(err, PlanError::AlreadyPending);
    }

    #[test]
    fn abort_leaves_step_and_draft_untouched() {
        let mut workflow = Workflow::new();
        let plan = workflow
            .plan(WorkflowEvent::ConfirmSelection {
                selected_name: "Kornis".into(),
            })
            .unwrap();

        workflow.abort(plan.id).unwrap();

        assert_eq!(workflow.step(), WorkflowStep::Selecting);
        assert_eq!(workflow.draft(), &SelectionDraft::default());
        assert_eq!(workflow.snapshot().version, 0);
        assert!(workflow.snapshot().pending.is_none());
    }

    #[test]
    fn snapshot_exposes_pending_as_submitting() {
        let mut workflow = Workflow::new();
        assert!(!workflow.snapshot().is_submitting());

        let plan = workflow
            .plan(WorkflowEvent::ConfirmSelection {
                selected_name: "Kornis".into(),
            })
            .unwrap();

        let snapshot = workflow.snapshot();
        assert!(snapshot.is_submitting());
        assert_eq!(snapshot.pending, Some(WorkflowStep::Guessing));

        workflow.apply(plan.id).unwrap();
        assert!(!workflow.snapshot().is_submitting());
    }

    #[test]
    fn apply_with_wrong_plan_id_keeps_pending() {
        let mut workflow = Workflow::new();
        let plan = workflow
            .plan(WorkflowEvent::ConfirmSelection {
                selected_name: "Kornis".into(),
            })
            .unwrap();

        let err = workflow.apply(Uuid::new_v4()).unwrap_err();
        match err {
            ApplyError::IdMismatch { expected, .. } => assert_eq!(expected, plan.id),
            other => panic!("unexpected error: {other:?}"),
        }

        // The original plan is still pending and can be applied.
        assert_eq!(workflow.apply(plan.id).unwrap(), WorkflowStep::Guessing);
    }
}
