use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::timeout};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::{AppConfig, CUSTOM_GIFT_CHOICE},
    dao::{models::SelectionEntity, selection_store::SelectionStore, storage::StorageResult},
    dto::workflow::{
        DraftedResponse, StartSessionResponse, SubmitGiftRequest, SubmitNameRequest,
        WorkflowSnapshot,
    },
    error::ServiceError,
    state::{
        SharedState, WorkflowSession,
        workflow::{Plan, Workflow, WorkflowEvent},
    },
};

/// Create a fresh workflow session at the selecting step.
pub fn start_session(state: &SharedState) -> StartSessionResponse {
    let (session_id, snapshot) = state.create_session();
    info!(%session_id, "workflow session started");
    StartSessionResponse {
        session_id,
        snapshot: (&snapshot).into(),
    }
}

/// Snapshot a session's workflow without touching the store.
pub async fn session_snapshot(
    state: &SharedState,
    session_id: Uuid,
) -> Result<WorkflowSnapshot, ServiceError> {
    let session = require_session(state, session_id)?;
    let mut guard = session.lock().await;
    guard.touch();
    Ok((&guard.workflow.snapshot()).into())
}

/// Record the selected name after checking it is free.
///
/// The read here is only the fast path giving the user an early answer; the
/// store's uniqueness constraint is what actually prevents two racing
/// sessions from both drafting the same name.
pub async fn submit_selection(
    state: &SharedState,
    session_id: Uuid,
    request: SubmitNameRequest,
) -> Result<WorkflowSnapshot, ServiceError> {
    let name = roster_name(state.config(), &request.name)?;

    let session = require_session(state, session_id)?;
    let mut guard = session.lock().await;
    guard.touch();

    let store = state.require_selection_store().await?;
    let plan = guard.workflow.plan(WorkflowEvent::ConfirmSelection {
        selected_name: name.clone(),
    })?;

    match bounded(state.transition_timeout(), store.find_selection(&name)).await {
        Ok(None) => {
            guard.workflow.apply(plan.id)?;
            Ok((&guard.workflow.snapshot()).into())
        }
        Ok(Some(_)) => {
            abort_plan(&mut guard.workflow, &plan);
            Err(ServiceError::DuplicateSelection {
                selected_name: name,
            })
        }
        Err(err) => {
            abort_plan(&mut guard.workflow, &plan);
            Err(err)
        }
    }
}

/// Record the guess; purely local, no store involvement.
pub async fn submit_guess(
    state: &SharedState,
    session_id: Uuid,
    request: SubmitNameRequest,
) -> Result<WorkflowSnapshot, ServiceError> {
    let name = roster_name(state.config(), &request.name)?;

    let session = require_session(state, session_id)?;
    let mut guard = session.lock().await;
    guard.touch();

    if guard.workflow.draft().selected_name.as_deref() == Some(name.as_str()) {
        return Err(ServiceError::InvalidInput(
            "the guess must differ from the selected name".into(),
        ));
    }

    let plan = guard.workflow.plan(WorkflowEvent::ConfirmGuess {
        guessed_name: name,
    })?;
    guard.workflow.apply(plan.id)?;

    Ok((&guard.workflow.snapshot()).into())
}

/// Resolve the effective gift, persist the completed selection, and draft the
/// workflow. A failed insert leaves the session at the gift step with its
/// draft intact so the user can simply resubmit.
pub async fn submit_gift(
    state: &SharedState,
    session_id: Uuid,
    request: SubmitGiftRequest,
) -> Result<DraftedResponse, ServiceError> {
    let gift = resolve_gift(state.config(), &request)?;

    let session = require_session(state, session_id)?;
    let mut guard = session.lock().await;
    guard.touch();

    let store = state.require_selection_store().await?;
    let plan = guard
        .workflow
        .plan(WorkflowEvent::ConfirmGift { gift: gift.clone() })?;

    let draft = guard.workflow.draft();
    let (Some(selected_name), Some(guessed_name)) =
        (draft.selected_name.clone(), draft.guessed_name.clone())
    else {
        abort_plan(&mut guard.workflow, &plan);
        return Err(ServiceError::InvalidState(
            "workflow draft is missing earlier steps".into(),
        ));
    };

    let entity = SelectionEntity::new(selected_name, guessed_name, gift);

    match bounded(
        state.transition_timeout(),
        store.insert_selection(entity.clone()),
    )
    .await
    {
        Ok(()) => {
            guard.workflow.apply(plan.id)?;
            info!(
                selected_name = %entity.selected_name,
                "selection drafted"
            );
            Ok(DraftedResponse {
                snapshot: (&guard.workflow.snapshot()).into(),
                selection: entity.into(),
            })
        }
        Err(ServiceError::DuplicateSelection { .. }) => {
            // An earlier insert whose response was lost (e.g. cancelled by the
            // timeout) may have landed anyway; the session's own row counts as
            // success so a resubmit can still reach the drafted step.
            match find_own_selection(&store, state.transition_timeout(), &entity).await {
                Some(existing) => {
                    guard.workflow.apply(plan.id)?;
                    info!(
                        selected_name = %existing.selected_name,
                        "selection already persisted; drafting on resubmit"
                    );
                    Ok(DraftedResponse {
                        snapshot: (&guard.workflow.snapshot()).into(),
                        selection: existing.into(),
                    })
                }
                None => {
                    abort_plan(&mut guard.workflow, &plan);
                    Err(ServiceError::DuplicateSelection {
                        selected_name: entity.selected_name,
                    })
                }
            }
        }
        Err(err) => {
            abort_plan(&mut guard.workflow, &plan);
            Err(err)
        }
    }
}

/// Load the persisted selection for the entity's name, if it matches the
/// entity's guess and gift. A mismatch means someone else's row, not ours.
async fn find_own_selection(
    store: &Arc<dyn SelectionStore>,
    limit: Option<Duration>,
    entity: &SelectionEntity,
) -> Option<SelectionEntity> {
    let existing = bounded(limit, store.find_selection(&entity.selected_name))
        .await
        .ok()??;

    (existing.guessed_name == entity.guessed_name && existing.gift == entity.gift)
        .then_some(existing)
}

/// Trim the submitted name and check roster membership.
fn roster_name(config: &AppConfig, submitted: &str) -> Result<String, ServiceError> {
    let name = submitted.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("name must not be empty".into()));
    }
    if !config.is_participant(name) {
        return Err(ServiceError::InvalidInput(format!(
            "`{name}` is not part of the roster"
        )));
    }
    Ok(name.to_owned())
}

/// Resolve the effective gift value: the free text when the custom option was
/// chosen, otherwise the chosen label itself.
fn resolve_gift(config: &AppConfig, request: &SubmitGiftRequest) -> Result<String, ServiceError> {
    let choice = request.choice.trim();
    if choice == CUSTOM_GIFT_CHOICE {
        let text = request.custom_text.as_deref().unwrap_or("").trim();
        if text.is_empty() {
            return Err(ServiceError::InvalidInput(
                "custom gift text must not be empty".into(),
            ));
        }
        return Ok(text.to_owned());
    }

    if !config.is_gift_option(choice) {
        return Err(ServiceError::InvalidInput(format!(
            "`{choice}` is not one of the offered gifts"
        )));
    }

    Ok(choice.to_owned())
}

fn require_session(
    state: &SharedState,
    session_id: Uuid,
) -> Result<Arc<Mutex<WorkflowSession>>, ServiceError> {
    state
        .session(session_id)
        .ok_or_else(|| ServiceError::NotFound(format!("session `{session_id}` not found")))
}

fn abort_plan(workflow: &mut Workflow, plan: &Plan) {
    if let Err(err) = workflow.abort(plan.id) {
        warn!(plan_id = %plan.id, error = ?err, "failed to abort planned transition");
    }
}

/// Run a store call under the configured transition timeout.
async fn bounded<T>(
    limit: Option<Duration>,
    work: impl Future<Output = StorageResult<T>>,
) -> Result<T, ServiceError> {
    let outcome = if let Some(limit) = limit {
        match timeout(limit, work).await {
            Ok(result) => result,
            Err(_) => return Err(ServiceError::Timeout),
        }
    } else {
        work.await
    };

    outcome.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Mutex as StdMutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{selection_store::SelectionStore, storage::StorageError},
        dto::workflow::VisibleStep,
        state::AppState,
    };

    /// In-memory store backing the service tests, counting every call.
    #[derive(Clone, Default)]
    struct MemorySelectionStore {
        inner: Arc<StdMutex<HashMap<String, SelectionEntity>>>,
        fail_inserts: Arc<AtomicBool>,
        reads: Arc<AtomicUsize>,
        writes: Arc<AtomicUsize>,
    }

    impl MemorySelectionStore {
        fn seed(&self, entity: SelectionEntity) {
            self.inner
                .lock()
                .unwrap()
                .insert(entity.selected_name.clone(), entity);
        }

        fn stored(&self, name: &str) -> Option<SelectionEntity> {
            self.inner.lock().unwrap().get(name).cloned()
        }

        fn total_calls(&self) -> usize {
            self.reads.load(Ordering::SeqCst) + self.writes.load(Ordering::SeqCst)
        }
    }

    impl SelectionStore for MemorySelectionStore {
        fn find_selection(
            &self,
            selected_name: &str,
        ) -> BoxFuture<'static, StorageResult<Option<SelectionEntity>>> {
            let store = self.clone();
            let selected_name = selected_name.to_owned();
            Box::pin(async move {
                store.reads.fetch_add(1, Ordering::SeqCst);
                Ok(store.stored(&selected_name))
            })
        }

        fn insert_selection(
            &self,
            selection: SelectionEntity,
        ) -> BoxFuture<'static, StorageResult<()>> {
            let store = self.clone();
            Box::pin(async move {
                store.writes.fetch_add(1, Ordering::SeqCst);
                if store.fail_inserts.load(Ordering::SeqCst) {
                    return Err(StorageError::unavailable(
                        "injected failure".into(),
                        std::io::Error::other("injected failure"),
                    ));
                }
                let mut inner = store.inner.lock().unwrap();
                if inner.contains_key(&selection.selected_name) {
                    return Err(StorageError::duplicate(selection.selected_name));
                }
                inner.insert(selection.selected_name.clone(), selection);
                Ok(())
            })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    async fn test_state() -> (SharedState, MemorySelectionStore) {
        let state = AppState::new(AppConfig::default());
        let store = MemorySelectionStore::default();
        state.set_selection_store(Arc::new(store.clone())).await;
        (state, store)
    }

    fn name_request(name: &str) -> SubmitNameRequest {
        SubmitNameRequest { name: name.into() }
    }

    #[tokio::test]
    async fn full_flow_drafts_and_persists_selection() {
        let (state, store) = test_state().await;
        let started = start_session(&state);
        let id = started.session_id;
        assert_eq!(started.snapshot.step, VisibleStep::Selecting);

        let snapshot = submit_selection(&state, id, name_request("Kornis"))
            .await
            .unwrap();
        assert_eq!(snapshot.step, VisibleStep::Guessing);
        assert_eq!(snapshot.selected_name.as_deref(), Some("Kornis"));

        let snapshot = submit_guess(&state, id, name_request("Ignas")).await.unwrap();
        assert_eq!(snapshot.step, VisibleStep::GiftPicking);

        let drafted = submit_gift(
            &state,
            id,
            SubmitGiftRequest {
                choice: "kepure".into(),
                custom_text: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(drafted.snapshot.step, VisibleStep::Drafted);
        assert_eq!(drafted.selection.selected_name, "Kornis");
        assert_eq!(drafted.selection.guessed_name, "Ignas");
        assert_eq!(drafted.selection.gift, "kepure");

        let row = store.stored("Kornis").unwrap();
        assert_eq!(row.guessed_name, "Ignas");
        assert_eq!(row.gift, "kepure");
    }

    #[tokio::test]
    async fn selecting_taken_name_stays_selecting() {
        let (state, store) = test_state().await;
        store.seed(SelectionEntity::new("Kornis", "Rokas", "kojines"));

        let started = start_session(&state);
        let err = submit_selection(&state, started.session_id, name_request("Kornis"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::DuplicateSelection { ref selected_name } if selected_name == "Kornis"
        ));

        let snapshot = session_snapshot(&state, started.session_id).await.unwrap();
        assert_eq!(snapshot.step, VisibleStep::Selecting);
        assert_eq!(snapshot.selected_name, None);
    }

    #[tokio::test]
    async fn duplicate_surfacing_at_insert_is_reported_as_duplicate() {
        let (state, store) = test_state().await;
        let started = start_session(&state);
        let id = started.session_id;

        submit_selection(&state, id, name_request("Kornis")).await.unwrap();
        submit_guess(&state, id, name_request("Ignas")).await.unwrap();

        // Another session wins the race between our pre-check and insert.
        store.seed(SelectionEntity::new("Kornis", "Alanas", "salikas"));

        let err = submit_gift(
            &state,
            id,
            SubmitGiftRequest {
                choice: "kepure".into(),
                custom_text: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateSelection { .. }));

        let snapshot = session_snapshot(&state, id).await.unwrap();
        assert_eq!(snapshot.step, VisibleStep::GiftPicking);
    }

    #[tokio::test]
    async fn guess_must_differ_from_selection() {
        let (state, _store) = test_state().await;
        let started = start_session(&state);
        let id = started.session_id;

        submit_selection(&state, id, name_request("Kornis")).await.unwrap();

        let err = submit_guess(&state, id, name_request("Kornis"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let snapshot = session_snapshot(&state, id).await.unwrap();
        assert_eq!(snapshot.step, VisibleStep::Guessing);
    }

    #[tokio::test]
    async fn unknown_names_are_rejected() {
        let (state, _store) = test_state().await;
        let started = start_session(&state);

        let err = submit_selection(&state, started.session_id, name_request("Nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = submit_selection(&state, started.session_id, name_request("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn custom_gift_resolves_to_free_text() {
        let (state, store) = test_state().await;
        let started = start_session(&state);
        let id = started.session_id;

        submit_selection(&state, id, name_request("Rokas")).await.unwrap();
        submit_guess(&state, id, name_request("Karke")).await.unwrap();

        // Custom choice with blank text is user-correctable, not a transition.
        let err = submit_gift(
            &state,
            id,
            SubmitGiftRequest {
                choice: "other".into(),
                custom_text: Some("   ".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let drafted = submit_gift(
            &state,
            id,
            SubmitGiftRequest {
                choice: "other".into(),
                custom_text: Some("megzta sofos uzvalkalo kopija".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(drafted.selection.gift, "megzta sofos uzvalkalo kopija");
        assert_eq!(
            store.stored("Rokas").unwrap().gift,
            "megzta sofos uzvalkalo kopija"
        );
    }

    #[tokio::test]
    async fn unlisted_gift_choice_is_rejected() {
        let (state, _store) = test_state().await;
        let started = start_session(&state);
        let id = started.session_id;

        submit_selection(&state, id, name_request("Alanas")).await.unwrap();
        submit_guess(&state, id, name_request("Arunce")).await.unwrap();

        let err = submit_gift(
            &state,
            id,
            SubmitGiftRequest {
                choice: "ponis".into(),
                custom_text: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn failed_insert_keeps_draft_for_manual_retry() {
        let (state, store) = test_state().await;
        let started = start_session(&state);
        let id = started.session_id;

        submit_selection(&state, id, name_request("Jokubas")).await.unwrap();
        submit_guess(&state, id, name_request("Ignas")).await.unwrap();

        store.fail_inserts.store(true, Ordering::SeqCst);
        let gift = SubmitGiftRequest {
            choice: "puodelis".into(),
            custom_text: None,
        };
        let err = submit_gift(&state, id, gift).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));

        let snapshot = session_snapshot(&state, id).await.unwrap();
        assert_eq!(snapshot.step, VisibleStep::GiftPicking);
        assert_eq!(snapshot.selected_name.as_deref(), Some("Jokubas"));
        assert_eq!(snapshot.guessed_name.as_deref(), Some("Ignas"));

        // The same submit works once the store recovers.
        store.fail_inserts.store(false, Ordering::SeqCst);
        let drafted = submit_gift(
            &state,
            id,
            SubmitGiftRequest {
                choice: "puodelis".into(),
                custom_text: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(drafted.snapshot.step, VisibleStep::Drafted);
    }

    #[tokio::test]
    async fn resubmitting_an_already_persisted_gift_reaches_drafted() {
        let (state, store) = test_state().await;
        let started = start_session(&state);
        let id = started.session_id;

        submit_selection(&state, id, name_request("Kornis")).await.unwrap();
        submit_guess(&state, id, name_request("Ignas")).await.unwrap();

        // A first insert landed server-side although its response never made
        // it back to the session.
        store.seed(SelectionEntity::new("Kornis", "Ignas", "kepure"));

        let drafted = submit_gift(
            &state,
            id,
            SubmitGiftRequest {
                choice: "kepure".into(),
                custom_text: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(drafted.snapshot.step, VisibleStep::Drafted);
        assert_eq!(drafted.selection.selected_name, "Kornis");
        assert_eq!(drafted.selection.gift, "kepure");
    }

    #[tokio::test]
    async fn snapshots_do_not_touch_the_store() {
        let (state, store) = test_state().await;
        let started = start_session(&state);

        for _ in 0..5 {
            session_snapshot(&state, started.session_id).await.unwrap();
        }

        assert_eq!(store.total_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (state, _store) = test_state().await;
        let err = session_snapshot(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn degraded_mode_blocks_submits() {
        let state = AppState::new(AppConfig::default());
        let started = start_session(&state);

        let err = submit_selection(&state, started.session_id, name_request("Kornis"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }
}
