use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::workflow::{
        DraftedResponse, StartSessionResponse, SubmitGiftRequest, SubmitNameRequest,
        WorkflowSnapshot,
    },
    error::AppError,
    services::workflow_service,
    state::SharedState,
};

/// Routes driving the selection workflow, one session per page load.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/{id}", get(session_snapshot))
        .route("/sessions/{id}/selection", post(submit_selection))
        .route("/sessions/{id}/guess", post(submit_guess))
        .route("/sessions/{id}/gift", post(submit_gift))
}

/// Start a fresh workflow session.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "workflow",
    responses(
        (status = 200, description = "Session created", body = StartSessionResponse)
    )
)]
pub async fn start_session(State(state): State<SharedState>) -> Json<StartSessionResponse> {
    Json(workflow_service::start_session(&state))
}

/// Poll the current workflow snapshot for a session.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Workflow session identifier")),
    responses(
        (status = 200, description = "Current snapshot", body = WorkflowSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn session_snapshot(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowSnapshot>, AppError> {
    let snapshot = workflow_service::session_snapshot(&state, id).await?;
    Ok(Json(snapshot))
}

/// Submit the selected name; advances to the guessing step when it is free.
#[utoipa::path(
    post,
    path = "/sessions/{id}/selection",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Workflow session identifier")),
    request_body = SubmitNameRequest,
    responses(
        (status = 200, description = "Selection recorded", body = WorkflowSnapshot),
        (status = 409, description = "Name already selected")
    )
)]
pub async fn submit_selection(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitNameRequest>,
) -> Result<Json<WorkflowSnapshot>, AppError> {
    payload.validate()?;
    let snapshot = workflow_service::submit_selection(&state, id, payload).await?;
    Ok(Json(snapshot))
}

/// Submit the guess; advances to the gift step.
#[utoipa::path(
    post,
    path = "/sessions/{id}/guess",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Workflow session identifier")),
    request_body = SubmitNameRequest,
    responses(
        (status = 200, description = "Guess recorded", body = WorkflowSnapshot),
        (status = 400, description = "Guess equals the selected name")
    )
)]
pub async fn submit_guess(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitNameRequest>,
) -> Result<Json<WorkflowSnapshot>, AppError> {
    payload.validate()?;
    let snapshot = workflow_service::submit_guess(&state, id, payload).await?;
    Ok(Json(snapshot))
}

/// Submit the gift; persists the completed selection and drafts the workflow.
#[utoipa::path(
    post,
    path = "/sessions/{id}/gift",
    tag = "workflow",
    params(("id" = Uuid, Path, description = "Workflow session identifier")),
    request_body = SubmitGiftRequest,
    responses(
        (status = 200, description = "Selection persisted", body = DraftedResponse),
        (status = 409, description = "Name was taken between check and insert")
    )
)]
pub async fn submit_gift(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitGiftRequest>,
) -> Result<Json<DraftedResponse>, AppError> {
    payload.validate()?;
    let response = workflow_service::submit_gift(&state, id, payload).await?;
    Ok(Json(response))
}
