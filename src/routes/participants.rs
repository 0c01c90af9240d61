use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::participant::RosterResponse, services::roster_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/participants",
    tag = "roster",
    responses((status = 200, description = "Configured roster and gift options", body = RosterResponse))
)]
/// Return the roster the frontend renders on the selecting step.
pub async fn list_participants(State(state): State<SharedState>) -> Json<RosterResponse> {
    Json(roster_service::roster(&state))
}

/// Configure the roster routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/participants", get(list_participants))
}
