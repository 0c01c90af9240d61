use crate::{dto::participant::RosterResponse, state::SharedState};

/// Project the configured roster and gift options for the frontend.
pub fn roster(state: &SharedState) -> RosterResponse {
    state.config().into()
}
