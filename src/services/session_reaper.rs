use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::state::SharedState;

/// How long a session may sit untouched before it is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically drop workflow sessions whose page was abandoned.
///
/// A drafted session holds nothing the store does not already have, and an
/// abandoned mid-flow session holds nothing persisted at all, so eviction
/// never loses data.
pub async fn run(state: SharedState, ttl: Duration) {
    loop {
        sleep(POLL_INTERVAL).await;

        let removed = state.remove_idle_sessions(ttl);
        if removed > 0 {
            info!(removed, remaining = state.session_count(), "reaped idle sessions");
        }
    }
}
