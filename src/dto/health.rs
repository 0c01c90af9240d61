use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether the storage backend is currently unreachable.
    pub storage_degraded: bool,
    /// Number of live workflow sessions.
    pub sessions: usize,
}

impl HealthResponse {
    /// Health payload for a fully operational backend.
    pub fn ok(sessions: usize) -> Self {
        Self {
            status: "ok".to_string(),
            storage_degraded: false,
            sessions,
        }
    }

    /// Health payload while the storage backend is unreachable.
    pub fn degraded(sessions: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            storage_degraded: true,
            sessions,
        }
    }
}
