/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Read-only roster projection.
pub mod roster_service;
/// TTL eviction of idle workflow sessions.
pub mod session_reaper;
/// Storage connection supervision with reconnect and degraded mode.
pub mod storage_supervisor;
/// Core workflow logic: selection, guess, and gift submission.
pub mod workflow_service;
