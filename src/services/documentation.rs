use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Santa draw backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::participants::list_participants,
        crate::routes::workflow::start_session,
        crate::routes::workflow::session_snapshot,
        crate::routes::workflow::submit_selection,
        crate::routes::workflow::submit_guess,
        crate::routes::workflow::submit_gift,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::participant::ParticipantDto,
            crate::dto::participant::RosterResponse,
            crate::dto::workflow::VisibleStep,
            crate::dto::workflow::WorkflowSnapshot,
            crate::dto::workflow::StartSessionResponse,
            crate::dto::workflow::SubmitNameRequest,
            crate::dto::workflow::SubmitGiftRequest,
            crate::dto::workflow::SelectionSummary,
            crate::dto::workflow::DraftedResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "roster", description = "Roster and gift option listing"),
        (name = "workflow", description = "Selection workflow sessions"),
    )
)]
pub struct ApiDoc;
