use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scoreboard backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::api::get_data,
        crate::routes::api::get_logos,
        crate::routes::api::update_data,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::scoreboard::UpdateResponse,
            crate::state::scoreboard::MatchState,
            crate::state::scoreboard::StatePatch,
            crate::config::LogoOption,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scoreboard", description = "Live scoreboard read and update endpoints"),
    )
)]
pub struct ApiDoc;
