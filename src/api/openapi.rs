use super::handlers::{events, health, verify};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "rolegate", description = "Email-verified role assignment"),
    paths(
        health::ping,
        health::health,
        verify::verify,
        events::events,
    ),
    components(schemas(health::Health, crate::discord::ChatEvent)),
    tags(
        (name = "health", description = "Liveness and build information"),
        (name = "verify", description = "Redemption of emailed verification links"),
        (name = "events", description = "Inbound chat events"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
