use crate::{cli::globals::GlobalArgs, discord::ChatEvent};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::mpsc::{Sender, error::TrySendError};
use tracing::{debug, error, instrument, warn};

fn authorized(globals: &GlobalArgs, headers: &HeaderMap) -> bool {
    let Some(expected) = &globals.events_token else {
        return true;
    };

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| {
            token
                .as_bytes()
                .ct_eq(expected.expose_secret().as_bytes())
                .into()
        })
}

#[utoipa::path(
    post,
    path = "/events",
    request_body = ChatEvent,
    responses (
        (status = 202, description = "Event queued for dispatch"),
        (status = 400, description = "Missing or invalid event payload"),
        (status = 401, description = "Missing or wrong bearer token"),
        (status = 503, description = "Dispatcher queue is full or closed"),
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn events(
    headers: HeaderMap,
    Extension(globals): Extension<Arc<GlobalArgs>>,
    Extension(queue): Extension<Sender<ChatEvent>>,
    payload: Option<Json<ChatEvent>>,
) -> impl IntoResponse {
    if !authorized(&globals, &headers) {
        warn!("Rejected event with missing or wrong token");
        return (StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let Some(Json(event)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload");
    };

    match queue.try_send(event) {
        Ok(()) => {
            debug!("event queued");
            (StatusCode::ACCEPTED, "Accepted")
        }
        Err(TrySendError::Full(_)) => {
            warn!("Event queue full");
            (StatusCode::SERVICE_UNAVAILABLE, "Busy")
        }
        Err(TrySendError::Closed(_)) => {
            error!("Event queue closed");
            (StatusCode::SERVICE_UNAVAILABLE, "Unavailable")
        }
    }
}
