use crate::{
    Error,
    cli::globals::GlobalArgs,
    discord::ChatRoom,
    token::{self, Redeemed},
};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Map a redemption failure to a status the redeemer can act on.
#[must_use]
pub const fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Decode => StatusCode::BAD_REQUEST,
        Error::MalformedClaim(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Expired => StatusCode::GONE,
        Error::Action { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

const fn diagnostic(error: &Error) -> &'static str {
    match error {
        Error::Decode => "Cannot decrypt",
        Error::MalformedClaim(_) => "Invalid token payload",
        Error::Expired => "Token expired",
        Error::Action { .. } => "Cannot modify user's role",
        _ => "Internal error",
    }
}

#[utoipa::path(
    get,
    path = "/verify/{secret}",
    params(
        ("secret" = String, Path, description = "Redemption string from the verification email"),
    ),
    responses (
        (status = 200, description = "Nickname and role applied", body = String, content_type = "text/plain"),
        (status = 400, description = "Redemption string cannot be decrypted"),
        (status = 410, description = "Redemption string expired"),
        (status = 422, description = "Decrypted payload is not a valid claim"),
        (status = 502, description = "Chat room rejected the nickname or role change"),
    ),
    tag = "verify"
)]
#[instrument(skip_all)]
pub async fn verify(
    Path(secret): Path<String>,
    Extension(globals): Extension<Arc<GlobalArgs>>,
    Extension(room): Extension<Arc<dyn ChatRoom>>,
) -> impl IntoResponse {
    let claim = match token::verify(&globals.key, &secret, Utc::now()) {
        Ok(claim) => claim,
        Err(e) => {
            error!(error.kind = e.kind(), "Invalid redemption string: {e}");
            return (status_for(&e), diagnostic(&e));
        }
    };

    match token::redeem(room.as_ref(), &globals.guild_id, &globals.channel_id, &claim).await {
        Ok(Redeemed { reacted: true }) => {
            info!(subject_id = %claim.subject_id, "member verified");
            (StatusCode::OK, "Welcome, please check your discord!")
        }
        Ok(Redeemed { reacted: false }) => (
            StatusCode::OK,
            "Cannot react to message, but you are good to go!",
        ),
        Err(e) => {
            error!(error.kind = e.kind(), "Redemption failed: {e}");
            (status_for(&e), diagnostic(&e))
        }
    }
}
