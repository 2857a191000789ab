use super::Claim;
use crate::{Error, discord::ChatRoom};
use tracing::{info, instrument, warn};

/// Reaction left on the original request once the role is granted.
pub const ACK_EMOJI: &str = "🥳";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redeemed {
    /// Whether the acknowledgement reaction landed. Cosmetic only.
    pub reacted: bool,
}

/// Apply a verified claim: nickname, then role, then reaction.
///
/// Steps are not transactional; a nickname that was set stays set if the role
/// grant fails.
///
/// # Errors
/// Returns [`Error::Action`] if the nickname or role call fails. A failed
/// reaction is logged and reported through [`Redeemed::reacted`].
#[instrument(skip(room, claim), fields(subject_id = %claim.subject_id, role_id = %claim.role_id))]
pub async fn redeem(
    room: &dyn ChatRoom,
    guild_id: &str,
    channel_id: &str,
    claim: &Claim,
) -> Result<Redeemed, Error> {
    room.set_nickname(guild_id, &claim.subject_id, &claim.display_name)
        .await?;

    room.add_role(guild_id, &claim.subject_id, &claim.role_id)
        .await?;

    let reacted = match room
        .add_reaction(channel_id, &claim.message_ref, ACK_EMOJI)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!("Cannot react to message {}: {}", claim.message_ref, e);
            false
        }
    };

    info!("claim redeemed");

    Ok(Redeemed { reacted })
}
