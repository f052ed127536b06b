//! Outbound notification dispatch.
//!
//! Resolution failures (unknown channel or user) surface as typed errors so
//! callers can answer 404 or skip; delivery failures to a resolved user
//! (blocked DMs and the like) are logged and swallowed, never propagated to
//! the triggering flow.

use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::warn;

use crate::error::{BotError, Result};

/// Handle to the Discord HTTP API, constructed once the gateway session is up
/// and injected into the intake server.
#[derive(Clone)]
pub struct ChatHandle {
    pub http: Arc<serenity::Http>,
}

/// Post a message to a channel, returning the posted message.
pub async fn send_to_channel(
    http: &Arc<serenity::Http>,
    channel_id: serenity::ChannelId,
    message: serenity::CreateMessage,
) -> Result<serenity::Message> {
    // Resolve first so callers can distinguish "no such channel" from a
    // failed send.
    if http.get_channel(channel_id).await.is_err() {
        return Err(BotError::ChannelNotFound {
            id: channel_id.get(),
        });
    }

    channel_id
        .send_message(http, message)
        .await
        .map_err(Into::into)
}

/// Send a direct message to a user.
///
/// Returns `UserNotFound` when the user id does not resolve; a resolved user
/// whose DM fails to deliver is logged and reported as success.
pub async fn dm_user(
    http: &Arc<serenity::Http>,
    user_id: serenity::UserId,
    message: serenity::CreateMessage,
) -> Result<()> {
    let user = user_id
        .to_user(http)
        .await
        .map_err(|_| BotError::UserNotFound { id: user_id.get() })?;

    if let Err(e) = user.direct_message(http, message).await {
        warn!("Couldn't send direct message to {}: {}", user.name, e);
    }

    Ok(())
}
