//! Reaction-driven sign-up tracking.
//!
//! No sign-up state lives in the bot. Each reaction event re-derives its
//! correlation key by fetching the message and reading the `practice_id`
//! embed field, then issues exactly one backend call and relays the result
//! to the reacting user over DM.

use poise::serenity_prelude as serenity;
use tracing::{debug, info, warn};

use crate::announce::{practice_id_from_fields, SIGNUP_EMOJI};
use crate::backend::{CallOutcome, SignupOutcome};
use crate::{messages, notify, Data, Error};

/// Handle a reaction added to a message
pub async fn handle_reaction_add(
    ctx: &serenity::Context,
    reaction: &serenity::Reaction,
    data: &Data,
) -> Result<(), Error> {
    let Some((practice_id, user_id)) = announcement_target(ctx, reaction).await else {
        return Ok(());
    };

    info!("User {} reacted to practice {}", user_id, practice_id);

    let outcome = data.backend.sign_up(&practice_id, &user_id.to_string()).await;
    if let SignupOutcome::Rejected(detail) | SignupOutcome::TransportError(detail) = &outcome {
        warn!(
            "Sign-up failed for {} on practice {}: {}",
            user_id, practice_id, detail
        );
    }

    let reply = signup_reply(&outcome);
    if let Err(e) = notify::dm_user(
        &ctx.http,
        user_id,
        serenity::CreateMessage::new().content(reply),
    )
    .await
    {
        warn!("Failed to notify {} about sign-up result: {}", user_id, e);
    }

    Ok(())
}

/// Handle a reaction removed from a message
pub async fn handle_reaction_remove(
    ctx: &serenity::Context,
    reaction: &serenity::Reaction,
    data: &Data,
) -> Result<(), Error> {
    let Some((practice_id, user_id)) = announcement_target(ctx, reaction).await else {
        return Ok(());
    };

    info!(
        "User {} removed reaction from practice {}",
        user_id, practice_id
    );

    let embed = match data.backend.unregister(&practice_id, &user_id.to_string()).await {
        CallOutcome::Success(message) => serenity::CreateEmbed::new()
            .title(messages::cancellation_title())
            .description(message)
            .color(0xE67E22),
        CallOutcome::Rejected(detail) | CallOutcome::TransportError(detail) => {
            warn!(
                "Unregister failed for {} on practice {}: {}",
                user_id, practice_id, detail
            );
            serenity::CreateEmbed::new()
                .title(messages::cancellation_error_title())
                .description(messages::cancellation_error_message(&detail))
                .color(0xE74C3C)
        }
    };

    if let Err(e) = notify::dm_user(
        &ctx.http,
        user_id,
        serenity::CreateMessage::new().embed(embed),
    )
    .await
    {
        warn!("Failed to notify {} about cancellation: {}", user_id, e);
    }

    Ok(())
}

/// Resolve a reaction event to `(practice_id, reacting user)`.
///
/// Returns `None` for anything that is not a member's sign-up emoji on a
/// bot-authored announcement; every `None` path makes zero backend calls.
async fn announcement_target(
    ctx: &serenity::Context,
    reaction: &serenity::Reaction,
) -> Option<(String, serenity::UserId)> {
    if !is_signup_emoji(&reaction.emoji) {
        return None;
    }

    let user_id = reaction.user_id?;
    let bot_id = ctx.cache.current_user().id;
    if user_id == bot_id {
        return None;
    }

    // Unresolvable channel or unfetchable message: no-op
    let message = match reaction
        .channel_id
        .message(&ctx.http, reaction.message_id)
        .await
    {
        Ok(message) => message,
        Err(e) => {
            debug!(
                "Ignoring reaction on unfetchable message {}: {}",
                reaction.message_id, e
            );
            return None;
        }
    };

    if message.author.id != bot_id {
        return None;
    }

    let fields = message
        .embeds
        .iter()
        .flat_map(|embed| embed.fields.iter())
        .map(|field| (field.name.as_str(), field.value.as_str()));

    let practice_id = practice_id_from_fields(fields)?;
    Some((practice_id, user_id))
}

fn is_signup_emoji(emoji: &serenity::ReactionType) -> bool {
    matches!(emoji, serenity::ReactionType::Unicode(name) if name == SIGNUP_EMOJI)
}

/// What to DM the reacting user for a sign-up outcome.
fn signup_reply(outcome: &SignupOutcome) -> String {
    match outcome {
        SignupOutcome::Accepted(message) | SignupOutcome::Waitlisted(message) => message.clone(),
        SignupOutcome::Rejected(detail) | SignupOutcome::TransportError(detail) => {
            messages::signup_error_message(detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_emoji_guard() {
        assert!(is_signup_emoji(&serenity::ReactionType::Unicode(
            SIGNUP_EMOJI.to_string()
        )));
        assert!(!is_signup_emoji(&serenity::ReactionType::Unicode(
            "👍".to_string()
        )));
        assert!(!is_signup_emoji(&serenity::ReactionType::Unicode(
            String::new()
        )));
    }

    #[test]
    fn test_accepted_and_waitlisted_relay_backend_message() {
        let accepted = SignupOutcome::Accepted("Signed up on main list".to_string());
        assert_eq!(signup_reply(&accepted), "Signed up on main list");

        let waitlisted = SignupOutcome::Waitlisted("Signed up for waitlist".to_string());
        assert_eq!(signup_reply(&waitlisted), "Signed up for waitlist");
    }

    #[test]
    fn test_failures_get_error_prefix() {
        let rejected = SignupOutcome::Rejected("Practice not found".to_string());
        let reply = signup_reply(&rejected);
        assert!(reply.starts_with("An error occurred"));
        assert!(reply.contains("Practice not found"));

        let transport = SignupOutcome::TransportError("connection refused".to_string());
        assert!(signup_reply(&transport).starts_with("An error occurred"));
    }
}
