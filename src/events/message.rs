use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

use crate::backend::CallOutcome;
use crate::managers::is_valid_email;
use crate::{messages, Data, Error};

/// Handle incoming messages
pub async fn handle_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    // Ignore bot messages
    if msg.author.bot {
        return Ok(());
    }

    // DMs may be part of the email registration flow
    if msg.guild_id.is_none() {
        return handle_dm_message(ctx, msg, data).await;
    }

    Ok(())
}

/// Handle DM messages (email collection)
async fn handle_dm_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    let user_id = msg.author.id;

    if !data.registration.is_waiting(user_id) {
        return Ok(());
    }

    let email = msg.content.trim();
    debug!("Processing email reply from {}", msg.author.name);

    if !is_valid_email(email) {
        // Pending state survives so the user can just try again
        msg.channel_id
            .say(&ctx.http, messages::invalid_email_message())
            .await?;
        return Ok(());
    }

    match data.backend.register(&user_id.to_string(), email).await {
        CallOutcome::Success(message) => {
            let embed = serenity::CreateEmbed::new()
                .title(messages::registration_success_title())
                .description(message)
                .color(0x2ECC71);
            msg.channel_id
                .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
                .await?;

            data.registration.complete(user_id);
            info!("User {} completed email registration", user_id);
        }
        CallOutcome::Rejected(detail) | CallOutcome::TransportError(detail) => {
            error!("Registration failed for {}: {}", user_id, detail);

            let embed = serenity::CreateEmbed::new()
                .title(messages::registration_failed_title())
                .description(messages::registration_failed_message(&detail))
                .color(0xE74C3C);
            msg.channel_id
                .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
                .await?;
        }
    }

    Ok(())
}
