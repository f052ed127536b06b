use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::{messages, Data, Error};

/// Handle when a new member joins the guild
pub async fn handle_member_add(
    ctx: &serenity::Context,
    new_member: &serenity::Member,
    data: &Data,
) -> Result<(), Error> {
    info!(
        "New member joined: {} in guild {}",
        new_member.user.name, new_member.guild_id
    );

    let embed = serenity::CreateEmbed::new()
        .title(messages::welcome_title())
        .description(messages::welcome_description())
        .field("Instructions", messages::welcome_instructions(), false)
        .color(0xE74C3C);

    let dm_channel = match new_member.user.create_dm_channel(&ctx.http).await {
        Ok(channel) => channel,
        Err(e) => {
            warn!(
                "Couldn't open DM channel for {}: {}",
                new_member.user.name, e
            );
            return Ok(());
        }
    };

    match dm_channel
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await
    {
        // Only members who actually got the prompt are marked pending
        Ok(_) => data.registration.begin_waiting(new_member.user.id),
        Err(e) => {
            warn!(
                "Couldn't send welcome DM to {}: {}",
                new_member.user.name, e
            );
        }
    }

    Ok(())
}
