use poise::serenity_prelude as serenity;
use tracing::info;

use crate::{Context, Error};

/// Check if the bot is running
#[poise::command(prefix_command, slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    info!("Ping command called by {}", ctx.author().name);
    ctx.send(
        poise::CreateReply::default()
            .content("Pong! 🛶 The bot is up.")
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Show help information
#[poise::command(prefix_command, slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("Bot Commands")
        .description("Here's how practice sign-ups work:")
        .field("/ping", "Check if the bot is running", false)
        .field(
            "Signing up",
            "React with ✅ on a practice announcement to sign up. Remove the \
            reaction to cancel. Results arrive by DM.",
            false,
        )
        .field(
            "Registration",
            "When you join the server, the bot DMs you for your club email. \
            Reply with it once and you're set.",
            false,
        )
        .color(0x3498db);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
