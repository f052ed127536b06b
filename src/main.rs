use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use once_cell::sync::OnceCell;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Discord bot announcing club practices and collecting reaction sign-ups
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Register commands per-guild instead of globally (faster for testing)
    #[arg(long)]
    guild_commands: bool,

    /// Specific guild ID to sync commands to (for testing)
    #[arg(long)]
    guild_id: Option<u64>,
}

mod announce;
mod backend;
mod commands;
mod config;
mod error;
mod events;
mod managers;
mod messages;
mod notify;
mod web;

use backend::BackendClient;
use config::BotConfig;
use events::{handle_member_add, handle_message, handle_reaction_add, handle_reaction_remove};
use managers::{create_shared_registration_manager, SharedRegistrationManager};
use notify::ChatHandle;
use web::IntakeState;

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared application state
pub struct Data {
    pub backend: Arc<BackendClient>,
    pub registration: SharedRegistrationManager,
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = handle_message(ctx, new_message, data).await {
                error!("Failed to handle message: {}", e);
            }
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = handle_member_add(ctx, new_member, data).await {
                error!("Failed to handle new member: {}", e);
            }
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            if let Err(e) = handle_reaction_add(ctx, add_reaction, data).await {
                error!("Failed to handle reaction add: {}", e);
            }
        }
        serenity::FullEvent::ReactionRemove { removed_reaction } => {
            if let Err(e) = handle_reaction_remove(ctx, removed_reaction, data).await {
                error!("Failed to handle reaction remove: {}", e);
            }
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    let config = BotConfig::from_env()?;

    let backend = Arc::new(BackendClient::new(
        config.backend_url.clone(),
        config.backend_timeout,
    )?);
    let registration = create_shared_registration_manager();
    let chat_cell: Arc<OnceCell<ChatHandle>> = Arc::new(OnceCell::new());

    // The intake accepts requests as soon as the port binds; handlers answer
    // 500 until the gateway ready hook fills the chat handle cell
    let intake_state = IntakeState {
        chat: chat_cell.clone(),
        channel_id: serenity::ChannelId::new(config.channel_id),
        signup_capacity: config.signup_capacity,
        waitlist_capacity: config.waitlist_capacity,
    };
    let intake_port = config.intake_port;
    tokio::spawn(async move {
        if let Err(e) = web::serve(intake_state, intake_port).await {
            error!("Intake server error: {}", e);
        }
    });

    // Hourly sweep of members who never answered the welcome DM
    let sweep = registration.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        interval.tick().await; // first tick completes immediately
        loop {
            interval.tick().await;
            sweep.cleanup_stale(Duration::from_secs(24 * 3600));
        }
    });

    let guild_commands = args.guild_commands;
    let target_guild_id = args.guild_id;

    // Build framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::ping(), commands::help()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' invoked by {} (ID: {})",
                        ctx.command().qualified_name,
                        ctx.author().name,
                        ctx.author().id,
                    );
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!(
                                "Error in command '{}': {}",
                                ctx.command().qualified_name,
                                error
                            );
                            let _ = ctx.say(format!("An error occurred: {}", error)).await;
                        }
                        other => {
                            error!("Framework error: {}", other);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            let chat_cell = chat_cell.clone();
            let backend = backend.clone();
            let registration = registration.clone();

            Box::pin(async move {
                info!("Bot logged in as: {}", ready.user.name);

                // Hand the HTTP handle to the intake; set once, never rewritten
                if chat_cell
                    .set(ChatHandle {
                        http: ctx.http.clone(),
                    })
                    .is_err()
                {
                    warn!("Chat handle was already initialized");
                }

                if guild_commands {
                    let guilds: Vec<serenity::GuildId> = match target_guild_id {
                        Some(gid) => vec![serenity::GuildId::new(gid)],
                        None => ready.guilds.iter().map(|g| g.id).collect(),
                    };
                    for guild_id in guilds {
                        info!("Registering commands to guild: {}", guild_id);
                        if let Err(e) = poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            guild_id,
                        )
                        .await
                        {
                            error!("Failed to register commands for guild {}: {}", guild_id, e);
                        }
                    }
                } else {
                    info!("Registering commands globally (takes up to 1 hour to propagate)");
                    if let Err(e) =
                        poise::builtins::register_globally(ctx, &framework.options().commands).await
                    {
                        error!("Failed to register commands globally: {}", e);
                    }
                }

                Ok(Data {
                    backend,
                    registration,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    client.start().await?;
    warn!("Bot ended.");

    Ok(())
}
