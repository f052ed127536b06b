use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    // Configuration errors
    #[error("Missing environment variable: {name}")]
    MissingEnv { name: String },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },

    // Discord errors
    #[error("Discord API error: {message}")]
    Discord { message: String },

    #[error("Channel not found: {id}")]
    ChannelNotFound { id: u64 },

    #[error("User not found: {id}")]
    UserNotFound { id: u64 },

    // Intake server errors
    #[error("Failed to bind intake listener on port {port}: {source}")]
    IntakeBind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<serenity::Error> for BotError {
    fn from(err: serenity::Error) -> Self {
        BotError::Discord {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

use poise::serenity_prelude as serenity;
