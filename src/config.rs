use std::time::Duration;

use crate::error::{BotError, Result};

/// Default backend base URL inside the compose network.
const DEFAULT_BACKEND_URL: &str = "http://backend:8000";

/// Runtime configuration, loaded once from the environment at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Discord bot token.
    pub discord_token: String,
    /// Channel that receives practice announcements.
    pub channel_id: u64,
    /// Base URL of the scheduling backend.
    pub backend_url: String,
    /// Timeout applied to every outbound backend call.
    pub backend_timeout: Duration,
    /// Port the HTTP intake listens on.
    pub intake_port: u16,
    /// Roster size shown in announcements.
    pub signup_capacity: u32,
    /// Waitlist size shown in announcements.
    pub waitlist_capacity: u32,
}

impl BotConfig {
    /// Read configuration from environment variables.
    ///
    /// `DISCORD_TOKEN` and `CHANNEL_ID` are required; everything else has a
    /// default. Errors here are fatal, the process must not start serving.
    pub fn from_env() -> Result<Self> {
        let discord_token = require_env("DISCORD_TOKEN")?;
        let channel_id_raw = require_env("CHANNEL_ID")?;
        let channel_id = match channel_id_raw.parse::<u64>() {
            Ok(id) if id != 0 => id,
            _ => {
                return Err(BotError::InvalidEnv {
                    name: "CHANNEL_ID".to_string(),
                    value: channel_id_raw,
                })
            }
        };

        Ok(Self {
            discord_token,
            channel_id,
            backend_url: std::env::var("BACKEND_API_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            backend_timeout: Duration::from_secs(
                parse_env_or("BACKEND_TIMEOUT_SECS", 5u64),
            ),
            intake_port: parse_env_or("INTAKE_PORT", 3001u16),
            signup_capacity: parse_env_or("SIGNUP_CAPACITY", 34u32),
            waitlist_capacity: parse_env_or("WAITLIST_CAPACITY", 12u32),
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(BotError::MissingEnv {
            name: name.to_string(),
        }),
    }
}

fn parse_env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
