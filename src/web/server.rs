//! HTTP intake consumed by the scheduling backend.
//!
//! Two endpoints: `POST /practice` announces a practice in the configured
//! channel, `POST /waitlisted-msg` DMs a member whose waitlist spot was
//! promoted. Both answer 500 until the gateway ready hook has filled the
//! chat handle cell: the intake starts listening before the Discord session
//! is up, and the backend is expected to retry during that window.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use once_cell::sync::OnceCell;
use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::announce::{self, Practice, SIGNUP_EMOJI};
use crate::error::{BotError, Result};
use crate::messages;
use crate::notify::{self, ChatHandle};

/// Shared state for intake handlers
#[derive(Clone)]
pub struct IntakeState {
    /// Filled exactly once when the gateway session is ready.
    pub chat: Arc<OnceCell<ChatHandle>>,
    /// Announcement channel.
    pub channel_id: serenity::ChannelId,
    pub signup_capacity: u32,
    pub waitlist_capacity: u32,
}

/// Body of `POST /waitlisted-msg`.
#[derive(Debug, Deserialize)]
pub struct WaitlistedNotification {
    pub practice: Practice,
    pub discord_id: u64,
}

#[derive(Debug, Serialize)]
pub struct IntakeReply {
    pub status: &'static str,
    pub message: String,
}

impl IntakeReply {
    fn success(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
        })
    }

    fn error(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "error",
            message: message.into(),
        })
    }
}

pub fn intake_router(state: IntakeState) -> Router {
    Router::new()
        .route("/practice", post(create_practice))
        .route("/waitlisted-msg", post(waitlisted_msg))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the intake endpoint until the process exits.
pub async fn serve(state: IntakeState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| BotError::IntakeBind { port, source })?;

    info!("Intake server listening on http://{}", addr);

    axum::serve(listener, intake_router(state))
        .await
        .map_err(|e| BotError::Internal {
            message: e.to_string(),
        })
}

async fn create_practice(
    State(state): State<IntakeState>,
    Json(practice): Json<Practice>,
) -> (StatusCode, Json<IntakeReply>) {
    let Some(chat) = state.chat.get() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            IntakeReply::error("Discord client not initialized..."),
        );
    };

    let content = announce::render(&practice, state.signup_capacity, state.waitlist_capacity);
    let message = serenity::CreateMessage::new().embed(announce::to_embed(&content));

    match notify::send_to_channel(&chat.http, state.channel_id, message).await {
        Ok(posted) => {
            // Seed the reaction so members can tap it instead of hunting for
            // the emoji
            if let Err(e) = posted
                .react(
                    &chat.http,
                    serenity::ReactionType::Unicode(SIGNUP_EMOJI.to_string()),
                )
                .await
            {
                warn!("Failed to seed sign-up reaction on announcement: {}", e);
            }

            info!("Announced practice {}", practice.practice_id);
            (
                StatusCode::CREATED,
                IntakeReply::success("Practice notification sent"),
            )
        }
        Err(BotError::ChannelNotFound { .. }) => (
            StatusCode::NOT_FOUND,
            IntakeReply::error("Channel ID not found..."),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            IntakeReply::error(e.to_string()),
        ),
    }
}

async fn waitlisted_msg(
    State(state): State<IntakeState>,
    Json(notification): Json<WaitlistedNotification>,
) -> (StatusCode, Json<IntakeReply>) {
    let Some(chat) = state.chat.get() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            IntakeReply::error("Discord client not initialized..."),
        );
    };

    if notification.discord_id == 0 {
        return (StatusCode::NOT_FOUND, IntakeReply::error("User not found..."));
    }

    let user_id = serenity::UserId::new(notification.discord_id);
    let content = messages::claim_window_message(&notification.practice);

    match notify::dm_user(
        &chat.http,
        user_id,
        serenity::CreateMessage::new().content(content),
    )
    .await
    {
        Ok(()) => (
            StatusCode::CREATED,
            IntakeReply::success("Waitlist notification sent"),
        ),
        Err(BotError::UserNotFound { .. }) => (
            StatusCode::NOT_FOUND,
            IntakeReply::error("User not found..."),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            IntakeReply::error(e.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn uninitialized_state() -> IntakeState {
        IntakeState {
            chat: Arc::new(OnceCell::new()),
            channel_id: serenity::ChannelId::new(1),
            signup_capacity: 34,
            waitlist_capacity: 12,
        }
    }

    fn practice() -> Practice {
        Practice {
            practice_id: "P123".to_string(),
            start_time: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap(),
            end_time: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 16, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_practice_before_client_ready_is_500() {
        let (status, Json(reply)) =
            create_practice(State(uninitialized_state()), Json(practice())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.status, "error");
    }

    #[tokio::test]
    async fn test_waitlisted_msg_before_client_ready_is_500() {
        let notification = WaitlistedNotification {
            practice: practice(),
            discord_id: 42,
        };
        let (status, Json(reply)) =
            waitlisted_msg(State(uninitialized_state()), Json(notification)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.status, "error");
    }

    #[test]
    fn test_waitlisted_notification_body_shape() {
        let json = r#"{
            "practice": {
                "practice_id": "P123",
                "start_time": "2024-03-01T14:00:00Z",
                "end_time": "2024-03-01T16:30:00Z"
            },
            "discord_id": 42
        }"#;

        let parsed: WaitlistedNotification = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.practice.practice_id, "P123");
        assert_eq!(parsed.discord_id, 42);
    }
}
