//! Client for the scheduling backend.
//!
//! Every operation is a single outbound HTTP call with a bounded timeout and
//! no automatic retry. Backend-side failures are values, not faults: callers
//! get a tagged outcome and must handle every variant.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BotError, Result};

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    discord_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PracticeActionRequest<'a> {
    practice_id: &'a str,
    discord_id: &'a str,
}

/// Body the backend answers with on `/practice/signup` and
/// `/practice/unregister`.
#[derive(Debug, Deserialize)]
struct SignupResponse {
    success: bool,
    message: String,
    #[serde(default)]
    on_waitlist: bool,
}

/// Outcome of a sign-up attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// A roster spot was granted; the message is relayed to the user.
    Accepted(String),
    /// The roster was full, the user landed on the waitlist.
    Waitlisted(String),
    /// The backend refused the sign-up (locked, full, unknown user, ...).
    Rejected(String),
    /// The call never completed (timeout, connection refused, ...).
    TransportError(String),
}

/// Outcome of a register or unregister call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success(String),
    Rejected(String),
    TransportError(String),
}

/// Thin wrapper over the backend's REST interface.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Associate an email address with a Discord account.
    pub async fn register(&self, discord_id: &str, email: &str) -> CallOutcome {
        let url = format!("{}/register", self.base_url);
        debug!("POST {} for user {}", url, discord_id);

        let body = RegisterRequest { email, discord_id };
        match self.http.post(&url).json(&body).send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(text) => classify_register(status, &text),
                    Err(e) => CallOutcome::TransportError(transport_detail(&e)),
                }
            }
            Err(e) => CallOutcome::TransportError(transport_detail(&e)),
        }
    }

    /// Sign a user up for a practice.
    pub async fn sign_up(&self, practice_id: &str, discord_id: &str) -> SignupOutcome {
        let url = format!("{}/practice/signup", self.base_url);
        debug!("POST {} for user {} practice {}", url, discord_id, practice_id);

        let body = PracticeActionRequest {
            practice_id,
            discord_id,
        };
        match self.http.post(&url).json(&body).send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(text) => classify_signup(status, &text),
                    Err(e) => SignupOutcome::TransportError(transport_detail(&e)),
                }
            }
            Err(e) => SignupOutcome::TransportError(transport_detail(&e)),
        }
    }

    /// Remove a user from a practice roster or waitlist.
    pub async fn unregister(&self, practice_id: &str, discord_id: &str) -> CallOutcome {
        let url = format!("{}/practice/unregister", self.base_url);
        debug!("DELETE {} for user {} practice {}", url, discord_id, practice_id);

        let body = PracticeActionRequest {
            practice_id,
            discord_id,
        };
        match self.http.delete(&url).json(&body).send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(text) => classify_unregister(status, &text),
                    Err(e) => CallOutcome::TransportError(transport_detail(&e)),
                }
            }
            Err(e) => CallOutcome::TransportError(transport_detail(&e)),
        }
    }
}

fn classify_register(status: StatusCode, body: &str) -> CallOutcome {
    if status == StatusCode::OK {
        CallOutcome::Success(unquote(body))
    } else {
        CallOutcome::Rejected(unquote(body))
    }
}

fn classify_signup(status: StatusCode, body: &str) -> SignupOutcome {
    if status != StatusCode::OK {
        return SignupOutcome::Rejected(unquote(body));
    }

    match serde_json::from_str::<SignupResponse>(body) {
        Ok(reply) => match (reply.success, reply.on_waitlist) {
            (true, false) => SignupOutcome::Accepted(reply.message),
            (true, true) => SignupOutcome::Waitlisted(reply.message),
            (false, _) => SignupOutcome::Rejected(reply.message),
        },
        // 200 with a bare string body still means the sign-up went through
        Err(_) => SignupOutcome::Accepted(unquote(body)),
    }
}

fn classify_unregister(status: StatusCode, body: &str) -> CallOutcome {
    if status != StatusCode::OK {
        return CallOutcome::Rejected(unquote(body));
    }

    match serde_json::from_str::<SignupResponse>(body) {
        Ok(reply) if reply.success => CallOutcome::Success(reply.message),
        Ok(reply) => CallOutcome::Rejected(reply.message),
        Err(_) => CallOutcome::Success(unquote(body)),
    }
}

/// The backend serializes plain-string replies as JSON strings.
fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}

fn transport_detail(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("Backend request timed out: {err}")
    } else {
        format!("Failed to connect to backend: {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"Signed up on main list\""), "Signed up on main list");
        assert_eq!(unquote("  \"trimmed\"\n"), "trimmed");
        assert_eq!(unquote("no quotes"), "no quotes");
        assert_eq!(unquote("\"unbalanced"), "\"unbalanced");
    }

    #[test]
    fn test_signup_accepted() {
        let body = r#"{"success": true, "message": "Signed up on main list", "on_waitlist": false}"#;
        assert_eq!(
            classify_signup(StatusCode::OK, body),
            SignupOutcome::Accepted("Signed up on main list".to_string())
        );
    }

    #[test]
    fn test_signup_waitlisted() {
        let body = r#"{"success": true, "message": "Signed up for waitlist", "on_waitlist": true}"#;
        assert_eq!(
            classify_signup(StatusCode::OK, body),
            SignupOutcome::Waitlisted("Signed up for waitlist".to_string())
        );
    }

    #[test]
    fn test_signup_rejected_by_backend() {
        let body = r#"{"success": false, "message": "Practice is locked until one hour before start time", "on_waitlist": false}"#;
        assert_eq!(
            classify_signup(StatusCode::OK, body),
            SignupOutcome::Rejected(
                "Practice is locked until one hour before start time".to_string()
            )
        );
    }

    #[test]
    fn test_signup_non_200_is_rejected() {
        assert_eq!(
            classify_signup(StatusCode::INTERNAL_SERVER_ERROR, "\"Practice not found\""),
            SignupOutcome::Rejected("Practice not found".to_string())
        );
    }

    #[test]
    fn test_signup_bare_string_body() {
        assert_eq!(
            classify_signup(StatusCode::OK, "\"Signed up on main list\""),
            SignupOutcome::Accepted("Signed up on main list".to_string())
        );
    }

    #[test]
    fn test_register_outcomes() {
        assert_eq!(
            classify_register(StatusCode::OK, "\"Successfully registered discord id to user\""),
            CallOutcome::Success("Successfully registered discord id to user".to_string())
        );
        assert_eq!(
            classify_register(StatusCode::BAD_REQUEST, "User not found with given email"),
            CallOutcome::Rejected("User not found with given email".to_string())
        );
    }

    #[test]
    fn test_unregister_not_registered() {
        let body = r#"{"success": false, "message": "User not registered for this practice", "on_waitlist": false}"#;
        assert_eq!(
            classify_unregister(StatusCode::OK, body),
            CallOutcome::Rejected("User not registered for this practice".to_string())
        );
    }

    #[test]
    fn test_unregister_success() {
        let body = r#"{"success": true, "message": "Successfully unregistered from practice", "on_waitlist": false}"#;
        assert_eq!(
            classify_unregister(StatusCode::OK, body),
            CallOutcome::Success("Successfully unregistered from practice".to_string())
        );
    }
}
