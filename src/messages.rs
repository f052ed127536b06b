// src/messages.rs

use crate::announce::{self, Practice};

pub fn welcome_title() -> &'static str {
    "Welcome to the Server!"
}

pub fn welcome_description() -> String {
    "👋 **Welcome aboard!**\n\n\
    Before you can sign up for practices, we need the email address you \
    registered with the club."
        .to_string()
}

pub fn welcome_instructions() -> String {
    "📨 **Simply reply to this message with your email address.**\n\n\
    If you run into trouble, please contact an administrator in the server."
        .to_string()
}

pub fn invalid_email_message() -> &'static str {
    "❌ Invalid email format. Please provide a valid email address."
}

pub fn registration_success_title() -> &'static str {
    "Registration Complete"
}

pub fn registration_failed_title() -> &'static str {
    "Registration Failed"
}

pub fn registration_failed_message(detail: &str) -> String {
    format!("Sorry, there was an error: {}", detail)
}

/// Error relayed when a sign-up attempt fails. The prefix distinguishes it
/// from the backend's own confirmation messages.
pub fn signup_error_message(detail: &str) -> String {
    format!("An error occurred... {}", detail)
}

pub fn cancellation_title() -> &'static str {
    "Practice Registration Cancelled"
}

pub fn cancellation_error_title() -> &'static str {
    "Error Cancelling Registration"
}

pub fn cancellation_error_message(detail: &str) -> String {
    format!("An error occurred: {}", detail)
}

/// DM sent when a waitlisted member is moved onto the roster.
pub fn claim_window_message(practice: &Practice) -> String {
    format!(
        "🎉 **A spot opened up!**\n\n\
        You've been moved off the waitlist for practice on **{}** ({}).\n\n\
        Your spot is confirmed. If you can no longer attend, remove your {} \
        reaction from the announcement before the roster locks (one hour \
        before start).",
        announce::format_date(&practice.start_time),
        announce::format_time_range(practice),
        announce::SIGNUP_EMOJI,
    )
}
