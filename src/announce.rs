//! Practice announcement rendering.
//!
//! The announcement embed doubles as the sign-up correlation record: it
//! carries exactly one `practice_id` field, and reaction handlers recover the
//! identifier from the posted message on every event instead of keeping a
//! message-to-practice table.

use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};

/// Emoji members react with to sign up.
pub const SIGNUP_EMOJI: &str = "✅";

/// Name of the embed field carrying the correlation identifier.
pub const PRACTICE_ID_FIELD: &str = "practice_id";

/// A scheduled practice as delivered by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Practice {
    pub practice_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Rendered announcement content, independent of the chat SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementContent {
    pub title: String,
    pub description: String,
    /// (name, value, inline)
    pub fields: Vec<(String, String, bool)>,
}

/// Build the announcement for a practice. Deterministic for a given practice
/// and capacity figures; no side effects.
pub fn render(practice: &Practice, signup_capacity: u32, waitlist_capacity: u32) -> AnnouncementContent {
    let date_line = format_date(&practice.start_time);
    let time_range = format_time_range(practice);
    let duration = format_duration(practice);

    AnnouncementContent {
        title: "🚣 Practice Sign-up Open!".to_string(),
        description: format!("Practice on **{}** is open for sign-ups!", date_line),
        fields: vec![
            ("Time".to_string(), time_range, true),
            ("Duration".to_string(), duration, true),
            (
                "Capacity".to_string(),
                format!("{} roster spots, {} waitlist spots", signup_capacity, waitlist_capacity),
                true,
            ),
            (
                "How to sign up".to_string(),
                format!(
                    "React with {} to sign up. Remove your reaction to cancel.\n\
                    You'll get a DM confirming your spot or waitlist position.",
                    SIGNUP_EMOJI
                ),
                false,
            ),
            (PRACTICE_ID_FIELD.to_string(), practice.practice_id.clone(), false),
        ],
    }
}

/// Turn rendered content into a Discord embed.
pub fn to_embed(content: &AnnouncementContent) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(&content.title)
        .description(&content.description)
        .color(0x5865F2);

    for (name, value, inline) in &content.fields {
        embed = embed.field(name, value, *inline);
    }

    embed
}

/// Recover the practice identifier from an announcement's embed fields.
///
/// Announcements carry exactly one `practice_id` field; zero or multiple
/// matches mean the message is not an announcement and yield `None`.
pub fn practice_id_from_fields<'a, I>(fields: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut matches = fields
        .into_iter()
        .filter(|(name, _)| *name == PRACTICE_ID_FIELD)
        .map(|(_, value)| value);

    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.to_string())
}

/// e.g. "Friday, March 1, 2024"
pub fn format_date(time: &DateTime<Utc>) -> String {
    time.format("%A, %B %-d, %Y").to_string()
}

/// e.g. "02:00 PM - 04:30 PM"
pub fn format_time_range(practice: &Practice) -> String {
    format!(
        "{} - {}",
        practice.start_time.format("%I:%M %p"),
        practice.end_time.format("%I:%M %p")
    )
}

/// Duration in hours to one decimal, e.g. "2.5 hours".
pub fn format_duration(practice: &Practice) -> String {
    let minutes = (practice.end_time - practice.start_time).num_minutes();
    format!("{:.1} hours", minutes as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn practice(start: (u32, u32), end: (u32, u32)) -> Practice {
        Practice {
            practice_id: "P123".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 3, 1, start.0, start.1, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 3, 1, end.0, end.1, 0).unwrap(),
        }
    }

    #[test]
    fn test_time_range_and_duration() {
        let p = practice((14, 0), (16, 30));
        assert_eq!(format_time_range(&p), "02:00 PM - 04:30 PM");
        assert_eq!(format_duration(&p), "2.5 hours");
    }

    #[test]
    fn test_date_line() {
        let p = practice((14, 0), (16, 30));
        assert_eq!(format_date(&p.start_time), "Friday, March 1, 2024");
    }

    #[test]
    fn test_whole_hour_duration() {
        let p = practice((9, 0), (10, 0));
        assert_eq!(format_duration(&p), "1.0 hours");
    }

    #[test]
    fn test_render_carries_exactly_one_practice_id_field() {
        let content = render(&practice((14, 0), (16, 30)), 34, 12);
        let id_fields: Vec<_> = content
            .fields
            .iter()
            .filter(|(name, _, _)| name == PRACTICE_ID_FIELD)
            .collect();
        assert_eq!(id_fields.len(), 1);
        assert_eq!(id_fields[0].1, "P123");
    }

    #[test]
    fn test_render_is_deterministic() {
        let p = practice((14, 0), (16, 30));
        assert_eq!(render(&p, 34, 12), render(&p, 34, 12));
    }

    #[test]
    fn test_practice_id_recovery() {
        let fields = vec![("Time", "02:00 PM - 04:30 PM"), ("practice_id", "P123")];
        assert_eq!(practice_id_from_fields(fields), Some("P123".to_string()));
    }

    #[test]
    fn test_practice_id_missing_is_none() {
        let fields = vec![("Time", "02:00 PM - 04:30 PM"), ("Duration", "2.5 hours")];
        assert_eq!(practice_id_from_fields(fields), None);
        assert_eq!(practice_id_from_fields(Vec::<(&str, &str)>::new()), None);
    }

    #[test]
    fn test_practice_id_ambiguous_is_none() {
        let fields = vec![("practice_id", "P123"), ("practice_id", "P456")];
        assert_eq!(practice_id_from_fields(fields), None);
    }
}
