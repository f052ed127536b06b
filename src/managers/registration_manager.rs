use dashmap::DashMap;
use once_cell::sync::Lazy;
use poise::serenity_prelude::UserId;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Conventional email shape: local part, one `@`, dotted domain, alphabetic
/// TLD of at least two letters. No DNS or deliverability checks.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Pending registration state
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub started_at: u64,
}

/// Tracks members who joined but have not yet supplied an email address.
///
/// Entries live from the welcome DM until registration succeeds. The map has
/// no natural upper bound (members may ignore the DM forever), so a periodic
/// sweep evicts stale entries.
pub struct RegistrationManager {
    pending: DashMap<UserId, PendingRegistration>,
}

impl RegistrationManager {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }

    /// Mark a user as waiting for their email. Re-joining refreshes the entry.
    pub fn begin_waiting(&self, user_id: UserId) {
        self.pending.insert(
            user_id,
            PendingRegistration {
                started_at: current_timestamp(),
            },
        );
        debug!("Waiting for email from user {}", user_id);
    }

    pub fn is_waiting(&self, user_id: UserId) -> bool {
        self.pending.contains_key(&user_id)
    }

    /// Registration finished; forget the user. No-op when not pending.
    pub fn complete(&self, user_id: UserId) {
        if self.pending.remove(&user_id).is_some() {
            debug!("Completed registration for user {}", user_id);
        }
    }

    /// Drop pending entries older than `max_age`.
    pub fn cleanup_stale(&self, max_age: Duration) {
        let cutoff = current_timestamp().saturating_sub(max_age.as_secs());
        let before = self.pending.len();
        self.pending.retain(|_, entry| entry.started_at > cutoff);

        let evicted = before - self.pending.len();
        if evicted > 0 {
            info!("Evicted {} stale pending registration(s)", evicted);
        }
    }

    #[cfg(test)]
    fn begin_waiting_at(&self, user_id: UserId, started_at: u64) {
        self.pending
            .insert(user_id, PendingRegistration { started_at });
    }
}

impl Default for RegistrationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared registration manager type
pub type SharedRegistrationManager = Arc<RegistrationManager>;

pub fn create_shared_registration_manager() -> SharedRegistrationManager {
    Arc::new(RegistrationManager::new())
}

fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("paddler@example.com"));
        assert!(is_valid_email("first.last@club.example.org"));
        assert!(is_valid_email("user+tag@sub.domain.co"));
        assert!(is_valid_email("a_b%c-d@host-name.io"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("missing-domain-dot@example"));
        assert!(!is_valid_email("short-tld@example.c"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("two@signs@example.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("spaces in local@example.com"));
        assert!(!is_valid_email("digits-tld@example.c0m"));
    }

    #[test]
    fn test_waiting_lifecycle() {
        let manager = RegistrationManager::new();
        let user = UserId::new(42);

        assert!(!manager.is_waiting(user));

        manager.begin_waiting(user);
        assert!(manager.is_waiting(user));

        manager.complete(user);
        assert!(!manager.is_waiting(user));
    }

    #[test]
    fn test_complete_absent_user_is_noop() {
        let manager = RegistrationManager::new();
        manager.complete(UserId::new(7));
        assert!(!manager.is_waiting(UserId::new(7)));
    }

    #[test]
    fn test_cleanup_evicts_only_stale_entries() {
        let manager = RegistrationManager::new();
        let stale = UserId::new(1);
        let fresh = UserId::new(2);

        manager.begin_waiting_at(stale, current_timestamp() - 90_000);
        manager.begin_waiting(fresh);

        manager.cleanup_stale(Duration::from_secs(86_400));

        assert!(!manager.is_waiting(stale));
        assert!(manager.is_waiting(fresh));
    }
}
