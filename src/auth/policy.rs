use std::collections::HashSet;

use crate::config;

/// Allow-list policy for the super-admin console. Authorization is
/// all-or-nothing: an email either has full console access or none.
#[derive(Debug, Clone)]
pub struct AdminPolicy {
    emails: HashSet<String>,
}

impl AdminPolicy {
    pub fn new(emails: impl IntoIterator<Item = String>) -> Self {
        Self {
            emails: emails.into_iter().collect(),
        }
    }

    /// Build the policy from the configured allow-list (SUPER_ADMIN_EMAILS).
    pub fn from_config() -> Self {
        Self::new(config::config().security.super_admin_emails.iter().cloned())
    }

    /// Exact string match against the allow-list.
    pub fn allows(&self, email: &str) -> bool {
        self.emails.contains(email)
    }
}
