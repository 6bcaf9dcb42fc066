//! Email based access policy: who may use the platform and who administers it.

use std::collections::HashSet;

pub const ADMIN_EMAILS_VAR: &str = "ADMIN_EMAILS";
pub const ALLOWED_DOMAINS_VAR: &str = "ALLOWED_DOMAINS";

/// Domain part of an address: the text between the first and second `@`.
pub fn email_domain(email: &str) -> Option<&str> {
    email.split('@').nth(1)
}

/// Platform entry check against an admin set and an allowed-domain set.
///
/// Exact, case-sensitive matching; no normalization is applied to `email`.
pub fn has_access(email: &str, admins: &HashSet<String>, domains: &HashSet<String>) -> bool {
    if email.is_empty() {
        return false;
    }

    if admins.contains(email) {
        return true;
    }

    email_domain(email).is_some_and(|domain| domains.contains(domain))
}

fn parse_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Decides whether an identity may enter the platform and whether it is privileged.
pub trait AccessPolicy: Send + Sync {
    fn is_privileged(&self, email: &str) -> bool;

    fn has_access(&self, email: &str) -> bool;
}

/// Fixed allow-lists, typically built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    admins: HashSet<String>,
    domains: HashSet<String>,
}

impl AllowList {
    pub fn new<A, D>(admins: A, domains: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from comma separated lists; entries are trimmed and blanks dropped.
    pub fn from_csv(admins: &str, domains: &str) -> Self {
        Self {
            admins: parse_list(admins),
            domains: parse_list(domains),
        }
    }
}

impl AccessPolicy for AllowList {
    fn is_privileged(&self, email: &str) -> bool {
        !email.is_empty() && self.admins.contains(email)
    }

    fn has_access(&self, email: &str) -> bool {
        has_access(email, &self.admins, &self.domains)
    }
}

/// Reads the allow-lists from the process environment on every check, so
/// edits to the variables apply without a restart.
#[derive(Debug, Clone)]
pub struct EnvAllowList {
    admins_var: String,
    domains_var: String,
}

impl Default for EnvAllowList {
    fn default() -> Self {
        Self::new(ADMIN_EMAILS_VAR, ALLOWED_DOMAINS_VAR)
    }
}

impl EnvAllowList {
    pub fn new(admins_var: impl Into<String>, domains_var: impl Into<String>) -> Self {
        Self {
            admins_var: admins_var.into(),
            domains_var: domains_var.into(),
        }
    }

    fn current(&self) -> AllowList {
        let admins = std::env::var(&self.admins_var).unwrap_or_default();
        let domains = std::env::var(&self.domains_var).unwrap_or_default();
        AllowList::from_csv(&admins, &domains)
    }
}

impl AccessPolicy for EnvAllowList {
    fn is_privileged(&self, email: &str) -> bool {
        self.current().is_privileged(email)
    }

    fn has_access(&self, email: &str) -> bool {
        self.current().has_access(email)
    }
}
