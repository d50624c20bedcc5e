//! Free-mail and role-account reference lists, bundled as TOML and loaded
//! once at startup.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("failed to parse reference list: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
}

/// Domains handing out free personal mailboxes.
#[derive(Debug, Clone, Default)]
pub struct FreeDomainList {
    domains: HashSet<String>,
}

#[derive(Deserialize)]
struct FreeDomainFile {
    free_emails: Vec<String>,
}

impl FreeDomainList {
    pub fn from_toml_str(text: &str) -> Result<Self, ListError> {
        let file: FreeDomainFile = toml::from_str(text)?;
        Ok(Self {
            domains: file
                .free_emails
                .into_iter()
                .map(|d| d.to_ascii_lowercase())
                .collect(),
        })
    }

    pub fn bundled() -> Result<Self, ListError> {
        Self::from_toml_str(include_str!("../data/free_emails.toml"))
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }
}

/// Local parts that denote a function rather than a person.
#[derive(Debug, Clone, Default)]
pub struct RoleAccountList {
    matches: HashSet<String>,
    contains: Vec<String>,
}

#[derive(Deserialize)]
struct RoleAccountFile {
    matches: Vec<String>,
    contains: Vec<String>,
}

impl RoleAccountList {
    pub fn from_toml_str(text: &str) -> Result<Self, ListError> {
        let file: RoleAccountFile = toml::from_str(text)?;
        Ok(Self {
            matches: file
                .matches
                .into_iter()
                .map(|m| m.to_ascii_lowercase())
                .collect(),
            contains: file
                .contains
                .into_iter()
                .map(|c| c.to_ascii_lowercase())
                .collect(),
        })
    }

    pub fn bundled() -> Result<Self, ListError> {
        Self::from_toml_str(include_str!("../data/role_emails.toml"))
    }

    /// Exact match against `matches`, then substring match against
    /// `contains` tokens in both directions.
    pub fn is_role(&self, user: &str) -> bool {
        if self.matches.contains(user) {
            return true;
        }
        self.contains
            .iter()
            .any(|token| token.contains(user) || user.contains(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_domains_load_and_match() {
        let list = FreeDomainList::bundled().expect("free list");
        assert!(list.contains("gmail.com"));
        assert!(list.contains("yahoo.co.uk"));
        assert!(!list.contains("microsoft.com"));
    }

    #[test]
    fn role_accounts_match_exactly() {
        let list = RoleAccountList::bundled().expect("role list");
        assert!(list.is_role("support"));
        assert!(list.is_role("postmaster"));
        assert!(!list.is_role("john.doe"));
    }

    #[test]
    fn role_tokens_match_substrings_both_ways() {
        let list = RoleAccountList::from_toml_str(
            r#"
matches = ["sales"]
contains = ["noreply", "helpdesk"]
"#,
        )
        .expect("parse");
        assert!(list.is_role("noreply-billing"));
        assert!(list.is_role("it-helpdesk"));
        // The local part itself is a substring of a token.
        assert!(list.is_role("help"));
        assert!(!list.is_role("jane"));
    }
}
