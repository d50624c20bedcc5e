//! Address normalization and syntax classification.
//!
//! The public entry point is [`normalize_email`], which folds the input to
//! lowercase ASCII, validates the local part and domain against an RFC-like
//! grammar, and canonicalizes the result. Gmail addresses collapse to their
//! dot-free `gmail.com` form, since Gmail ignores dots and treats
//! `googlemail.com` as an alias.

mod domain;
mod generated;
mod local;

pub use domain::{is_valid_domain, registrable_domain, root_and_subdomain};
pub use generated::is_system_generated;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonical form of an address produced by [`normalize_email`].
///
/// When `is_valid` is false every other field is empty; an invalid address
/// never carries partial data into later pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedEmail {
    pub is_valid: bool,
    pub user: String,
    pub domain: String,
    pub clean_email: String,
}

/// Normalize and validate an email address.
///
/// Never fails: grammar rejections return the empty default struct.
pub fn normalize_email(email: &str) -> NormalizedEmail {
    let folded = fold_to_ascii(email);
    let trimmed = folded.trim();
    if trimmed.is_empty() {
        return NormalizedEmail::default();
    }

    let Some((user, domain)) = split_email(trimmed) else {
        return NormalizedEmail::default();
    };

    if !local::is_valid_local(user) || !domain::is_valid_domain(domain) {
        return NormalizedEmail::default();
    }

    let (user, domain) = canonicalize(user, domain);
    let clean_email = format!("{user}@{domain}");
    NormalizedEmail {
        is_valid: true,
        user,
        domain,
        clean_email,
    }
}

/// Split into (local part, domain). `None` unless exactly one `@` separator.
pub fn split_email(email: &str) -> Option<(&str, &str)> {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(user), Some(domain), None) if !user.is_empty() && !domain.is_empty() => {
            Some((user, domain))
        }
        _ => None,
    }
}

/// NFD-decompose, drop combining marks and any remaining non-ASCII, and
/// lowercase. `Rob.Näme😆` becomes `rob.name`.
fn fold_to_ascii(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn canonicalize(user: &str, domain: &str) -> (String, String) {
    if domain == "gmail.com" || domain == "googlemail.com" {
        (user.replace('.', ""), "gmail.com".to_string())
    } else {
        (user.to_string(), domain.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_basic_address() {
        let n = normalize_email("alice@example.com");
        assert!(n.is_valid);
        assert_eq!(n.user, "alice");
        assert_eq!(n.domain, "example.com");
        assert_eq!(n.clean_email, "alice@example.com");
    }

    #[test]
    fn rejects_missing_or_double_at() {
        assert!(!normalize_email("not-an-email").is_valid);
        assert!(!normalize_email("a@b@example.com").is_valid);
        assert!(!normalize_email("not.an.email@").is_valid);
        assert_eq!(normalize_email("@example.com"), NormalizedEmail::default());
    }

    #[test]
    fn folds_unicode_to_ascii() {
        let n = normalize_email("Rob.Näme😆@Gmail.com");
        assert!(n.is_valid);
        assert_eq!(n.clean_email, "robname@gmail.com");
    }

    #[test]
    fn gmail_dots_are_insignificant() {
        let dotted = normalize_email("john.doe@gmail.com");
        let plain = normalize_email("johndoe@gmail.com");
        assert_eq!(dotted.clean_email, "johndoe@gmail.com");
        assert_eq!(dotted, plain);
    }

    #[test]
    fn googlemail_folds_to_gmail() {
        let n = normalize_email("j.doe@googlemail.com");
        assert_eq!(n.domain, "gmail.com");
        assert_eq!(n.clean_email, "jdoe@gmail.com");
    }

    #[test]
    fn dots_survive_outside_gmail() {
        let n = normalize_email("john.doe@microsoft.com");
        assert_eq!(n.user, "john.doe");
        assert_eq!(n.clean_email, "john.doe@microsoft.com");
    }

    #[test]
    fn rejects_wildcard_and_overlong_local() {
        assert!(!normalize_email("a*b@example.com").is_valid);
        let long = "a".repeat(65);
        assert!(!normalize_email(&format!("{long}@example.com")).is_valid);
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in [
            "John.Doe@Gmail.com",
            "bob_smith@google.com",
            "Ünïcode@example.co.uk",
        ] {
            let once = normalize_email(input);
            assert!(once.is_valid, "{input}");
            let twice = normalize_email(&once.clean_email);
            assert_eq!(once, twice, "{input}");
        }
    }
}
