use once_cell::sync::Lazy;
use regex::Regex;

static LOCAL_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}.!#$%&'+\-/=?^_`{|}~]+$").expect("local part pattern")
});

/// Grammar check for the part before the `@`. Wildcards are rejected even
/// though some servers tolerate them; a probe for `*@domain` says nothing
/// about a real mailbox.
pub(crate) fn is_valid_local(user: &str) -> bool {
    !user.is_empty() && user.len() <= 64 && !user.contains('*') && LOCAL_PART.is_match(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_atext_characters() {
        for user in ["alice", "a.b", "bob+tag", "bob_smith", "o'brien", "x/y=z"] {
            assert!(is_valid_local(user), "{user}");
        }
    }

    #[test]
    fn rejects_wildcard_and_whitespace() {
        assert!(!is_valid_local("a*b"));
        assert!(!is_valid_local("a b"));
        assert!(!is_valid_local(""));
    }

    #[test]
    fn enforces_length_limit() {
        assert!(is_valid_local(&"a".repeat(64)));
        assert!(!is_valid_local(&"a".repeat(65)));
    }
}
