//! Detection of machine-issued local parts. A mailbox like
//! `unsub-1f2e3d4c` or `usr-x8q2k9f3` is minted per message or per user
//! record; probing it says nothing useful, so such addresses are reported
//! as undeliverable without touching the wire.

use once_cell::sync::Lazy;
use regex::Regex;

static UUID_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}").expect("uuid")
});

static SYSTEM_PREFIXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^(ld|usr)-",
        r"^unsub-[a-f0-9]{8}",
        r"^(bounce|return|system|noreply|no-reply|donotreply|do-not-reply|unsubscribe)[-.]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("system prefix pattern"))
    .collect()
});

static PHONE_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\+?\d{10,15}$",
        r"^\(\d{3}\)\s?\d{3}-?\d{4}$",
        r"^\d{3}-?\d{3}-?\d{4}$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("phone pattern"))
    .collect()
});

// Human-name shapes that override every machine heuristic below.
static HYPHENATED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+-[a-z]+$").expect("hyphenated name"));
static DOTTED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+\.[a-z]+\d{0,4}$").expect("dotted name"));
static DIGITS_WITHIN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+\d{1,3}[a-z]+$").expect("digits within name"));

/// Classify a (normalized, lowercase) local part as system-generated.
pub fn is_system_generated(user: &str) -> bool {
    if user.is_empty() {
        return false;
    }

    if HYPHENATED_NAME.is_match(user)
        || DOTTED_NAME.is_match(user)
        || DIGITS_WITHIN_NAME.is_match(user)
    {
        return false;
    }

    if user.chars().all(|c| c.is_ascii_digit()) || UUID_SHAPE.is_match(user) {
        return true;
    }

    if SYSTEM_PREFIXES.iter().any(|p| p.is_match(user)) {
        return true;
    }

    if numeric_segments(user) >= 3 || PHONE_SHAPES.iter().any(|p| p.is_match(user)) {
        return true;
    }

    if user.contains('=')
        || user.contains("--")
        || user.matches('_').count() > 2
        || user.len() >= 40
    {
        return true;
    }

    // A random-looking tail after a single hyphen, e.g. `billing-x7qk2m9z`.
    // Whole-string entropy is deliberately not tested: dashes and dots
    // inflate the unique-character ratio enough to misread names like
    // `no-such-user` as machine tokens.
    let parts: Vec<&str> = user.split('-').collect();
    parts.len() == 2 && parts[1].len() >= 8 && is_high_entropy(parts[1])
}

fn numeric_segments(user: &str) -> usize {
    user.split('.')
        .filter(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()))
        .count()
}

/// Heuristic for strings that read as random tokens rather than names:
/// high unique-character ratio or frequent letter/digit alternation, with
/// no long runs of a repeated character.
fn is_high_entropy(s: &str) -> bool {
    if s.len() < 8 {
        return false;
    }

    static NAME_WITH_NUMBERS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[a-z]+\.?[a-z]*\d{1,4}$").expect("name with numbers"));
    if NAME_WITH_NUMBERS.is_match(s) && s.len() < 20 {
        return false;
    }

    let len = s.chars().count();
    let mut seen = std::collections::HashSet::new();
    let mut max_run = 1usize;
    let mut run = 1usize;
    let mut last: Option<char> = None;
    for c in s.chars() {
        seen.insert(c);
        if last == Some(c) {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 1;
        }
        last = Some(c);
    }

    let unique_ratio = seen.len() as f64 / len as f64;
    let repeat_ratio = max_run as f64 / len as f64;
    let transitions = letter_digit_transitions(s);

    ((unique_ratio > 0.6 && len > 12) || (unique_ratio > 0.7 && len >= 8) || transitions > 4)
        && repeat_ratio < 0.3
}

fn letter_digit_transitions(s: &str) -> usize {
    #[derive(PartialEq, Clone, Copy)]
    enum Kind {
        Letter,
        Digit,
        Other,
    }
    let mut transitions = 0;
    let mut prev = Kind::Other;
    for c in s.chars() {
        let kind = if c.is_alphabetic() {
            Kind::Letter
        } else if c.is_ascii_digit() {
            Kind::Digit
        } else {
            Kind::Other
        };
        if kind != prev && prev != Kind::Other && kind != Kind::Other {
            transitions += 1;
        }
        prev = kind;
    }
    transitions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_numeric_and_uuid_users() {
        assert!(is_system_generated("123456"));
        assert!(is_system_generated("0f8fad5b-d9cb-469f-a165-70867728950e"));
    }

    #[test]
    fn flags_system_prefixes() {
        assert!(is_system_generated("ld-8a7b6c5d"));
        assert!(is_system_generated("usr-02x9k1m4"));
        assert!(is_system_generated("unsub-1f2e3d4c"));
        assert!(is_system_generated("noreply.1a2b3c4d"));
        assert!(is_system_generated("bounce.42abc"));
        assert!(is_system_generated("do-not-reply.sales"));
    }

    #[test]
    fn flags_structural_noise() {
        assert!(is_system_generated("a=b"));
        assert!(is_system_generated("one__two__three"));
        assert!(is_system_generated("10.20.30.prod"));
        assert!(is_system_generated(&"x".repeat(40)));
    }

    #[test]
    fn flags_phone_numbers() {
        assert!(is_system_generated("+14155552671"));
        assert!(is_system_generated("415-555-2671"));
        assert!(is_system_generated("(415) 555-2671"));
    }

    #[test]
    fn flags_random_tail_after_hyphen() {
        assert!(is_system_generated("billing-x7qk2m9z"));
    }

    #[test]
    fn spares_human_names() {
        assert!(!is_system_generated("john.doe"));
        assert!(!is_system_generated("john.doe123"));
        assert!(!is_system_generated("mary-jane"));
        // The name-shape override beats the keyword prefix.
        assert!(!is_system_generated("noreply-accounts"));
        assert!(!is_system_generated("jdoe42smith"));
        assert!(!is_system_generated("support"));
        assert!(!is_system_generated("aaaaaaaaaaaa"));
        // Hyphen-heavy but human-authored; the entropy test only applies
        // to a tail after a single hyphen.
        assert!(!is_system_generated("no-such-user"));
    }

    #[test]
    fn entropy_needs_minimum_length() {
        assert!(!is_high_entropy("x7q"));
        assert!(is_high_entropy("x7qk2m9zp4"));
    }
}
