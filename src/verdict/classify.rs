//! Pure classification of a parsed SMTP response into the verdict lattice.

use crate::smtp::SmtpResponse;
use crate::verdict::tokens::*;
use crate::verdict::types::Verdict;

pub(crate) const NO_MX_DESCRIPTION: &str = "No MX records for domain";

/// Everything the verdict engine needs to know about one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Classification {
    pub verdict: Verdict,
    pub retry: bool,
    pub is_mailbox_full: bool,
    pub tls_required: bool,
    pub is_greylisted: bool,
    pub is_blacklisted: bool,
    /// Minutes until a retry is worthwhile; meaningful when greylisted or
    /// blacklisted.
    pub retry_delay_minutes: u64,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            verdict: Verdict::Unknown,
            retry: true,
            is_mailbox_full: false,
            tls_required: false,
            is_greylisted: false,
            is_blacklisted: false,
            retry_delay_minutes: DEFAULT_RETRY_DELAY_MINUTES,
        }
    }
}

pub(crate) fn classify(response: &SmtpResponse) -> Classification {
    let mut outcome = Classification::default();

    if !response.can_connect {
        if response.description == NO_MX_DESCRIPTION {
            outcome.verdict = Verdict::Undeliverable;
            outcome.retry = false;
        }
        // All MX dials failed: unknown, retry stays on.
        return outcome;
    }

    // Case-fold once; every token table below is lowercase.
    let description = response.description.to_ascii_lowercase();
    let code = response.status_code.as_str();
    let enhanced = response.enhanced_status_code.as_str();

    if DELIVERABLE_CODES.contains(&code) {
        outcome.verdict = Verdict::Deliverable;
        outcome.retry = false;
    } else if TEMPORARY_FAILURE_CODES.contains(&code) {
        classify_temporary(&mut outcome, &description, enhanced);
    } else if PERMANENT_FAILURE_CODES.contains(&code) {
        classify_permanent(&mut outcome, &description, enhanced);
    }

    outcome
}

fn classify_temporary(outcome: &mut Classification, description: &str, enhanced: &str) {
    if contains_any(description, MAILBOX_FULL_TOKENS) {
        mark_mailbox_full(outcome);
    } else if contains_any(description, ADDRESS_REJECTED_TOKENS)
        || ADDRESS_REJECTED_ENHANCED.contains(&enhanced)
    {
        outcome.verdict = Verdict::Undeliverable;
        outcome.retry = false;
    } else if contains_any(description, GREYLIST_TOKENS) {
        mark_greylisted(outcome, description);
    } else if contains_any(description, TEMPORARY_BLACKLIST_TOKENS) {
        mark_blacklisted(outcome);
    } else if description.contains("tls") {
        outcome.tls_required = true;
        outcome.retry = true;
    }
}

// Blacklist precedes invalid-address: enhanced 5.7.1 lives in both sets and
// a reputation block must not read as a missing mailbox.
fn classify_permanent(outcome: &mut Classification, description: &str, enhanced: &str) {
    if contains_any(description, PERMANENT_BLACKLIST_TOKENS) {
        mark_blacklisted(outcome);
    } else if contains_any(description, TEMPORARY_BLOCK_TOKENS) {
        mark_greylisted(outcome, description);
    } else if contains_any(description, MAILBOX_FULL_TOKENS) {
        mark_mailbox_full(outcome);
    } else if contains_any(description, AUTH_TLS_TOKENS) {
        outcome.tls_required = true;
        outcome.retry = true;
    } else if contains_any(description, RETRY_TOKENS) {
        outcome.verdict = Verdict::Unknown;
        outcome.retry = true;
    } else if contains_any(description, INVALID_ADDRESS_TOKENS)
        || INVALID_ADDRESS_ENHANCED.contains(&enhanced)
    {
        outcome.verdict = Verdict::Undeliverable;
        outcome.retry = false;
    } else {
        outcome.verdict = Verdict::Unknown;
        outcome.retry = false;
    }
}

fn mark_mailbox_full(outcome: &mut Classification) {
    outcome.verdict = Verdict::Undeliverable;
    outcome.is_mailbox_full = true;
    outcome.retry = false;
}

fn mark_greylisted(outcome: &mut Classification, description: &str) {
    outcome.is_greylisted = true;
    outcome.verdict = Verdict::Unknown;
    outcome.retry = true;
    outcome.retry_delay_minutes = greylist_delay_minutes(description);
}

fn mark_blacklisted(outcome: &mut Classification) {
    outcome.is_blacklisted = true;
    outcome.verdict = Verdict::Unknown;
    outcome.retry = true;
}

fn contains_any(description: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| description.contains(token))
}

fn greylist_delay_minutes(description: &str) -> u64 {
    for (hints, minutes) in GREYLIST_DELAY_HINTS {
        if contains_any(description, hints) {
            return *minutes;
        }
    }
    DEFAULT_RETRY_DELAY_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: &str, enhanced: &str, description: &str) -> SmtpResponse {
        SmtpResponse {
            can_connect: true,
            tls_required: false,
            status_code: status.to_string(),
            enhanced_status_code: enhanced.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn no_mx_is_undeliverable_without_retry() {
        let outcome = classify(&SmtpResponse {
            can_connect: false,
            description: NO_MX_DESCRIPTION.to_string(),
            ..SmtpResponse::default()
        });
        assert_eq!(outcome.verdict, Verdict::Undeliverable);
        assert!(!outcome.retry);
    }

    #[test]
    fn connection_failure_is_unknown_with_retry() {
        let outcome = classify(&SmtpResponse {
            can_connect: false,
            description: "Cannot connect to any MX server".to_string(),
            ..SmtpResponse::default()
        });
        assert_eq!(outcome.verdict, Verdict::Unknown);
        assert!(outcome.retry);
    }

    #[test]
    fn accepted_codes_are_deliverable() {
        for code in ["250", "251"] {
            let outcome = classify(&response(code, "2.1.5", "Ok"));
            assert_eq!(outcome.verdict, Verdict::Deliverable, "{code}");
            assert!(!outcome.retry);
        }
    }

    #[test]
    fn user_unknown_is_undeliverable() {
        let outcome = classify(&response(
            "550",
            "5.1.1",
            "<no-such-user@example.com>: Recipient address rejected: User unknown",
        ));
        assert_eq!(outcome.verdict, Verdict::Undeliverable);
        assert!(!outcome.retry);
        assert!(!outcome.is_mailbox_full);
    }

    #[test]
    fn enhanced_code_alone_marks_invalid_address() {
        let outcome = classify(&response("550", "5.1.6", "recipient no longer on server"));
        assert_eq!(outcome.verdict, Verdict::Undeliverable);
    }

    #[test]
    fn greylisting_sets_retry_delay() {
        let outcome = classify(&response(
            "451",
            "4.7.1",
            "Greylisted, please try again in 5 minutes",
        ));
        assert_eq!(outcome.verdict, Verdict::Unknown);
        assert!(outcome.is_greylisted);
        assert!(outcome.retry);
        assert_eq!(outcome.retry_delay_minutes, 6);
    }

    #[test]
    fn greylist_delay_hints_map_to_minutes() {
        assert_eq!(greylist_delay_minutes("retry in 360 seconds"), 7);
        assert_eq!(greylist_delay_minutes("wait 60 seconds"), 2);
        assert_eq!(greylist_delay_minutes("try once more in 1 minute"), 2);
        assert_eq!(greylist_delay_minutes("come back whenever"), 75);
    }

    #[test]
    fn spamhaus_block_is_blacklisted_despite_571() {
        let outcome = classify(&response(
            "554",
            "5.7.1",
            "Service unavailable, Client host [1.2.3.4] blocked using Spamhaus",
        ));
        assert_eq!(outcome.verdict, Verdict::Unknown);
        assert!(outcome.is_blacklisted);
        assert!(outcome.retry);
    }

    #[test]
    fn temporary_blacklist_tokens_apply_after_greylist() {
        // "not allowed" sits in the greylist table and must win over the
        // blacklist table for temporary failures.
        let grey = classify(&response("451", "", "sender not allowed right now"));
        assert!(grey.is_greylisted);
        assert!(!grey.is_blacklisted);

        let black = classify(&response("450", "", "sending host not in whitelist"));
        assert!(black.is_blacklisted);
        assert_eq!(black.verdict, Verdict::Unknown);
    }

    #[test]
    fn address_rejection_outranks_temporary_blacklist() {
        // "sender address rejected" also contains the address-rejected
        // token, and the address verdict is evaluated first.
        let outcome = classify(&response("450", "", "sender address rejected: not in whitelist"));
        assert_eq!(outcome.verdict, Verdict::Undeliverable);
        assert!(!outcome.retry);
        assert!(!outcome.is_blacklisted);
    }

    #[test]
    fn mailbox_full_tokens_win_in_both_classes() {
        for code in ["452", "552"] {
            let outcome = classify(&response(code, "", "user is over quota"));
            assert_eq!(outcome.verdict, Verdict::Undeliverable, "{code}");
            assert!(outcome.is_mailbox_full, "{code}");
            assert!(!outcome.retry, "{code}");
        }
    }

    #[test]
    fn temporary_address_rejection_is_terminal() {
        let outcome = classify(&response("451", "4.4.4", "routing loop detected"));
        assert_eq!(outcome.verdict, Verdict::Undeliverable);
        assert!(!outcome.retry);
    }

    #[test]
    fn tls_demands_are_flagged_for_retry() {
        let temporary = classify(&response("451", "", "TLS required for this recipient"));
        assert!(temporary.tls_required);
        assert!(temporary.retry);

        let permanent = classify(&response("554", "", "must issue STARTTLS encryption first"));
        assert!(permanent.tls_required);
        assert!(permanent.retry);
    }

    #[test]
    fn temporarily_blocked_takes_greylist_path() {
        let outcome = classify(&response("554", "", "temporarily blocked, slow down"));
        assert!(outcome.is_greylisted);
        assert_eq!(outcome.verdict, Verdict::Unknown);
        assert!(outcome.retry);
    }

    #[test]
    fn try_again_is_unknown_with_retry() {
        let outcome = classify(&response("550", "", "temporary error, try again"));
        assert_eq!(outcome.verdict, Verdict::Unknown);
        assert!(outcome.retry);
        assert!(!outcome.is_greylisted);
    }

    #[test]
    fn unhandled_permanent_failure_is_unknown_without_retry() {
        let outcome = classify(&response("557", "", "policy frobnication failed"));
        assert_eq!(outcome.verdict, Verdict::Unknown);
        assert!(!outcome.retry);
    }

    #[test]
    fn unrecognized_code_keeps_retry_on() {
        let outcome = classify(&response("", "", "connection reset by peer"));
        assert_eq!(outcome.verdict, Verdict::Unknown);
        assert!(outcome.retry);
    }
}
