//! Token tables for SMTP response classification.
//!
//! Descriptions are case-folded once at the classifier boundary; every
//! token here is lowercase and substring-matched. Keeping the sets as data
//! lets the classifier stay a pure function over these tables.

pub(crate) const DELIVERABLE_CODES: &[&str] = &["250", "251"];

pub(crate) const TEMPORARY_FAILURE_CODES: &[&str] = &["421", "450", "451", "452", "453"];

pub(crate) const PERMANENT_FAILURE_CODES: &[&str] = &[
    "500", "501", "503", "525", "541", "542", "550", "551", "552", "554", "557",
];

pub(crate) const MAILBOX_FULL_TOKENS: &[&str] = &[
    "insufficient system storage",
    "out of storage",
    "user is over quota",
];

// Temporary rejections that are really address verdicts in disguise.
pub(crate) const ADDRESS_REJECTED_TOKENS: &[&str] = &[
    "account inbounds disabled",
    "address rejected",
    "relay access denied",
    "not verified",
    "unverified address",
    "temporary recipient validation error",
    "open relay not allowed",
    "syntax error",
    "unable to verify user",
    "recipient not in route",
];

pub(crate) const ADDRESS_REJECTED_ENHANCED: &[&str] = &["4.4.4", "4.2.2"];

pub(crate) const GREYLIST_TOKENS: &[&str] = &[
    "greylisted",
    "greylisting",
    "please retry later",
    "try again later",
    "temporarily deferred",
    "postgrey",
    "try again in",
    "deferred for",
    "internal resource temporarily unavailable",
    "account service is temporarily unavailable",
    "ip temporarily blacklisted",
    "ip and spf record not match",
    "not allowed",
    "not yet authorized to deliver mail",
    "recipient temporarily unavailable",
    "too many",
    "temporarily delayed",
    "domain is not configured",
];

pub(crate) const TEMPORARY_BLACKLIST_TOKENS: &[&str] =
    &["not in whitelist", "sender address rejected"];

pub(crate) const PERMANENT_BLACKLIST_TOKENS: &[&str] = &[
    "access denied",
    "bad reputation",
    "barracudanetworks.com/reputation",
    "black list",
    "blacklist",
    "blocked",
    "envelope blocked",
    "ers-dul",
    "listed by pbl",
    "rejected by abusix",
    "sender rejected",
    "spf check failed",
    "transaction failed",
    "spamhaus",
    "rbl",
    "pbl",
];

pub(crate) const TEMPORARY_BLOCK_TOKENS: &[&str] = &["temporarily blocked"];

pub(crate) const AUTH_TLS_TOKENS: &[&str] =
    &["authentication", "encryption", "tls", "secured connection"];

pub(crate) const RETRY_TOKENS: &[&str] = &["try again"];

// Unambiguous mailbox-negative phrases only; generic words like "rejected"
// would shadow the blacklist and greylist tables above.
pub(crate) const INVALID_ADDRESS_TOKENS: &[&str] = &[
    "address does not exist",
    "address error",
    "address unknown",
    "bad address syntax",
    "disabled recipient",
    "does not exist",
    "dosn't exist",
    "invalid address",
    "invalid recipient",
    "mailbox is frozen",
    "mailbox not found",
    "mailbox unavailable",
    "no longer being monitored",
    "no mail box",
    "no mailbox",
    "no such user",
    "not a known user",
    "recipient not found",
    "recipient unknown",
    "relaying denied",
    "unknown recipient",
    "unknown user",
    "unmonitored inbox",
    "unroutable address",
    "user doesn't",
    "user invalid",
    "user not",
    "user unknown",
    "verify address failed",
    "we do not relay",
    "_403",
];

pub(crate) const INVALID_ADDRESS_ENHANCED: &[&str] = &[
    "5.0.0", "5.0.1", "5.1.0", "5.1.1", "5.1.6", "5.2.0", "5.2.1", "5.4.1", "5.4.4", "5.5.1",
    "5.7.1",
];

/// Human-readable delay hints in greylisting descriptions, mapped to the
/// minutes to wait before retrying.
pub(crate) const GREYLIST_DELAY_HINTS: &[(&[&str], u64)] = &[
    (&["4 minutes", "5 minutes", "five minutes"], 6),
    (&["360 seconds"], 7),
    (&["60 seconds", "1 minute"], 2),
];

pub(crate) const DEFAULT_RETRY_DELAY_MINUTES: u64 = 75;
