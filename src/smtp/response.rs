use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static STATUS_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3}").expect("status pattern"));
static ENHANCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d\.\d\.\d").expect("enhanced pattern"));

// Servers prefix descriptions with leftovers of their own formatting.
const DESCRIPTION_NOISE: &[char] = &[']', ')', '#', '-', '}', ' '];

/// A parsed SMTP reply, the probe's sole output.
///
/// `can_connect` reports whether any MX accepted a TCP connection with a
/// clean greeting; `tls_required` is filled in later by the verdict engine
/// when the description demands an encrypted session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpResponse {
    pub can_connect: bool,
    pub tls_required: bool,
    pub status_code: String,
    pub enhanced_status_code: String,
    pub description: String,
}

impl SmtpResponse {
    /// Parse one reply line from a live connection.
    pub fn parse(line: &str) -> Self {
        let (status_code, enhanced_status_code, description) = split_reply(line);
        Self {
            can_connect: true,
            tls_required: false,
            status_code,
            enhanced_status_code,
            description,
        }
    }

    pub(crate) fn no_mx_records() -> Self {
        Self {
            description: "No MX records for domain".to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn unreachable(last_status: String) -> Self {
        Self {
            status_code: last_status,
            description: "Cannot connect to any MX server".to_string(),
            ..Self::default()
        }
    }

    /// The connection died mid-dialogue; keep the connected flag so the
    /// classifier treats this as a server-side hiccup worth retrying.
    pub(crate) fn connection_lost(reason: impl std::fmt::Display) -> Self {
        Self {
            can_connect: true,
            description: reason.to_string(),
            ..Self::default()
        }
    }
}

/// Split an SMTP reply into (status code, enhanced status code,
/// description). Missing pieces come back as empty strings; the input is
/// never rejected.
pub(crate) fn split_reply(line: &str) -> (String, String, String) {
    let reply = line.trim();

    let Some(status) = STATUS_CODE.find(reply) else {
        return (String::new(), String::new(), reply.to_string());
    };
    let status_code = status.as_str().to_string();

    let enhanced = ENHANCED_CODE.find(reply);
    let enhanced_code = enhanced
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    // When the enhanced code sits right after the status, the description
    // is what follows it; an x.y.z further out is part of the prose.
    let description = match enhanced {
        Some(m) if m.start() <= 6 => &reply[m.end()..],
        _ => &reply[status.end()..],
    };
    let description = description
        .trim()
        .trim_start_matches(DESCRIPTION_NOISE)
        .to_string();

    (status_code, enhanced_code, description)
}
