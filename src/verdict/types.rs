use std::fmt;

use serde::{Deserialize, Serialize};

use crate::providers::AuthorizedSenders;
use crate::smtp::SmtpResponse;

/// The closed verdict lattice. Serialized as the strings `"true"`,
/// `"false"`, and `"unknown"` so downstream consumers see a stable wire
/// form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "true")]
    Deliverable,
    #[serde(rename = "false")]
    Undeliverable,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deliverable => f.write_str("true"),
            Self::Undeliverable => f.write_str("false"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Health signals about the sender's own IP, filled in when the remote
/// server greylists or blacklists the probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailServerHealth {
    pub is_greylisted: bool,
    pub is_blacklisted: bool,
    pub server_ip: String,
    pub from_email: String,
    /// Epoch seconds after which another attempt is worthwhile.
    pub retry_after: u64,
}

/// Syntax-stage outcome. Empty defaults when the address is invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxReport {
    pub is_valid: bool,
    pub user: String,
    pub domain: String,
    pub clean_email: String,
    pub is_role_account: bool,
    pub is_free_account: bool,
    pub is_system_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Domain-level verdict: who runs the mail, whether a gateway fronts it,
/// and whether the domain swallows every local part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainReport {
    pub provider: String,
    pub secure_gateway_provider: String,
    pub authorized_senders: AuthorizedSenders,
    pub is_firewalled: bool,
    pub is_catch_all: bool,
    pub is_primary_domain: bool,
    pub primary_domain: String,
    pub has_mx: bool,
    pub has_spf: bool,
    pub smtp_response: SmtpResponse,
    pub mail_server_health: MailServerHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Mailbox-level verdict for a single address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailReport {
    pub is_deliverable: Verdict,
    pub is_mailbox_full: bool,
    pub is_role_account: bool,
    pub is_free_account: bool,
    pub retry_validation: bool,
    pub smtp_response: SmtpResponse,
    pub mail_server_health: MailServerHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Risk attributes rolled into the combined report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlags {
    pub is_firewalled: bool,
    pub is_free_account: bool,
    pub is_role_account: bool,
    pub is_mailbox_full: bool,
    pub is_catch_all: bool,
}

impl RiskFlags {
    pub fn any(&self) -> bool {
        self.is_firewalled
            || self.is_free_account
            || self.is_role_account
            || self.is_mailbox_full
            || self.is_catch_all
    }
}

/// SMTP diagnostics surfaced in the combined report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSummary {
    pub retry: bool,
    #[serde(flatten)]
    pub response: SmtpResponse,
}

/// Combined outcome of syntax, domain, and mailbox validation for one
/// address; what the CLI prints and the bulk driver flattens into CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub email: String,
    pub is_deliverable: Verdict,
    pub is_valid_syntax: bool,
    pub provider: String,
    pub firewall: String,
    pub is_risky: bool,
    pub risk: RiskFlags,
    pub syntax: SyntaxReport,
    pub smtp: SmtpSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
