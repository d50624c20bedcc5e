#![forbid(unsafe_code)]
//! mailscout — email deliverability verification.
//!
//! Validates whether an address can receive mail by combining three
//! stages: syntax normalization ([`syntax`]), DNS reconnaissance ([`dns`]
//! and [`providers`]), and a live SMTP conversation with the domain's mail
//! exchangers ([`smtp`]). The [`verdict`] engine orchestrates the stages,
//! runs a parallel catch-all probe, and classifies the server's answers
//! into a deliverable / undeliverable / unknown verdict with risk flags
//! and sender-health signals.
//!
//! ```no_run
//! use mailscout::{ValidationRequest, Verifier};
//!
//! # fn main() -> Result<(), mailscout::VerifierError> {
//! let verifier = Verifier::from_bundled_data()?;
//! let request = ValidationRequest::new("someone@example.com", "mydomain.com");
//! let report = verifier.verify(&request);
//! println!("{} -> {}", report.email, report.is_deliverable);
//! # Ok(())
//! # }
//! ```

pub mod dns;
pub mod lists;
pub mod providers;
pub mod request;
pub mod smtp;
pub mod syntax;
pub mod verdict;

pub use dns::{DnsBundle, DnsError, DnsProber};
pub use request::{PrimaryDomainContext, RequestError, ValidationRequest};
pub use smtp::{SmtpProbeOptions, SmtpResponse};
pub use verdict::{
    DomainReport, EmailReport, MailServerHealth, RiskFlags, SmtpSummary, SyntaxReport, Verdict,
    Verifier, VerifierError, VerifyReport,
};
