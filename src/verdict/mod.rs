//! The verdict engine: orchestrates syntax analysis, DNS reconnaissance,
//! provider classification, and the SMTP probes, then classifies what the
//! wire said into a deliverable / undeliverable / unknown verdict with risk
//! flags and sender-health signals.

mod classify;
mod health;
mod tokens;
mod types;

pub use types::{
    DomainReport, EmailReport, MailServerHealth, RiskFlags, SmtpSummary, SyntaxReport, Verdict,
    VerifyReport,
};

use std::thread;

use thiserror::Error;
use tracing::debug;

use crate::dns::{DnsBundle, DnsError, DnsProber, PrimaryDomain, primary_domain_check};
use crate::lists::{FreeDomainList, ListError, RoleAccountList};
use crate::providers::{CatalogueError, ProviderCatalogue, classify_domain};
use crate::request::{SenderIdentity, ValidationRequest};
use crate::smtp::{SmtpProbeOptions, SmtpResponse, probe_mailbox};
use crate::syntax::{is_system_generated, normalize_email};

use classify::{Classification, classify};

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("failed to load provider catalogue: {0}")]
    Catalogue(#[from] CatalogueError),
    #[error("failed to load reference lists: {0}")]
    Lists(#[from] ListError),
    #[error(transparent)]
    Dns(#[from] DnsError),
}

/// Shared, read-only validation state: the provider catalogue, the
/// free-mail and role-account lists, and a DNS front-end. Construct once at
/// startup and call freely from multiple threads.
pub struct Verifier {
    catalogue: ProviderCatalogue,
    free_domains: FreeDomainList,
    role_accounts: RoleAccountList,
    prober: DnsProber,
    smtp_options: SmtpProbeOptions,
    primary_check_enabled: bool,
}

impl Verifier {
    /// Build a verifier from the TOML data bundled with the crate.
    pub fn from_bundled_data() -> Result<Self, VerifierError> {
        Self::new(
            ProviderCatalogue::bundled()?,
            FreeDomainList::bundled()?,
            RoleAccountList::bundled()?,
        )
    }

    pub fn new(
        catalogue: ProviderCatalogue,
        free_domains: FreeDomainList,
        role_accounts: RoleAccountList,
    ) -> Result<Self, VerifierError> {
        Ok(Self {
            catalogue,
            free_domains,
            role_accounts,
            prober: DnsProber::from_system_conf()?,
            smtp_options: SmtpProbeOptions::default(),
            primary_check_enabled: true,
        })
    }

    pub fn with_smtp_options(mut self, options: SmtpProbeOptions) -> Self {
        self.smtp_options = options;
        self
    }

    /// Skip the primary-domain web check (TCP dials plus an HTTP redirect
    /// probe). Useful offline and for callers that only need the mailbox
    /// verdict.
    pub fn without_primary_domain_check(mut self) -> Self {
        self.primary_check_enabled = false;
        self
    }

    pub fn dns_prober(&self) -> &DnsProber {
        &self.prober
    }

    /// Syntax-only validation: normalization plus the free / role /
    /// system-generated classification. Touches no network.
    pub fn verify_syntax(&self, email: &str) -> SyntaxReport {
        let normalized = normalize_email(email);
        if !normalized.is_valid {
            return SyntaxReport::default();
        }
        SyntaxReport {
            is_valid: true,
            is_system_generated: is_system_generated(&normalized.user),
            is_free_account: self.free_domains.contains(&normalized.domain),
            is_role_account: self.role_accounts.is_role(&normalized.user),
            user: normalized.user,
            domain: normalized.domain,
            clean_email: normalized.clean_email,
            error: None,
        }
    }

    /// Domain-level validation: provider and gateway identification,
    /// primary-domain heuristic, and the catch-all probe (skipped for
    /// free-mail domains).
    pub fn verify_domain(&self, request: &ValidationRequest) -> DomainReport {
        let mut report = DomainReport::default();

        if let Err(err) = request.validate() {
            report.error = Some(format!("invalid request: {err}"));
            return report;
        }
        let normalized = normalize_email(&request.email);
        if !normalized.is_valid {
            report.error = Some("invalid email address".to_string());
            return report;
        }

        let identity = request.effective_identity();
        let owned_bundle;
        let bundle = match &request.dns {
            Some(bundle) => bundle,
            None => {
                owned_bundle = self.prober.probe(&normalized.domain);
                &owned_bundle
            }
        };

        let providers = classify_domain(bundle, &self.catalogue);
        report.provider = providers.provider;
        report.secure_gateway_provider = providers.secure_gateway;
        report.is_firewalled = providers.is_firewalled;
        report.authorized_senders = providers.authorized_senders;
        report.has_mx = bundle.has_mx();
        report.has_spf = bundle.has_spf();

        if self.primary_check_enabled {
            let primary = primary_domain_check(&self.prober, &normalized.domain);
            report.is_primary_domain = primary.is_primary;
            report.primary_domain = primary.primary_domain;
        }

        if !self.free_domains.contains(&normalized.domain) && bundle.has_mx() {
            let catch_all_email = format!("{}@{}", identity.catch_all_local, normalized.domain);
            let mut response = probe_mailbox(
                &catch_all_email,
                &request.from_domain,
                &identity.from_email,
                bundle,
                &self.smtp_options,
            );
            let outcome = classify(&response);
            response.tls_required = outcome.tls_required;
            if outcome.verdict == Verdict::Deliverable {
                debug!(domain = %normalized.domain, "catch-all sentinel accepted");
                report.is_catch_all = true;
            }
            if outcome.is_greylisted || outcome.is_blacklisted {
                report.mail_server_health = self.health_for(&identity, &outcome);
            }
            report.smtp_response = response;
        }

        report
    }

    /// Mailbox-level validation: the real-address probe, with the parallel
    /// catch-all probe for non-free domains downgrading the verdict when
    /// the domain accepts anything.
    pub fn verify_email(&self, request: &ValidationRequest) -> EmailReport {
        let mut report = EmailReport::default();

        if let Err(err) = request.validate() {
            report.error = Some(format!("invalid request: {err}"));
            return report;
        }
        let normalized = normalize_email(&request.email);
        if !normalized.is_valid {
            report.error = Some("invalid email address".to_string());
            return report;
        }

        report.is_free_account = self.free_domains.contains(&normalized.domain);
        report.is_role_account = self.role_accounts.is_role(&normalized.user);

        if is_system_generated(&normalized.user) {
            report.is_deliverable = Verdict::Undeliverable;
            report.retry_validation = false;
            return report;
        }

        let identity = request.effective_identity();
        let owned_bundle;
        let bundle = match &request.dns {
            Some(bundle) => bundle,
            None => {
                owned_bundle = self.prober.probe(&normalized.domain);
                &owned_bundle
            }
        };

        let with_catch_all = !report.is_free_account && bundle.has_mx();
        let (real, sentinel) = self.probe_pair(
            &normalized.clean_email,
            &normalized.domain,
            &identity,
            &request.from_domain,
            bundle,
            with_catch_all,
        );

        self.finalize_email(&identity, real, &mut report);
        if let Some(response) = sentinel {
            if classify(&response).verdict == Verdict::Deliverable {
                report.is_deliverable = Verdict::Unknown;
            }
        }

        if !report.is_free_account {
            if let Some(context) = &request.primary_context {
                if !context.is_primary_domain && !context.primary_domain.is_empty() {
                    report.alternate_email =
                        Some(format!("{}@{}", normalized.user, context.primary_domain));
                }
            }
        }

        report
    }

    /// Full validation of one address: syntax, domain, and mailbox stages
    /// composed into the combined report the CLI prints.
    pub fn verify(&self, request: &ValidationRequest) -> VerifyReport {
        self.verify_with_known_catch_all(request, None)
    }

    /// Like [`verify`](Self::verify), but lets a bulk driver that already
    /// probed this domain supply the catch-all outcome instead of probing
    /// again.
    pub fn verify_with_known_catch_all(
        &self,
        request: &ValidationRequest,
        known_catch_all: Option<bool>,
    ) -> VerifyReport {
        let syntax = self.verify_syntax(&request.email);
        let mut report = VerifyReport {
            email: if syntax.is_valid {
                syntax.clean_email.clone()
            } else {
                request.email.trim().to_string()
            },
            is_valid_syntax: syntax.is_valid,
            ..VerifyReport::default()
        };

        if !syntax.is_valid {
            report.syntax = syntax;
            return report;
        }
        if let Err(err) = request.validate() {
            report.error = Some(format!("invalid request: {err}"));
            report.syntax = syntax;
            return report;
        }

        let identity = request.effective_identity();
        let owned_bundle;
        let bundle = match &request.dns {
            Some(bundle) => bundle,
            None => {
                owned_bundle = self.prober.probe(&syntax.domain);
                &owned_bundle
            }
        };

        let providers = classify_domain(bundle, &self.catalogue);
        let primary = if self.primary_check_enabled {
            primary_domain_check(&self.prober, &syntax.domain)
        } else {
            PrimaryDomain::default()
        };

        let mut email = EmailReport {
            is_free_account: syntax.is_free_account,
            is_role_account: syntax.is_role_account,
            ..EmailReport::default()
        };
        let mut is_catch_all = known_catch_all.unwrap_or(false);

        if syntax.is_system_generated {
            email.is_deliverable = Verdict::Undeliverable;
            email.retry_validation = false;
        } else {
            let with_catch_all =
                known_catch_all.is_none() && !syntax.is_free_account && bundle.has_mx();
            let (real, sentinel) = self.probe_pair(
                &syntax.clean_email,
                &syntax.domain,
                &identity,
                &request.from_domain,
                bundle,
                with_catch_all,
            );
            self.finalize_email(&identity, real, &mut email);
            if let Some(response) = sentinel {
                if classify(&response).verdict == Verdict::Deliverable {
                    is_catch_all = true;
                }
            }
        }

        if is_catch_all {
            email.is_deliverable = Verdict::Unknown;
        }

        if !syntax.is_free_account && !primary.is_primary && !primary.primary_domain.is_empty() {
            email.alternate_email = Some(format!("{}@{}", syntax.user, primary.primary_domain));
        }

        let risk = RiskFlags {
            is_firewalled: providers.is_firewalled,
            is_free_account: syntax.is_free_account,
            is_role_account: syntax.is_role_account,
            is_mailbox_full: email.is_mailbox_full,
            is_catch_all,
        };

        report.is_deliverable = email.is_deliverable;
        report.provider = providers.provider;
        report.firewall = providers.secure_gateway;
        report.is_risky = risk.any() || syntax.is_system_generated;
        report.risk = risk;
        report.smtp = SmtpSummary {
            retry: email.retry_validation,
            response: email.smtp_response,
        };
        report.alternate_email = email.alternate_email;
        report.syntax = syntax;
        report
    }

    /// Run the real-address probe and, when asked, the catch-all sentinel
    /// probe as two scoped threads joined together. Both borrow the same
    /// DNS bundle; there is no ordering contract between them.
    fn probe_pair(
        &self,
        target_email: &str,
        domain: &str,
        identity: &SenderIdentity,
        helo_domain: &str,
        bundle: &DnsBundle,
        with_catch_all: bool,
    ) -> (SmtpResponse, Option<SmtpResponse>) {
        let catch_all_email = format!("{}@{}", identity.catch_all_local, domain);
        thread::scope(|scope| {
            let real = scope.spawn(|| {
                probe_mailbox(
                    target_email,
                    helo_domain,
                    &identity.from_email,
                    bundle,
                    &self.smtp_options,
                )
            });
            let sentinel = with_catch_all.then(|| {
                scope.spawn(|| {
                    probe_mailbox(
                        &catch_all_email,
                        helo_domain,
                        &identity.from_email,
                        bundle,
                        &self.smtp_options,
                    )
                })
            });
            (
                real.join().expect("real-address probe thread"),
                sentinel.map(|handle| handle.join().expect("catch-all probe thread")),
            )
        })
    }

    fn finalize_email(
        &self,
        identity: &SenderIdentity,
        mut response: SmtpResponse,
        report: &mut EmailReport,
    ) {
        let outcome = classify(&response);
        response.tls_required = outcome.tls_required;
        report.is_deliverable = outcome.verdict;
        report.is_mailbox_full = outcome.is_mailbox_full;
        report.retry_validation = outcome.retry;
        if outcome.is_greylisted || outcome.is_blacklisted {
            report.mail_server_health = self.health_for(identity, &outcome);
        }
        report.smtp_response = response;
    }

    fn health_for(&self, identity: &SenderIdentity, outcome: &Classification) -> MailServerHealth {
        MailServerHealth {
            is_greylisted: outcome.is_greylisted,
            is_blacklisted: outcome.is_blacklisted,
            server_ip: health::sender_public_ip().unwrap_or_default(),
            from_email: identity.from_email.clone(),
            retry_after: health::epoch_seconds_after(outcome.retry_delay_minutes),
        }
    }
}
