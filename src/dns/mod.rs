//! DNS reconnaissance for a domain.
//!
//! [`DnsProber::probe`] runs the four lookups a validation needs (MX, SPF
//! via TXT, CNAME, A/AAAA) and folds them into a [`DnsBundle`]. The bundle
//! is pure data: lookup failures land in `errors` instead of aborting, and
//! no interpretation happens here.

mod error;
mod primary;
mod resolver;

pub use error::DnsError;
pub use primary::{PrimaryDomain, primary_domain_check};
pub(crate) use resolver::{MxHost, RecordLookup};

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::debug;
use trust_dns_resolver::Resolver;

/// DNS records gathered for one domain. Constructed by the probe, read-only
/// afterwards; both SMTP probes of a validation borrow the same bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsBundle {
    /// MX exchanges sorted by preference ascending, lowercased, trailing
    /// dots stripped.
    pub mx: Vec<String>,
    /// First TXT record starting `v=spf1`, empty when none exists.
    pub spf: String,
    /// CNAME target when the domain is aliased, empty otherwise.
    pub cname: String,
    /// Whether the domain resolves to at least one A or AAAA record.
    pub has_address: bool,
    /// One entry per failed lookup; never aborts the bundle.
    pub errors: Vec<String>,
}

impl DnsBundle {
    pub fn has_mx(&self) -> bool {
        !self.mx.is_empty()
    }

    pub fn has_spf(&self) -> bool {
        !self.spf.is_empty()
    }
}

/// Synchronous DNS front-end over the system resolver.
pub struct DnsProber {
    resolver: Resolver,
}

impl DnsProber {
    pub fn from_system_conf() -> Result<Self, DnsError> {
        let resolver =
            Resolver::from_system_conf().map_err(|err| DnsError::ResolverInit { source: err })?;
        Ok(Self { resolver })
    }

    /// Probe a domain, IDNA-encoding it first so internationalized names
    /// query correctly.
    pub fn probe(&self, domain: &str) -> DnsBundle {
        let ascii = idna::domain_to_ascii(domain).unwrap_or_else(|_| domain.to_string());
        probe_with(&self.resolver, &ascii)
    }
}

pub(crate) fn probe_with<R: RecordLookup + Sync>(resolver: &R, domain: &str) -> DnsBundle {
    let (mx, txt, cname, addr) = thread::scope(|scope| {
        let mx = scope.spawn(|| resolver.mx(domain));
        let txt = scope.spawn(|| resolver.txt(domain));
        let cname = scope.spawn(|| resolver.cname(domain));
        let addr = scope.spawn(|| resolver.has_address(domain));
        (
            mx.join().expect("mx lookup"),
            txt.join().expect("txt lookup"),
            cname.join().expect("cname lookup"),
            addr.join().expect("address lookup"),
        )
    });

    let mut bundle = DnsBundle::default();

    match mx {
        Ok(hosts) if hosts.is_empty() => {
            bundle
                .errors
                .push(format!("no MX records found for domain {domain}"));
        }
        Ok(hosts) => bundle.mx = normalize_mx(hosts),
        Err(err) => bundle.errors.push(format!("MX lookup failed: {err}")),
    }

    match txt {
        Ok(records) => match select_spf(&records) {
            Some(spf) => bundle.spf = spf,
            None => bundle
                .errors
                .push(format!("no SPF record found for domain {domain}")),
        },
        Err(err) => bundle.errors.push(format!("TXT lookup failed: {err}")),
    }

    match cname {
        Ok(Some(target)) => {
            let target = target.trim_end_matches('.').to_ascii_lowercase();
            if target != domain {
                bundle.cname = target;
            }
        }
        Ok(None) => {}
        Err(err) => bundle.errors.push(format!("CNAME lookup failed: {err}")),
    }

    match addr {
        Ok(present) => bundle.has_address = present,
        Err(err) => bundle.errors.push(format!("address lookup failed: {err}")),
    }

    debug!(
        domain,
        mx = bundle.mx.len(),
        has_spf = bundle.has_spf(),
        errors = bundle.errors.len(),
        "dns bundle assembled"
    );
    bundle
}

fn normalize_mx(mut hosts: Vec<MxHost>) -> Vec<String> {
    hosts.sort_by_key(|host| host.preference);
    let mut exchanges: Vec<String> = hosts
        .into_iter()
        .map(|host| host.exchange.trim_end_matches('.').to_ascii_lowercase())
        .collect();
    exchanges.dedup();
    exchanges
}

/// Pick the first TXT record that is an SPF policy. Records arrive quoted
/// and sometimes split; strip quotes and collapse whitespace first.
fn select_spf(records: &[String]) -> Option<String> {
    records.iter().map(|r| normalize_txt(r)).find(|r| r.starts_with("v=spf1"))
}

fn normalize_txt(record: &str) -> String {
    record
        .trim()
        .trim_matches('"')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use trust_dns_resolver::error::ResolveError;

    /// Canned lookup results standing in for the system resolver.
    #[derive(Default)]
    pub(crate) struct StubDns {
        pub mx: Vec<MxHost>,
        pub txt: Vec<String>,
        pub cname: Option<String>,
        pub has_addr: bool,
        pub fail_mx: bool,
        pub fail_txt: bool,
    }

    impl RecordLookup for StubDns {
        fn mx(&self, _domain: &str) -> Result<Vec<MxHost>, ResolveError> {
            if self.fail_mx {
                return Err(ResolveError::from("mx lookup refused"));
            }
            Ok(self.mx.clone())
        }

        fn txt(&self, _domain: &str) -> Result<Vec<String>, ResolveError> {
            if self.fail_txt {
                return Err(ResolveError::from("txt lookup refused"));
            }
            Ok(self.txt.clone())
        }

        fn cname(&self, _domain: &str) -> Result<Option<String>, ResolveError> {
            Ok(self.cname.clone())
        }

        fn has_address(&self, _domain: &str) -> Result<bool, ResolveError> {
            Ok(self.has_addr)
        }
    }

    #[test]
    fn sorts_mx_by_preference_and_strips_dots() {
        let stub = StubDns {
            mx: vec![
                MxHost::new(20, "MX2.Example.com."),
                MxHost::new(10, "mx1.example.com."),
                MxHost::new(10, "mx1.example.com."),
            ],
            has_addr: true,
            ..StubDns::default()
        };
        let bundle = probe_with(&stub, "example.com");
        assert_eq!(bundle.mx, vec!["mx1.example.com", "mx2.example.com"]);
        assert!(bundle.mx.iter().all(|h| !h.ends_with('.')));
    }

    #[test]
    fn selects_spf_from_txt_records() {
        let stub = StubDns {
            txt: vec![
                "\"google-site-verification=abc\"".to_string(),
                "\"v=spf1   include:_spf.google.com  ~all\"".to_string(),
            ],
            ..StubDns::default()
        };
        let bundle = probe_with(&stub, "example.com");
        assert_eq!(bundle.spf, "v=spf1 include:_spf.google.com ~all");
    }

    #[test]
    fn spf_selection_commutes_with_whitespace_normalization() {
        let plain = StubDns {
            txt: vec!["v=spf1 include:mailgun.org -all".to_string()],
            ..StubDns::default()
        };
        let noisy = StubDns {
            txt: vec!["  \"v=spf1    include:mailgun.org   -all\"  ".to_string()],
            ..StubDns::default()
        };
        assert_eq!(
            probe_with(&plain, "example.com").spf,
            probe_with(&noisy, "example.com").spf
        );
    }

    #[test]
    fn cname_recorded_only_when_aliased() {
        let aliased = StubDns {
            cname: Some("Target.Example.net.".to_string()),
            ..StubDns::default()
        };
        assert_eq!(probe_with(&aliased, "example.com").cname, "target.example.net");

        let self_referential = StubDns {
            cname: Some("example.com.".to_string()),
            ..StubDns::default()
        };
        assert_eq!(probe_with(&self_referential, "example.com").cname, "");
    }

    #[test]
    fn lookup_failures_accumulate_without_aborting() {
        let stub = StubDns {
            fail_mx: true,
            fail_txt: true,
            has_addr: true,
            ..StubDns::default()
        };
        let bundle = probe_with(&stub, "example.com");
        assert!(bundle.has_address);
        assert_eq!(bundle.errors.len(), 2);
        assert!(bundle.errors[0].contains("MX lookup failed"));
    }

    #[test]
    fn missing_records_are_reported_as_errors() {
        let bundle = probe_with(&StubDns::default(), "example.com");
        assert!(!bundle.has_mx());
        assert!(!bundle.has_spf());
        assert!(bundle.errors.iter().any(|e| e.contains("no MX records")));
        assert!(bundle.errors.iter().any(|e| e.contains("no SPF record")));
    }
}
