use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dns::DnsBundle;
use crate::providers::{ProviderCatalogue, ProviderCategory};
use crate::syntax::registrable_domain;

static SPF_INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"include:([^\s]+)").expect("spf include pattern"));

/// Providers authorized to send for a domain, grouped by catalogue
/// category. Lists are deduplicated and keep SPF insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedSenders {
    pub enterprise: Vec<String>,
    pub hosting: Vec<String>,
    pub security: Vec<String>,
    pub webmail: Vec<String>,
}

/// What the DNS records say about who runs the domain's mail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainProviders {
    pub provider: String,
    pub secure_gateway: String,
    pub is_firewalled: bool,
    pub authorized_senders: AuthorizedSenders,
}

/// Interpret a DNS bundle against the provider catalogue.
pub fn classify_domain(bundle: &DnsBundle, catalogue: &ProviderCatalogue) -> DomainProviders {
    let (mut provider, mut secure_gateway) = provider_from_mx(&bundle.mx, catalogue);

    let authorized_senders = if bundle.has_spf() {
        authorized_senders(&bundle.spf, catalogue)
    } else {
        AuthorizedSenders::default()
    };

    if provider.is_empty() {
        provider = [
            &authorized_senders.enterprise,
            &authorized_senders.webmail,
            &authorized_senders.hosting,
        ]
        .into_iter()
        .find_map(|list| list.first().cloned())
        .unwrap_or_default();
    }

    if secure_gateway.is_empty() {
        if let Some(first) = authorized_senders.security.first() {
            secure_gateway = first.clone();
        }
    }

    debug!(%provider, %secure_gateway, "classified domain providers");
    DomainProviders {
        is_firewalled: !secure_gateway.is_empty(),
        provider,
        secure_gateway,
        authorized_senders,
    }
}

/// The highest-priority MX decides. A security hit names the gateway and
/// leaves the provider to the SPF fallback; any other hit names the
/// provider; an unknown host is taken at face value, its registrable
/// domain becoming the provider.
fn provider_from_mx(mx: &[String], catalogue: &ProviderCatalogue) -> (String, String) {
    let mut provider = String::new();
    let mut secure_gateway = String::new();

    if let Some(host) = mx.first() {
        let root = registrable_domain(host);
        match catalogue.lookup(&root) {
            Some(entry) if entry.category == ProviderCategory::Security => {
                secure_gateway = entry.name.clone();
            }
            Some(entry) => provider = entry.name.clone(),
            None => provider = root,
        }
    }

    (provider, secure_gateway)
}

/// Collect `include:` directives from an SPF record into category lists.
/// Unknown includes are dropped silently.
pub(crate) fn authorized_senders(spf: &str, catalogue: &ProviderCatalogue) -> AuthorizedSenders {
    let mut senders = AuthorizedSenders::default();

    for capture in SPF_INCLUDE.captures_iter(spf) {
        let root = registrable_domain(&capture[1]);
        let Some(entry) = catalogue.lookup(&root) else {
            continue;
        };
        let list = match entry.category {
            ProviderCategory::Enterprise => &mut senders.enterprise,
            ProviderCategory::Hosting => &mut senders.hosting,
            ProviderCategory::Security => &mut senders.security,
            ProviderCategory::Webmail => &mut senders.webmail,
        };
        if !list.contains(&entry.name) {
            list.push(entry.name.clone());
        }
    }

    senders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> ProviderCatalogue {
        ProviderCatalogue::from_toml_str(
            r#"
[enterprise]
domains = [
    ["google.com", "google workspace"],
    ["outlook.com", "microsoft 365"],
    ["sendgrid.net", "sendgrid"],
]

[hosting]
domains = [["secureserver.net", "godaddy"]]

[webmail]
domains = [["yahoodns.net", "yahoo"]]

[security]
domains = [
    ["pphosted.com", "proofpoint"],
    ["mimecast.com", "mimecast"],
]
"#,
        )
        .expect("catalogue")
    }

    fn bundle(mx: &[&str], spf: &str) -> DnsBundle {
        DnsBundle {
            mx: mx.iter().map(|s| s.to_string()).collect(),
            spf: spf.to_string(),
            ..DnsBundle::default()
        }
    }

    #[test]
    fn mx_hit_names_the_provider() {
        let providers = classify_domain(&bundle(&["aspmx.l.google.com"], ""), &catalogue());
        assert_eq!(providers.provider, "google workspace");
        assert!(!providers.is_firewalled);
    }

    #[test]
    fn security_mx_names_gateway_and_stops() {
        // The walk ends at the highest-priority exchange even when a later
        // one is a known mailbox host.
        let gateway_only = classify_domain(
            &bundle(&["mx0a-001.pphosted.com", "fallback.outlook.com"], ""),
            &catalogue(),
        );
        assert_eq!(gateway_only.secure_gateway, "proofpoint");
        assert!(gateway_only.is_firewalled);
        assert_eq!(gateway_only.provider, "");

        // With an SPF record the provider comes back through the
        // authorized-senders fallback, not the second exchange.
        let with_spf = classify_domain(
            &bundle(
                &["mx0a-001.pphosted.com", "fallback.outlook.com"],
                "v=spf1 include:spf.protection.outlook.com -all",
            ),
            &catalogue(),
        );
        assert_eq!(with_spf.secure_gateway, "proofpoint");
        assert_eq!(with_spf.provider, "microsoft 365");
    }

    #[test]
    fn unknown_mx_reports_bare_registrable_domain() {
        let providers = classify_domain(&bundle(&["mail.selfhosted.io"], ""), &catalogue());
        assert_eq!(providers.provider, "selfhosted.io");
    }

    #[test]
    fn spf_includes_group_by_category_with_dedup() {
        let spf = "v=spf1 include:_spf.google.com include:spf.mimecast.com \
                   include:sendgrid.net include:_spf.google.com ~all";
        let senders = authorized_senders(spf, &catalogue());
        assert_eq!(senders.enterprise, vec!["google workspace", "sendgrid"]);
        assert_eq!(senders.security, vec!["mimecast"]);
        assert!(senders.hosting.is_empty());
    }

    #[test]
    fn unknown_includes_are_dropped() {
        let senders = authorized_senders("v=spf1 include:spf.nobody.example -all", &catalogue());
        assert_eq!(senders, AuthorizedSenders::default());
    }

    #[test]
    fn provider_falls_back_enterprise_then_webmail_then_hosting() {
        let spf = "v=spf1 include:emailsrvr.secureserver.net include:mta7.am0.yahoodns.net -all";
        let providers = classify_domain(&bundle(&[], spf), &catalogue());
        assert_eq!(providers.provider, "yahoo");
    }

    #[test]
    fn spf_security_include_marks_firewalled() {
        let providers = classify_domain(
            &bundle(&["mail.selfhosted.io"], "v=spf1 include:pphosted.com -all"),
            &catalogue(),
        );
        assert_eq!(providers.provider, "selfhosted.io");
        assert_eq!(providers.secure_gateway, "proofpoint");
        assert!(providers.is_firewalled);
    }
}
