use once_cell::sync::Lazy;
use publicsuffix::{List, Psl, Type};

static SUFFIX_LIST: Lazy<List> = Lazy::new(List::new);

// Multi-label public suffixes that must not be split when deriving the
// registrable domain, kept for when the suffix list cannot resolve a name.
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "me.uk", "ac.uk", "gov.uk", "net.uk", "sch.uk", "co.jp", "or.jp", "ne.jp",
    "ac.jp", "go.jp", "com.au", "net.au", "org.au", "edu.au", "gov.au", "co.nz", "net.nz",
    "org.nz", "govt.nz", "com.br", "org.br", "net.br", "gov.br", "co.in", "net.in", "org.in",
    "com.cn", "net.cn", "org.cn", "com.mx", "com.sg", "com.tr", "com.ar", "co.za",
];

/// Validate a domain name: label grammar plus an ICANN-recognized suffix.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    for label in &labels {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }

    has_icann_suffix(domain)
}

fn has_icann_suffix(domain: &str) -> bool {
    match SUFFIX_LIST.suffix(domain.as_bytes()) {
        Some(suffix) if suffix.typ() == Some(Type::Icann) => true,
        // The suffix list cannot vouch for the name; accept a plain
        // alphabetic TLD of two or more characters rather than rejecting
        // every address outright.
        _ => {
            let last = domain.rsplit('.').next().unwrap_or("");
            last.len() >= 2 && last.chars().all(|c| c.is_ascii_alphabetic())
        }
    }
}

/// Extract the registrable domain (eTLD+1) from a hostname or URL-ish input.
///
/// `mx1.mail.foo.co.uk` becomes `foo.co.uk`. Inputs that cannot be parsed
/// come back unchanged (lowercased, dot-trimmed) rather than failing.
pub fn registrable_domain(host: &str) -> String {
    let trimmed = host.trim().trim_end_matches('.').to_ascii_lowercase();
    let host = trimmed
        .strip_prefix("www.")
        .map(str::to_string)
        .unwrap_or(trimmed);

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host;
    }

    for suffix in MULTI_LABEL_SUFFIXES {
        if ends_with_suffix(&host, suffix) {
            let needed = suffix.split('.').count() + 1;
            if labels.len() >= needed {
                return labels[labels.len() - needed..].join(".");
            }
            return host;
        }
    }

    match SUFFIX_LIST.domain(host.as_bytes()) {
        Some(domain) => String::from_utf8_lossy(domain.as_bytes()).into_owned(),
        None => labels[labels.len() - 2..].join("."),
    }
}

/// Split a hostname into its registrable root and the subdomain prefix.
/// `mail.corp.example.com` yields `("example.com", "mail.corp")`.
pub fn root_and_subdomain(host: &str) -> (String, String) {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    let root = registrable_domain(&host);
    let subdomain = host
        .strip_suffix(root.as_str())
        .map(|prefix| prefix.trim_end_matches('.'))
        .unwrap_or("")
        .to_string();
    (root, subdomain)
}

fn ends_with_suffix(host: &str, suffix: &str) -> bool {
    host == suffix
        || (host.ends_with(suffix) && host.as_bytes()[host.len() - suffix.len() - 1] == b'.')
}
