//! Primary-vs-parked domain heuristic.
//!
//! A company's primary domain answers on the web, is not an alias, and
//! receives its own mail. Subdomains, redirect shells, and parked names
//! report the registrable domain they ultimately point at, so callers can
//! suggest `user@primary` instead.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dns::DnsProber;
use crate::syntax::{registrable_domain, root_and_subdomain};

// Shorteners whose targets we expand before judging the domain. Kept
// deliberately narrow; an open list would turn this into a crawler.
const URL_SHORTENERS: &[&str] = &["bit.ly", "hubs.ly"];

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const REDIRECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryDomain {
    pub is_primary: bool,
    /// The registrable domain to use instead, empty when unknown or when
    /// the domain is already primary.
    pub primary_domain: String,
}

pub fn primary_domain_check(prober: &DnsProber, domain: &str) -> PrimaryDomain {
    let mut name = domain.trim().trim_start_matches("http://").trim_start_matches("https://").to_ascii_lowercase();

    let mut expanded = false;
    if is_shortened(&name) {
        expanded = true;
        if let Some(target) = redirect_target(&name) {
            debug!(from = %name, to = %target, "expanded shortened url");
            name = target;
        }
    }

    let (root, subdomain) = root_and_subdomain(&name);

    if !can_connect(&root) {
        return PrimaryDomain::default();
    }

    let bundle = prober.probe(&root);
    let redirect = redirect_target(&root);

    // A link-in-bio aggregator is never a sensible mail domain to suggest.
    if redirect.as_deref() == Some("linktr.ee") {
        return PrimaryDomain::default();
    }

    match redirect {
        Some(target) => PrimaryDomain {
            is_primary: false,
            primary_domain: target,
        },
        None if bundle.cname.is_empty() && bundle.has_mx() && bundle.has_address => {
            if subdomain.is_empty() && !expanded {
                PrimaryDomain {
                    is_primary: true,
                    primary_domain: String::new(),
                }
            } else {
                PrimaryDomain {
                    is_primary: false,
                    primary_domain: root,
                }
            }
        }
        None => PrimaryDomain::default(),
    }
}

fn is_shortened(name: &str) -> bool {
    URL_SHORTENERS
        .iter()
        .any(|s| name == *s || name.starts_with(&format!("{s}/")))
}

/// Follow one HTTP(S) redirect by hand and report the registrable domain it
/// lands on, when that differs from the queried name.
fn redirect_target(name: &str) -> Option<String> {
    let client = Client::builder()
        .redirect(Policy::none())
        .timeout(REDIRECT_TIMEOUT)
        .build()
        .ok()?;

    for scheme in ["http", "https"] {
        let url = format!("{scheme}://{name}");
        let response = match client.get(&url).send() {
            Ok(response) => response,
            Err(_) => continue,
        };
        if !response.status().is_redirection() {
            continue;
        }
        let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
        else {
            continue;
        };
        // Relative redirects stay on the same host.
        if location.starts_with('/') {
            continue;
        }
        if let Some(host) = Url::parse(location).ok().and_then(|u| u.host_str().map(String::from)) {
            let target = registrable_domain(&host);
            if target != name {
                return Some(target);
            }
        }
    }
    None
}

fn can_connect(domain: &str) -> bool {
    for port in [80u16, 443] {
        let Ok(mut addrs) = (domain, port).to_socket_addrs() else {
            continue;
        };
        if let Some(addr) = addrs.next() {
            if TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok() {
                return true;
            }
        }
    }
    false
}
