//! Validation requests and the generated sender identities they carry.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dns::DnsBundle;

const FIRST_NAMES: &[&str] = &[
    "emma", "liam", "olivia", "noah", "ava", "ethan", "sophia", "mason", "isabella", "william",
    "mia", "james", "charlotte", "benjamin", "amelia", "lucas", "harper", "henry", "evelyn",
    "alexander", "abigail", "michael", "emily", "daniel", "elizabeth", "jacob", "grace", "owen",
];

const LAST_NAMES: &[&str] = &[
    "smith", "johnson", "williams", "brown", "jones", "garcia", "miller", "davis", "rodriguez",
    "martinez", "wilson", "anderson", "thomas", "taylor", "moore", "jackson", "martin", "lee",
    "thompson", "white", "harris", "clark", "lewis", "robinson", "walker", "young", "allen",
    "king", "wright", "scott", "hill", "green", "adams", "nelson", "baker", "carter", "mitchell",
];

// Codename vocabulary for catch-all sentinels. Joined without a dash so the
// local part reads as one invented word.
const CODENAME_ADJECTIVES: &[&str] = &[
    "amber", "bold", "brisk", "calm", "coral", "crimson", "dusty", "eager", "fable", "gentle",
    "hazel", "indigo", "jolly", "keen", "lively", "mellow", "noble", "opal", "plucky", "quiet",
    "rustic", "silent", "tidal", "vivid", "wandering", "zesty",
];

const CODENAME_NOUNS: &[&str] = &[
    "falcon", "harbor", "meadow", "lantern", "otter", "pebble", "quartz", "raven", "saddle",
    "thicket", "urchin", "valley", "willow", "yonder", "zephyr", "badger", "cinder", "drift",
    "ember", "fjord", "grove", "heron", "islet", "juniper",
];

/// Immutable input for one validation.
///
/// The target email and sender domain must be non-empty; the sender email
/// and catch-all local part are generated when left empty.
#[derive(Debug, Clone, Default)]
pub struct ValidationRequest {
    /// Address under test.
    pub email: String,
    /// HELO argument.
    pub from_domain: String,
    /// MAIL FROM argument.
    pub from_email: String,
    /// Local part probed alongside the real address to detect catch-all
    /// domains.
    pub catch_all_local: String,
    /// Preloaded DNS bundle; probed on demand when absent.
    pub dns: Option<DnsBundle>,
    /// Primary-domain outcome from a prior domain check, used to suggest an
    /// alternate address.
    pub primary_context: Option<PrimaryDomainContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryDomainContext {
    pub is_primary_domain: bool,
    pub primary_domain: String,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("email is required")]
    EmailRequired,
    #[error("sender domain is required")]
    FromDomainRequired,
}

impl ValidationRequest {
    pub fn new(email: impl Into<String>, from_domain: impl Into<String>) -> Self {
        let from_domain = from_domain.into();
        Self {
            email: email.into(),
            from_email: generate_sender_email(&from_domain),
            catch_all_local: generate_catch_all_local(),
            from_domain,
            dns: None,
            primary_context: None,
        }
    }

    pub fn with_dns(mut self, bundle: DnsBundle) -> Self {
        self.dns = Some(bundle);
        self
    }

    pub fn with_primary_context(mut self, context: PrimaryDomainContext) -> Self {
        self.primary_context = Some(context);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), RequestError> {
        if self.email.trim().is_empty() {
            return Err(RequestError::EmailRequired);
        }
        if self.from_domain.trim().is_empty() {
            return Err(RequestError::FromDomainRequired);
        }
        Ok(())
    }

    /// The identities actually put on the wire; generated on the spot when
    /// a hand-built request left them empty.
    pub(crate) fn effective_identity(&self) -> SenderIdentity {
        SenderIdentity {
            from_email: if self.from_email.is_empty() {
                generate_sender_email(&self.from_domain)
            } else {
                self.from_email.clone()
            },
            catch_all_local: if self.catch_all_local.is_empty() {
                generate_catch_all_local()
            } else {
                self.catch_all_local.clone()
            },
        }
    }
}

pub(crate) struct SenderIdentity {
    pub from_email: String,
    pub catch_all_local: String,
}

/// A plausible personal address at the sending domain, so MAIL FROM does
/// not advertise the probe.
pub fn generate_sender_email(from_domain: &str) -> String {
    let mut rng = rand::thread_rng();
    let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("emma");
    let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("smith");
    format!("{first}.{last}@{from_domain}")
}

/// A dash-free codename local part for the catch-all probe.
pub fn generate_catch_all_local() -> String {
    let mut rng = rand::thread_rng();
    let adjective = CODENAME_ADJECTIVES.choose(&mut rng).copied().unwrap_or("amber");
    let noun = CODENAME_NOUNS.choose(&mut rng).copied().unwrap_or("falcon");
    format!("{adjective}{noun}")
}
