//! Optional enrichment for greylist/blacklist verdicts: the sender's own
//! public IP, fetched from an echo service behind a short timeout. Never
//! gates a verdict; failures are logged and leave the field empty.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::warn;

const IP_ECHO_ENDPOINT: &str = "https://api.ipify.org";
const IP_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn sender_public_ip() -> Option<String> {
    let client = match reqwest::blocking::Client::builder()
        .timeout(IP_LOOKUP_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            warn!(%err, "could not build ip lookup client");
            return None;
        }
    };

    match client
        .get(IP_ECHO_ENDPOINT)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
    {
        Ok(body) => {
            let ip = body.trim().to_string();
            (!ip.is_empty()).then_some(ip)
        }
        Err(err) => {
            warn!(%err, "unable to resolve sender public ip");
            None
        }
    }
}

/// Epoch seconds `minutes` from now.
pub(crate) fn epoch_seconds_after(minutes: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    now + minutes * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_timestamps_are_in_the_future() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let after = epoch_seconds_after(6);
        assert!(after > now);
        assert!(after >= now + 360);
    }
}
