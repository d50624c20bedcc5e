use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing knobs for the SMTP probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpProbeOptions {
    pub port: u16,
    /// TCP dial timeout per MX host.
    pub connect_timeout_ms: u64,
    /// Deadline for one whole probe, covering every read and write on the
    /// connection (the multi-line greeting included).
    pub probe_deadline_ms: u64,
}

impl Default for SmtpProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            connect_timeout_ms: 10_000,
            probe_deadline_ms: 30_000,
        }
    }
}

impl SmtpProbeOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn probe_deadline(&self) -> Duration {
        Duration::from_millis(self.probe_deadline_ms)
    }
}
