use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmtpProbeError {
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("probe deadline exceeded")]
    DeadlineExceeded,
}

impl SmtpProbeError {
    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}
