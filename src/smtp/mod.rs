//! SMTP probing over TCP port 25.
//!
//! The public entry point is [`probe_mailbox`], which dials the bundle's MX
//! hosts in preference order and walks the HELO → MAIL FROM → RCPT TO
//! handshake without ever sending a message. STARTTLS, AUTH, and DATA are
//! never issued; servers demanding encryption are reported, not negotiated
//! with.

mod error;
mod options;
mod probe;
mod response;
mod session;

pub use error::SmtpProbeError;
pub use options::SmtpProbeOptions;
pub use probe::probe_mailbox;
pub use response::SmtpResponse;
