use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mailscout::ValidationRequest;

#[derive(Parser)]
#[command(
    name = "mailscout",
    version,
    about = "Verify email deliverability via syntax, DNS, and a live SMTP probe",
    after_help = "Run `mailscout <email>` to verify a single address end to end.\n\
                  Options must precede the address or subcommand."
)]
pub struct Cli {
    /// Sending domain used for HELO. Defaults to example.com; set your own
    /// via --from-domain or the MAIL_SERVER_DOMAIN environment variable.
    #[arg(long, env = "MAIL_SERVER_DOMAIN", default_value = "example.com")]
    pub from_domain: String,

    /// MAIL FROM address; a plausible first.last@from-domain is generated
    /// when unset.
    #[arg(long)]
    pub from_email: Option<String>,

    /// Local part for the catch-all probe; a random codename is generated
    /// when unset.
    #[arg(long)]
    pub catch_all_user: Option<String>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a domain: provider, firewall, catch-all, primary domain.
    Domain { domain: String },
    /// Validate address syntax only; no network traffic.
    Syntax { email: String },
    /// Validate a CSV of addresses (one column, header row), resumable via
    /// validation_checkpoint.json.
    Bulk {
        input: PathBuf,
        output: PathBuf,
    },
    /// Print the version.
    Version,
    /// Bare address: full verification of a single email.
    #[command(external_subcommand)]
    Email(Vec<String>),
}

impl Cli {
    /// Assemble a validation request for `email` from the CLI's sender
    /// options.
    pub fn request_for(&self, email: &str) -> ValidationRequest {
        let mut request = ValidationRequest::new(email, &self.from_domain);
        if let Some(from_email) = &self.from_email {
            request.from_email = from_email.clone();
        }
        if let Some(catch_all_user) = &self.catch_all_user {
            request.catch_all_local = catch_all_user.clone();
        }
        request
    }
}
