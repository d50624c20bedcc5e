mod args;
mod bulk;
mod output;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mailscout::Verifier;
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Version = cli.cmd {
        println!("mailscout {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let verifier = Verifier::from_bundled_data().context("loading bundled reference data")?;

    match &cli.cmd {
        Commands::Email(argv) => {
            let email = single_email(argv)?;
            let report = verifier.verify(&cli.request_for(&email));
            output::print_json(&report)
        }
        Commands::Domain { domain } => {
            let request = cli.request_for(&format!("user@{domain}"));
            let report = verifier.verify_domain(&request);
            output::print_json(&report)
        }
        Commands::Syntax { email } => output::print_json(&verifier.verify_syntax(email)),
        Commands::Bulk { input, output } => bulk::run(&verifier, &cli, input, output),
        Commands::Version => unreachable!("handled before data loading"),
    }
}

fn single_email(argv: &[String]) -> Result<String> {
    match argv {
        [email] => Ok(email.clone()),
        [] => bail!("no email address given"),
        _ => bail!("expected a single email address; place options before it"),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}
