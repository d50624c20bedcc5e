//! Bulk CSV validation with checkpointed resume.
//!
//! Input: one header row, one column of addresses. Output: one row per
//! input with the flattened verification fields. A sidecar
//! `validation_checkpoint.json` records how many rows are done so an
//! interrupted run picks up where it left off.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use mailscout::{Verifier, VerifyReport};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::args::Cli;

const BATCH_SIZE: usize = 10;
const CHECKPOINT_FILE: &str = "validation_checkpoint.json";

const OUTPUT_HEADER: &[&str] = &[
    "email",
    "user",
    "domain",
    "is_valid_syntax",
    "is_deliverable",
    "provider",
    "firewall",
    "is_risky",
    "is_firewalled",
    "is_free_account",
    "is_role_account",
    "is_mailbox_full",
    "is_catch_all",
    "smtp_status_code",
    "smtp_enhanced_code",
    "smtp_description",
];

#[derive(Debug, Default, Serialize, Deserialize)]
struct Checkpoint {
    #[serde(rename = "processedRows")]
    processed_rows: usize,
}

pub fn run(verifier: &Verifier, cli: &Cli, input: &Path, output: &Path) -> Result<()> {
    let mut checkpoint = load_checkpoint(Path::new(CHECKPOINT_FILE))?;
    if checkpoint.processed_rows > 0 {
        info!(rows = checkpoint.processed_rows, "resuming from checkpoint");
    }

    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let mut records = reader.records();

    // The header row is consumed by the reader; skip what's already done.
    for _ in 0..checkpoint.processed_rows {
        if records.next().is_none() {
            break;
        }
    }

    let append = output.exists();
    let out_file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(output)
        .with_context(|| format!("opening {}", output.display()))?;
    let mut writer = csv::Writer::from_writer(out_file);
    if !append {
        writer.write_record(OUTPUT_HEADER)?;
    }

    // Catch-all behaviour is per domain; one probe per domain is enough.
    let mut catch_all_memo: HashMap<String, bool> = HashMap::new();

    loop {
        let mut batch = Vec::with_capacity(BATCH_SIZE);
        for record in records.by_ref().take(BATCH_SIZE) {
            match record {
                Ok(record) => {
                    if let Some(email) = record.get(0) {
                        if !email.trim().is_empty() {
                            batch.push(email.trim().to_string());
                        }
                    }
                }
                Err(err) => warn!(%err, "skipping malformed csv record"),
            }
        }
        if batch.is_empty() {
            break;
        }

        for email in &batch {
            let report = verify_one(verifier, cli, email, &mut catch_all_memo);
            writer.write_record(report_row(&report))?;
        }
        writer.flush()?;

        checkpoint.processed_rows += batch.len();
        save_checkpoint(Path::new(CHECKPOINT_FILE), &checkpoint)?;
        info!(rows = checkpoint.processed_rows, "bulk progress");
    }

    Ok(())
}

fn verify_one(
    verifier: &Verifier,
    cli: &Cli,
    email: &str,
    catch_all_memo: &mut HashMap<String, bool>,
) -> VerifyReport {
    let request = cli.request_for(email);
    let domain = verifier.verify_syntax(email).domain;
    let known = (!domain.is_empty())
        .then(|| catch_all_memo.get(&domain).copied())
        .flatten();

    let report = verifier.verify_with_known_catch_all(&request, known);

    if known.is_none() && report.is_valid_syntax && !domain.is_empty() {
        catch_all_memo.insert(domain, report.risk.is_catch_all);
    }
    if let Some(err) = &report.error {
        warn!(email, error = err.as_str(), "validation error");
    }
    report
}

fn report_row(report: &VerifyReport) -> Vec<String> {
    vec![
        report.email.clone(),
        report.syntax.user.clone(),
        report.syntax.domain.clone(),
        report.is_valid_syntax.to_string(),
        report.is_deliverable.to_string(),
        report.provider.clone(),
        report.firewall.clone(),
        report.is_risky.to_string(),
        report.risk.is_firewalled.to_string(),
        report.risk.is_free_account.to_string(),
        report.risk.is_role_account.to_string(),
        report.risk.is_mailbox_full.to_string(),
        report.risk.is_catch_all.to_string(),
        report.smtp.response.status_code.clone(),
        report.smtp.response.enhanced_status_code.clone(),
        report.smtp.response.description.clone(),
    ]
}

fn load_checkpoint(path: &Path) -> Result<Checkpoint> {
    match File::open(path) {
        Ok(file) => {
            serde_json::from_reader(BufReader::new(file)).context("reading checkpoint file")
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Checkpoint::default()),
        Err(err) => Err(err).context("opening checkpoint file"),
    }
}

fn save_checkpoint(path: &Path, checkpoint: &Checkpoint) -> Result<()> {
    let file = File::create(path).context("creating checkpoint file")?;
    serde_json::to_writer(file, checkpoint).context("writing checkpoint file")?;
    Ok(())
}
