use std::time::Instant;

use tracing::debug;

use crate::dns::DnsBundle;
use crate::smtp::options::SmtpProbeOptions;
use crate::smtp::response::{SmtpResponse, split_reply};
use crate::smtp::session::{Greeting, SmtpSession};

/// Probe whether a mail exchanger accepts `target_email`, walking the
/// bundle's MX hosts in preference order and running the minimal
/// HELO → MAIL FROM → RCPT TO dialogue on the first host that greets with
/// a clean `220`.
///
/// Never fails: connection problems and protocol rejections all come back
/// as an [`SmtpResponse`] for the verdict engine to classify.
pub fn probe_mailbox(
    target_email: &str,
    helo_domain: &str,
    mail_from: &str,
    bundle: &DnsBundle,
    options: &SmtpProbeOptions,
) -> SmtpResponse {
    if !bundle.has_mx() {
        return SmtpResponse::no_mx_records();
    }

    let deadline = Instant::now() + options.probe_deadline();
    let mut last_abnormal: Option<String> = None;

    for host in &bundle.mx {
        let mut session =
            match SmtpSession::connect(host, options.port, options.connect_timeout(), deadline) {
                Ok(session) => session,
                Err(err) => {
                    debug!(%host, %err, "smtp connect failed");
                    continue;
                }
            };

        match session.read_greeting() {
            Ok(Greeting::Ready) => {
                debug!(%host, "smtp session established");
                return run_handshake(&mut session, target_email, helo_domain, mail_from);
            }
            Ok(Greeting::Abnormal(line)) => {
                debug!(%host, %line, "abnormal smtp greeting");
                last_abnormal = Some(line);
            }
            Err(err) => {
                debug!(%host, %err, "failed to read smtp greeting");
            }
        }
    }

    let last_status = last_abnormal
        .map(|line| split_reply(&line).0)
        .unwrap_or_default();
    SmtpResponse::unreachable(last_status)
}

fn run_handshake(
    session: &mut SmtpSession,
    target_email: &str,
    helo_domain: &str,
    mail_from: &str,
) -> SmtpResponse {
    let helo = format!("HELO {helo_domain}");
    let reply = match session.command(&helo) {
        Ok(reply) => reply,
        Err(err) => return SmtpResponse::connection_lost(err),
    };
    if !reply.starts_with("250") {
        return SmtpResponse::parse(&reply);
    }

    let mail_from = format!("MAIL FROM:<{mail_from}>");
    let reply = match session.command(&mail_from) {
        Ok(reply) => reply,
        Err(err) => return SmtpResponse::connection_lost(err),
    };
    if !reply.starts_with("250") {
        return SmtpResponse::parse(&reply);
    }

    let rcpt_to = format!("RCPT TO:<{target_email}>");
    match session.command(&rcpt_to) {
        Ok(reply) => SmtpResponse::parse(&reply),
        Err(err) => SmtpResponse::connection_lost(err),
    }
}
