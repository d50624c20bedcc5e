use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use crate::smtp::error::SmtpProbeError;

/// Outcome of reading the server banner.
pub(crate) enum Greeting {
    /// Clean `220` greeting; the session may proceed.
    Ready,
    /// Anything else; the offending line is surfaced and the host skipped.
    Abnormal(String),
}

/// One blocking SMTP connection. Commands and reads are strictly
/// sequential; every read is bounded by the probe deadline. Dropping the
/// session closes the socket, so every exit path releases the connection.
pub(crate) struct SmtpSession {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    deadline: Instant,
}

impl SmtpSession {
    pub(crate) fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        deadline: Instant,
    ) -> Result<Self, SmtpProbeError> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|source| SmtpProbeError::Connect {
                host: host.to_string(),
                source,
            })?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, connect_timeout) {
                Ok(stream) => {
                    let reader = BufReader::new(stream.try_clone().map_err(SmtpProbeError::io)?);
                    return Ok(Self {
                        stream,
                        reader,
                        deadline,
                    });
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(SmtpProbeError::Connect {
            host: host.to_string(),
            source: last_err.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::AddrNotAvailable, "no socket addresses resolved")
            }),
        })
    }

    /// Read the greeting. `220-` continuation lines are consumed until the
    /// terminal `220 ` line; any other prefix fails the host over.
    pub(crate) fn read_greeting(&mut self) -> Result<Greeting, SmtpProbeError> {
        loop {
            let line = self.read_line()?;
            if line.starts_with("220 ") || line == "220" {
                return Ok(Greeting::Ready);
            }
            if !line.starts_with("220-") {
                return Ok(Greeting::Abnormal(line));
            }
        }
    }

    /// Send one command and read exactly one reply line.
    pub(crate) fn command(&mut self, command: &str) -> Result<String, SmtpProbeError> {
        let remaining = self.remaining_time()?;
        self.stream
            .set_write_timeout(Some(remaining))
            .map_err(SmtpProbeError::io)?;

        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line).map_err(SmtpProbeError::io)?;
        self.stream.flush().map_err(SmtpProbeError::io)?;

        self.read_line()
    }

    fn read_line(&mut self) -> Result<String, SmtpProbeError> {
        let remaining = self.remaining_time()?;
        self.reader
            .get_ref()
            .set_read_timeout(Some(remaining))
            .map_err(SmtpProbeError::io)?;

        let mut raw = String::new();
        let read = self.reader.read_line(&mut raw).map_err(SmtpProbeError::io)?;
        if read == 0 {
            return Err(SmtpProbeError::io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while reading reply",
            )));
        }
        while raw.ends_with('\n') || raw.ends_with('\r') {
            raw.pop();
        }
        Ok(raw)
    }

    fn remaining_time(&self) -> Result<Duration, SmtpProbeError> {
        self.deadline
            .checked_duration_since(Instant::now())
            .filter(|left| !left.is_zero())
            .ok_or(SmtpProbeError::DeadlineExceeded)
    }
}
