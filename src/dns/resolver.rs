use trust_dns_resolver::Resolver;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::rr::{RData, RecordType};

/// One MX record before normalization into the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxHost {
    pub preference: u16,
    pub exchange: String,
}

impl MxHost {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Record lookups the probe needs, behind a trait so tests can stub DNS.
pub(crate) trait RecordLookup {
    fn mx(&self, domain: &str) -> Result<Vec<MxHost>, ResolveError>;
    fn txt(&self, domain: &str) -> Result<Vec<String>, ResolveError>;
    fn cname(&self, domain: &str) -> Result<Option<String>, ResolveError>;
    fn has_address(&self, domain: &str) -> Result<bool, ResolveError>;
}

impl RecordLookup for Resolver {
    fn mx(&self, domain: &str) -> Result<Vec<MxHost>, ResolveError> {
        let lookup = match self.mx_lookup(domain) {
            Ok(lookup) => lookup,
            Err(err) if is_no_records(&err) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        Ok(lookup
            .iter()
            .map(|mx| MxHost::new(mx.preference(), mx.exchange().to_utf8()))
            .collect())
    }

    fn txt(&self, domain: &str) -> Result<Vec<String>, ResolveError> {
        let lookup = match self.txt_lookup(domain) {
            Ok(lookup) => lookup,
            Err(err) if is_no_records(&err) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let mut records = Vec::new();
        for txt in lookup.iter() {
            let mut record = String::new();
            for piece in txt.txt_data().iter() {
                record.push_str(&String::from_utf8_lossy(piece.as_ref()));
            }
            records.push(record);
        }
        Ok(records)
    }

    fn cname(&self, domain: &str) -> Result<Option<String>, ResolveError> {
        let lookup = match self.lookup(domain, RecordType::CNAME) {
            Ok(lookup) => lookup,
            Err(err) if is_no_records(&err) => return Ok(None),
            Err(err) => return Err(err),
        };
        Ok(lookup.iter().find_map(|rdata| match rdata {
            RData::CNAME(name) => Some(name.0.to_utf8()),
            _ => None,
        }))
    }

    fn has_address(&self, domain: &str) -> Result<bool, ResolveError> {
        match self.lookup_ip(domain) {
            Ok(lookup) => Ok(lookup.iter().next().is_some()),
            Err(err) if is_no_records(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn is_no_records(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}
