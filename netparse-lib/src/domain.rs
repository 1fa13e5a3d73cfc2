//! Public suffix decomposition of host names.
//!
//! A host is split at the boundary reported by a [`SuffixOracle`] into the
//! effective TLD, the second-level label in front of it, and whatever
//! subdomain labels remain on the left.
//!
//! ```rust
//! use netparse_lib::{parse_domain, Manager};
//!
//! let record = parse_domain("foo.bar.example.com").unwrap();
//! assert_eq!(record.domain, "example.com");
//! assert_eq!(record.subdomain, "foo.bar");
//! assert_eq!(record.manager, Manager::Icann);
//! ```

use crate::error::{DerivationCause, NetparseError};
use crate::suffix::{PublicSuffixList, SuffixOracle};
use crate::types::{DomainRecord, Manager};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Decompose `host` using the bundled public suffix list.
///
/// Hosts under an unknown TLD are accepted with [`Manager::None`]; use
/// [`parse_domain_strict`] to reject them.
pub fn parse_domain(host: &str) -> Result<DomainRecord> {
    parse_domain_with(&PublicSuffixList, host)
}

/// Decompose `host`, rejecting suffixes that nobody manages.
pub fn parse_domain_strict(host: &str) -> Result<DomainRecord> {
    let record = parse_domain(host)?;
    validate_managed(&record)?;
    Ok(record)
}

/// Decompose `host` against an injected suffix oracle.
///
/// # Errors
///
/// - [`NetparseError::MalformedHost`] when the host is empty, starts or ends
///   with a dot, or contains `..`
/// - [`NetparseError::SuffixDerivation`] when no label precedes the suffix or
///   the suffix does not start on a label boundary
pub fn parse_domain_with<O>(oracle: &O, host: &str) -> Result<DomainRecord>
where
    O: SuffixOracle + ?Sized,
{
    if has_empty_label(host) {
        return Err(NetparseError::malformed_host(host));
    }

    let matched = oracle
        .longest_suffix(host)
        .ok_or_else(|| NetparseError::suffix_derivation(host, "", DerivationCause::TooShort))?;

    let boundary = suffix_boundary(host, &matched.suffix)?;

    // Keep the host's own spelling of the suffix so the pieces always
    // reassemble into the input.
    let tld = &host[boundary + 1..];
    let left = &host[..boundary];
    let (subdomain, sld) = match left.rfind('.') {
        Some(dot) => (&left[..dot], &left[dot + 1..]),
        None => ("", left),
    };

    let record = DomainRecord {
        domain: format!("{}.{}", sld, tld),
        host: host.to_string(),
        manager: Manager::classify(matched.icann, &matched.suffix),
        sld: sld.to_string(),
        subdomain: subdomain.to_string(),
        tld: tld.to_string(),
    };

    debug!(
        host,
        domain = %record.domain,
        manager = %record.manager,
        "decomposed domain"
    );

    Ok(record)
}

/// Reject records whose suffix is neither ICANN nor a private registry.
pub fn validate_managed(record: &DomainRecord) -> Result<()> {
    if record.manager.is_managed() {
        Ok(())
    } else {
        Err(NetparseError::unmanaged_suffix(&record.host, &record.tld))
    }
}

/// Domain decomposer bound to one suffix oracle and one policy.
///
/// # Example
///
/// ```rust
/// use netparse_lib::{DomainParser, StaticSuffixList};
///
/// let oracle = StaticSuffixList::new().with_icann("test");
/// let parser = DomainParser::with_oracle(oracle).strict(true);
///
/// assert_eq!(parser.parse("www.example.test").unwrap().domain, "example.test");
/// assert!(parser.parse("nas.lan").is_err());
/// ```
#[derive(Clone)]
pub struct DomainParser {
    oracle: Arc<dyn SuffixOracle>,
    strict: bool,
}

impl DomainParser {
    /// Permissive parser over the bundled public suffix list.
    pub fn new() -> Self {
        Self::with_oracle(PublicSuffixList)
    }

    pub fn with_oracle<O: SuffixOracle + 'static>(oracle: O) -> Self {
        Self {
            oracle: Arc::new(oracle),
            strict: false,
        }
    }

    /// Reject unmanaged suffixes when `strict` is true.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn parse(&self, host: &str) -> Result<DomainRecord> {
        let record = parse_domain_with(self.oracle.as_ref(), host)?;
        if self.strict {
            validate_managed(&record)?;
        }
        Ok(record)
    }
}

impl Default for DomainParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DomainParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainParser")
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

fn has_empty_label(host: &str) -> bool {
    host.is_empty() || host.starts_with('.') || host.ends_with('.') || host.contains("..")
}

/// Byte index of the dot that separates the SLD from `suffix`.
fn suffix_boundary(host: &str, suffix: &str) -> Result<usize> {
    if host.len() <= suffix.len() {
        return Err(NetparseError::suffix_derivation(
            host,
            suffix,
            DerivationCause::TooShort,
        ));
    }

    let boundary = host.len() - suffix.len() - 1;
    let bytes = host.as_bytes();
    if bytes[boundary] != b'.' || !bytes[boundary + 1..].eq_ignore_ascii_case(suffix.as_bytes()) {
        return Err(NetparseError::suffix_derivation(
            host,
            suffix,
            DerivationCause::Unaligned,
        ));
    }

    Ok(boundary)
}
