//! Core data types produced by the parsers.
//!
//! Every record is built fresh for a single call and owned by the caller.
//! Field names match the attribute names exposed to function hosts.

use serde::{Deserialize, Serialize};

/// Who controls allocation under a public suffix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Manager {
    /// Suffix delegated through the ICANN root (e.g. "com", "co.uk")
    #[serde(rename = "ICANN")]
    Icann,

    /// Multi-label suffix registered privately (e.g. "github.io")
    #[serde(rename = "Private")]
    Private,

    /// Unrecognized top-level label, usually an internal hostname
    #[serde(rename = "None")]
    None,
}

impl Manager {
    /// Classify a suffix from the oracle's ICANN flag and the suffix shape.
    ///
    /// A non-ICANN suffix only counts as privately managed when it spans
    /// more than one label; a bare unknown label is unmanaged.
    pub fn classify(icann: bool, suffix: &str) -> Self {
        if icann {
            Manager::Icann
        } else if suffix.contains('.') {
            Manager::Private
        } else {
            Manager::None
        }
    }

    /// String form used in records and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Manager::Icann => "ICANN",
            Manager::Private => "Private",
            Manager::None => "None",
        }
    }

    /// Whether some registry (ICANN or private) manages the suffix.
    pub fn is_managed(&self) -> bool {
        !matches!(self, Manager::None)
    }
}

impl std::fmt::Display for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public suffix decomposition of a host.
///
/// `subdomain + "." + domain == host` whenever `subdomain` is non-empty,
/// and `domain == host` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainRecord {
    /// The registrable domain: `sld + "." + tld`
    pub domain: String,

    /// The host that was parsed
    pub host: String,

    /// Who manages the effective TLD
    pub manager: Manager,

    /// The single label left of the effective TLD
    pub sld: String,

    /// Labels of the host left of the domain, empty when host == domain
    pub subdomain: String,

    /// The effective top-level domain (public suffix)
    pub tld: String,
}

/// Components of a URL.
///
/// `protocol`, `search` and `hash` are rendering conveniences derived from
/// `scheme`, `query` and `fragment`; each is empty exactly when its source is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UrlRecord {
    /// The URL that was parsed
    pub url: String,

    /// `[credentials "@"] host [":" port]`
    pub authority: String,

    /// `scheme + ":"`
    pub protocol: String,

    pub scheme: String,

    /// Percent-encoded `username[:password]`
    pub credentials: String,

    /// Decoded username
    pub username: String,

    /// Decoded password
    pub password: String,

    /// Host without brackets, for IPv6 literals too
    pub host: String,

    pub port: String,

    pub path: String,

    /// `"?" + query`, or empty
    pub search: String,

    pub query: String,

    /// `"#" + fragment`, or empty
    pub hash: String,

    pub fragment: String,
}

/// An address in CIDR notation split into host address and network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CidrRecord {
    /// The CIDR string that was parsed
    pub cidr: String,

    /// Canonical form of the address part
    pub ip: String,

    /// Canonical network prefix with host bits cleared
    pub network: String,
}
