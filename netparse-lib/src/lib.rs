//! # Netparse Library
//!
//! Decompose domains, URLs and CIDR blocks into their named components.
//!
//! Every parser is a pure, synchronous function of its input: no I/O, no
//! shared mutable state, safe to call from any number of threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use netparse_lib::{contains_ip, parse_cidr, parse_domain, parse_url, Manager};
//!
//! let domain = parse_domain("foo.bar.example.com").unwrap();
//! assert_eq!(domain.sld, "example");
//! assert_eq!(domain.manager, Manager::Icann);
//!
//! let url = parse_url("https://example.com:8443/search?q=rust").unwrap();
//! assert_eq!(url.authority, "example.com:8443");
//!
//! let cidr = parse_cidr("2001:db8:a0b:12f0::1/32").unwrap();
//! assert_eq!(cidr.network, "2001:db8::/32");
//!
//! assert!(!contains_ip("192.0.2.0/24", "192.1.0.0").unwrap());
//! ```
//!
//! ## Public suffix oracle
//!
//! Domain decomposition asks a [`SuffixOracle`] where the public suffix
//! starts. [`PublicSuffixList`] uses the list bundled with the `psl` crate;
//! [`StaticSuffixList`] builds a small rule set for tests and
//! [`SharedSuffixList`] allows swapping rule sets at runtime.

// Re-export main public API types and functions
pub use cidr::{contains_ip, parse_cidr};
pub use config::{
    env_config_from, load_env_config, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    OutputConfig, OutputFormat, Settings,
};
pub use domain::{
    parse_domain, parse_domain_strict, parse_domain_with, validate_managed, DomainParser,
};
pub use error::{DerivationCause, NetparseError};
pub use suffix::{PublicSuffixList, SharedSuffixList, StaticSuffixList, SuffixMatch, SuffixOracle};
pub use types::{CidrRecord, DomainRecord, Manager, UrlRecord};
pub use self::url::{parse_url, render_authority};

// Public modules
pub mod functions;

// Internal modules - their items are re-exported above
mod cidr;
mod config;
mod domain;
mod error;
mod suffix;
mod types;
mod url;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, NetparseError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        author: AUTHOR,
        functions: functions::function_specs()
            .into_iter()
            .map(|spec| spec.name)
            .collect(),
    }
}

/// Information about the library build
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub author: &'static str,
    pub functions: Vec<&'static str>,
}
