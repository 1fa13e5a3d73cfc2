//! Error handling for parsing operations.
//!
//! This module defines a single error type that covers every way a domain,
//! URL or CIDR input can be rejected, plus the configuration and adapter
//! failures that surround the parsers.

use std::fmt;

/// Why a public suffix could not be turned into a registrable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationCause {
    /// The host has no label left of the matched suffix.
    TooShort,
    /// The suffix does not start on a label boundary of the host.
    Unaligned,
}

/// Main error type for parsing operations.
///
/// Each variant carries the offending input so the rendered message
/// identifies both the value and the rule it violated.
#[derive(Debug, Clone, PartialEq)]
pub enum NetparseError {
    /// Domain input has an empty label (leading, trailing or double dot)
    MalformedHost { host: String },

    /// The public suffix could not be used to derive eTLD+1
    SuffixDerivation {
        host: String,
        suffix: String,
        cause: DerivationCause,
    },

    /// The suffix is neither ICANN nor a recognized private suffix
    UnmanagedSuffix { host: String, suffix: String },

    /// Invalid URL syntax, including a missing scheme
    MalformedUrl { url: String, message: String },

    /// Invalid CIDR notation
    MalformedCidr { cidr: String, message: String },

    /// Invalid network argument of a containment check
    MalformedNetwork { network: String, message: String },

    /// Invalid bare IP address
    MalformedAddress { address: String },

    /// A required function argument was null
    NullArgument { name: String },

    /// No function is registered under this name
    UnknownFunction { name: String },

    /// A function was invoked with the wrong number of arguments
    InvalidArgumentCount {
        function: String,
        expected: usize,
        received: usize,
    },

    /// Configuration errors (invalid settings, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading configuration or input lists
    FileError { path: String, message: String },
}

impl NetparseError {
    /// Create a new malformed host error.
    pub fn malformed_host<H: Into<String>>(host: H) -> Self {
        Self::MalformedHost { host: host.into() }
    }

    /// Create a new suffix derivation error.
    pub fn suffix_derivation<H: Into<String>, S: Into<String>>(
        host: H,
        suffix: S,
        cause: DerivationCause,
    ) -> Self {
        Self::SuffixDerivation {
            host: host.into(),
            suffix: suffix.into(),
            cause,
        }
    }

    /// Create a new unmanaged suffix error.
    pub fn unmanaged_suffix<H: Into<String>, S: Into<String>>(host: H, suffix: S) -> Self {
        Self::UnmanagedSuffix {
            host: host.into(),
            suffix: suffix.into(),
        }
    }

    /// Create a new malformed URL error.
    pub fn malformed_url<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::MalformedUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a new malformed CIDR error.
    pub fn malformed_cidr<C: Into<String>, M: Into<String>>(cidr: C, message: M) -> Self {
        Self::MalformedCidr {
            cidr: cidr.into(),
            message: message.into(),
        }
    }

    /// Create a new malformed network error.
    pub fn malformed_network<N: Into<String>, M: Into<String>>(network: N, message: M) -> Self {
        Self::MalformedNetwork {
            network: network.into(),
            message: message.into(),
        }
    }

    /// Create a new malformed address error.
    pub fn malformed_address<A: Into<String>>(address: A) -> Self {
        Self::MalformedAddress {
            address: address.into(),
        }
    }

    /// Create a new null argument error.
    pub fn null_argument<N: Into<String>>(name: N) -> Self {
        Self::NullArgument { name: name.into() }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error was caused by the value a caller passed in.
    ///
    /// Configuration, file and adapter failures return `false`.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedHost { .. }
                | Self::SuffixDerivation { .. }
                | Self::UnmanagedSuffix { .. }
                | Self::MalformedUrl { .. }
                | Self::MalformedCidr { .. }
                | Self::MalformedNetwork { .. }
                | Self::MalformedAddress { .. }
                | Self::NullArgument { .. }
        )
    }
}

impl fmt::Display for NetparseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHost { host } => {
                write!(f, "empty label in domain {:?}", host)
            }
            Self::SuffixDerivation {
                host,
                suffix,
                cause,
            } => match cause {
                DerivationCause::TooShort => {
                    write!(f, "cannot derive eTLD+1 for domain {:?}", host)
                }
                DerivationCause::Unaligned => {
                    write!(f, "invalid public suffix {:?} for domain {:?}", suffix, host)
                }
            },
            Self::UnmanagedSuffix { host, suffix } => {
                write!(
                    f,
                    "unsupported manager: None (suffix {:?} of {:?})",
                    suffix, host
                )
            }
            Self::MalformedUrl { url, message } => {
                write!(f, "parse {:?}: {}", url, message)
            }
            Self::MalformedCidr { cidr, message } => {
                write!(f, "invalid CIDR address: {} ({})", cidr, message)
            }
            Self::MalformedNetwork { network, message } => {
                write!(f, "invalid network {:?}: {}", network, message)
            }
            Self::MalformedAddress { address } => {
                write!(f, "failed to parse IP address: {}", address)
            }
            Self::NullArgument { name } => {
                write!(f, "argument must not be null: {}", name)
            }
            Self::UnknownFunction { name } => {
                write!(f, "unknown function '{}'", name)
            }
            Self::InvalidArgumentCount {
                function,
                expected,
                received,
            } => {
                write!(
                    f,
                    "function '{}' expects {} argument(s), received {}",
                    function, expected, received
                )
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for NetparseError {}

impl From<serde_json::Error> for NetparseError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for NetparseError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_host_message() {
        let err = NetparseError::malformed_host("foo..com");
        assert_eq!(err.to_string(), "empty label in domain \"foo..com\"");
    }

    #[test]
    fn test_derivation_messages_name_the_cause() {
        let short = NetparseError::suffix_derivation("com", "com", DerivationCause::TooShort);
        assert_eq!(short.to_string(), "cannot derive eTLD+1 for domain \"com\"");

        let unaligned =
            NetparseError::suffix_derivation("example.com", "ample.com", DerivationCause::Unaligned);
        assert_eq!(
            unaligned.to_string(),
            "invalid public suffix \"ample.com\" for domain \"example.com\""
        );
    }

    #[test]
    fn test_null_argument_message() {
        let err = NetparseError::null_argument("host");
        assert!(err.to_string().contains("argument must not be null"));
    }

    #[test]
    fn test_is_input_error() {
        assert!(NetparseError::malformed_address("x").is_input_error());
        assert!(NetparseError::null_argument("ip").is_input_error());
        assert!(!NetparseError::config("bad").is_input_error());
        assert!(!NetparseError::file_error("a.toml", "missing").is_input_error());
        assert!(!NetparseError::UnknownFunction {
            name: "parse_email".to_string()
        }
        .is_input_error());
    }
}
