//! Function registry and host-agnostic invocation.
//!
//! Function hosts (the MCP server, the CLI) see the parsers as named
//! functions taking string arguments. This module owns the schema metadata
//! for those functions and the argument policy every host shares:
//!
//! - a null argument rejects the call before any parser runs
//! - an argument whose value is not known yet defers the call
//! - otherwise the parser runs and its record is returned as JSON

use crate::cidr::{contains_ip, parse_cidr};
use crate::domain::DomainParser;
use crate::error::NetparseError;
use crate::url::parse_url;
use crate::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

pub const PARSE_DOMAIN: &str = "parse_domain";
pub const PARSE_URL: &str = "parse_url";
pub const PARSE_CIDR: &str = "parse_cidr";
pub const CONTAINS_IP: &str = "contains_ip";

const DOMAIN_DESCRIPTION: &str = "Parses Public Suffix List properties from a domain. It uses the [psl](https://docs.rs/psl) crate to find the public suffix. For more details on the domain parts, see [What is a Domain Name?](https://developer.mozilla.org/en-US/docs/Learn/Common_questions/Web_mechanics/What_is_a_domain_name).";
const URL_DESCRIPTION: &str = "Parses URL components from a URL string. It uses the [url](https://docs.rs/url) crate to parse the URL. For more details on the URL components, see [What is a URL?](https://developer.mozilla.org/en-US/docs/Learn/Common_questions/What_is_a_URL) and [WHATWG URL Standard](https://url.spec.whatwg.org/#api).";
const CIDR_DESCRIPTION: &str = "Parses an IP address and prefix length in CIDR notation. It uses the [ipnet](https://docs.rs/ipnet) crate to parse the CIDR. For more details in CIDR notation, see [RFC 4632](https://rfc-editor.org/rfc/rfc4632.html) and [RFC 4291](https://rfc-editor.org/rfc/rfc4291.html).";
const CONTAINS_IP_DESCRIPTION: &str = "Checks if an IP address is within a network.";

/// Schema of one function parameter.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Schema of one attribute of a returned object.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Shape of a function's return value.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "attributes", rename_all = "lowercase")]
pub enum ReturnSpec {
    Object(Vec<AttributeSpec>),
    Bool,
}

/// Schema metadata of one function.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub summary: &'static str,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    pub returns: ReturnSpec,
}

/// State of an argument as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Known(String),
    Null,
    /// The host has not computed the value yet
    Unknown,
}

impl From<Option<String>> for Argument {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) => Argument::Known(v),
            None => Argument::Null,
        }
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Known(value.to_string())
    }
}

/// Outcome of a function call that passed argument checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Value(Value),
    /// At least one argument was unknown; the host should call again later
    Deferred,
}

impl Invocation {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Invocation::Value(v) => Some(v),
            Invocation::Deferred => None,
        }
    }
}

fn attr(name: &'static str, description: &'static str) -> AttributeSpec {
    AttributeSpec { name, description }
}

fn param(name: &'static str, description: &'static str) -> ParameterSpec {
    ParameterSpec { name, description }
}

fn describe_function(description: &str, data_source: &str) -> String {
    format!(
        "{} The functionality is equivalent to the `{}` data source.",
        description, data_source
    )
}

lazy_static::lazy_static! {
    static ref REGISTRY: HashMap<&'static str, FunctionSpec> = {
        let specs = vec![
            FunctionSpec {
                name: PARSE_DOMAIN,
                summary: "Parse the parts of a domain",
                description: describe_function(DOMAIN_DESCRIPTION, "netparse_domain"),
                parameters: vec![param("host", "The host that identifies the domain name.")],
                returns: ReturnSpec::Object(vec![
                    attr("domain", "The domain name. It's the tld plus one more label."),
                    attr("host", "The host that identifies the domain name."),
                    attr("manager", "The manager is the entity that manages the domain. It can be one of: ICANN, Private, or None."),
                    attr("sld", "The second-level domain (SLD) is the label to the left of the effective TLD."),
                    attr("subdomain", "The subdomain is the left part of the host that is not the domain."),
                    attr("tld", "The effective top-level domain (eTLD) of the domain. This is the public suffix of the domain."),
                ]),
            },
            FunctionSpec {
                name: PARSE_URL,
                summary: "Parse the parts of a URL",
                description: describe_function(URL_DESCRIPTION, "netparse_url"),
                parameters: vec![param("url", "The URL to parse.")],
                returns: ReturnSpec::Object(vec![
                    attr("url", "The URL to parse."),
                    attr("authority", "The concatenation of the username, password, host, and port. It's separated from the scheme by `://`."),
                    attr("protocol", "The concatenation of the protocol scheme and `:`."),
                    attr("scheme", "The protocol scheme used to access the domain."),
                    attr("credentials", "The concatenation of the username and password."),
                    attr("username", "The first component of the credentials."),
                    attr("password", "The second component of the credentials."),
                    attr("host", "The domain part of the authority."),
                    attr("port", "The last component of the authority."),
                    attr("path", "The component after the authority."),
                    attr("search", "The component after the path."),
                    attr("query", "A substring of the search component, after the `?` and before the fragment."),
                    attr("hash", "The concatenation of a `#` with the fragment."),
                    attr("fragment", "The component after the search."),
                ]),
            },
            FunctionSpec {
                name: PARSE_CIDR,
                summary: "Parse an IP address and prefix length in CIDR notation",
                description: describe_function(CIDR_DESCRIPTION, "netparse_cidr"),
                parameters: vec![param("cidr", "The IP address and prefix length in CIDR notation.")],
                returns: ReturnSpec::Object(vec![
                    attr("cidr", "The IP address and prefix length in CIDR notation."),
                    attr("ip", "The IP address."),
                    attr("network", "The IP network."),
                ]),
            },
            FunctionSpec {
                name: CONTAINS_IP,
                summary: CONTAINS_IP_DESCRIPTION,
                description: CONTAINS_IP_DESCRIPTION.to_string(),
                parameters: vec![
                    param("network", "The IP network."),
                    param("ip", "The IP address."),
                ],
                returns: ReturnSpec::Bool,
            },
        ];

        specs.into_iter().map(|spec| (spec.name, spec)).collect()
    };
}

/// Look up the metadata of a function by name.
pub fn function_spec(name: &str) -> Option<&'static FunctionSpec> {
    REGISTRY.get(name)
}

/// All registered functions, sorted by name.
pub fn function_specs() -> Vec<&'static FunctionSpec> {
    let mut specs: Vec<_> = REGISTRY.values().collect();
    specs.sort_by_key(|spec| spec.name);
    specs
}

/// Call a function with the permissive domain policy.
pub fn invoke(name: &str, args: &[Argument]) -> Result<Invocation> {
    invoke_with(&DomainParser::new(), name, args)
}

/// Call a function, rejecting domains whose suffix has no manager.
pub fn invoke_strict(name: &str, args: &[Argument]) -> Result<Invocation> {
    invoke_with(&DomainParser::new().strict(true), name, args)
}

/// Call a function, decomposing domains with `parser`.
///
/// # Errors
///
/// - [`NetparseError::UnknownFunction`] / [`NetparseError::InvalidArgumentCount`]
///   when the call does not match the registry
/// - [`NetparseError::NullArgument`] for the first null argument
/// - the parser's own error otherwise
pub fn invoke_with(parser: &DomainParser, name: &str, args: &[Argument]) -> Result<Invocation> {
    let spec = function_spec(name).ok_or_else(|| NetparseError::UnknownFunction {
        name: name.to_string(),
    })?;

    if args.len() != spec.parameters.len() {
        return Err(NetparseError::InvalidArgumentCount {
            function: name.to_string(),
            expected: spec.parameters.len(),
            received: args.len(),
        });
    }

    if let Some((param, _)) = spec
        .parameters
        .iter()
        .zip(args)
        .find(|(_, arg)| **arg == Argument::Null)
    {
        return Err(NetparseError::null_argument(param.name));
    }

    let known: Option<Vec<&str>> = args
        .iter()
        .map(|arg| match arg {
            Argument::Known(v) => Some(v.as_str()),
            _ => None,
        })
        .collect();
    let Some(values) = known else {
        return Ok(Invocation::Deferred);
    };

    let value = match (spec.name, values.as_slice()) {
        (PARSE_DOMAIN, [host]) => serde_json::to_value(parser.parse(host)?)?,
        (PARSE_URL, [url]) => serde_json::to_value(parse_url(url)?)?,
        (PARSE_CIDR, [cidr]) => serde_json::to_value(parse_cidr(cidr)?)?,
        (CONTAINS_IP, [network, ip]) => Value::Bool(contains_ip(network, ip)?),
        _ => {
            return Err(NetparseError::UnknownFunction {
                name: name.to_string(),
            })
        }
    };

    Ok(Invocation::Value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_contents() {
        let names: Vec<_> = function_specs().iter().map(|s| s.name).collect();
        assert_eq!(names, vec![CONTAINS_IP, PARSE_CIDR, PARSE_DOMAIN, PARSE_URL]);

        let url = function_spec(PARSE_URL).unwrap();
        match &url.returns {
            ReturnSpec::Object(attrs) => assert_eq!(attrs.len(), 14),
            ReturnSpec::Bool => panic!("parse_url returns an object"),
        }
    }

    #[test]
    fn test_descriptions_name_equivalent_data_source() {
        let spec = function_spec(PARSE_DOMAIN).unwrap();
        assert!(spec
            .description
            .ends_with("equivalent to the `netparse_domain` data source."));
    }

    #[test]
    fn test_invoke_parse_domain() {
        let result = invoke(PARSE_DOMAIN, &["foo.bar.example.com".into()]).unwrap();
        assert_eq!(
            result,
            Invocation::Value(json!({
                "domain": "example.com",
                "host": "foo.bar.example.com",
                "manager": "ICANN",
                "sld": "example",
                "subdomain": "foo.bar",
                "tld": "com",
            }))
        );
    }

    #[test]
    fn test_invoke_contains_ip() {
        let yes = invoke(CONTAINS_IP, &["192.0.2.0/24".into(), "192.0.2.3".into()]).unwrap();
        assert_eq!(yes, Invocation::Value(Value::Bool(true)));

        let no = invoke(CONTAINS_IP, &["192.0.2.0/24".into(), "192.1.0.0".into()]).unwrap();
        assert_eq!(no.into_value(), Some(Value::Bool(false)));
    }

    #[test]
    fn test_null_argument_rejected() {
        let err = invoke(PARSE_URL, &[Argument::Null]).unwrap_err();
        assert_eq!(err, NetparseError::null_argument("url"));
        assert!(err.to_string().contains("argument must not be null"));

        let err = invoke(CONTAINS_IP, &["192.0.2.0/24".into(), Argument::Null]).unwrap_err();
        assert_eq!(err, NetparseError::null_argument("ip"));
    }

    #[test]
    fn test_null_wins_over_unknown() {
        let err = invoke(CONTAINS_IP, &[Argument::Unknown, Argument::Null]).unwrap_err();
        assert_eq!(err, NetparseError::null_argument("ip"));
    }

    #[test]
    fn test_unknown_argument_defers() {
        assert_eq!(
            invoke(PARSE_CIDR, &[Argument::Unknown]).unwrap(),
            Invocation::Deferred
        );
        assert_eq!(
            invoke(CONTAINS_IP, &["not a network".into(), Argument::Unknown]).unwrap(),
            Invocation::Deferred
        );
    }

    #[test]
    fn test_registry_misuse() {
        assert!(matches!(
            invoke("parse_email", &["a@b.c".into()]).unwrap_err(),
            NetparseError::UnknownFunction { .. }
        ));
        assert!(matches!(
            invoke(CONTAINS_IP, &["192.0.2.0/24".into()]).unwrap_err(),
            NetparseError::InvalidArgumentCount {
                expected: 2,
                received: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_strict_parser_is_honoured() {
        let strict = DomainParser::new().strict(true);
        let args = [Argument::from("printer.office.notarealtld")];

        assert!(invoke(PARSE_DOMAIN, &args).is_ok());
        assert!(matches!(
            invoke_with(&strict, PARSE_DOMAIN, &args).unwrap_err(),
            NetparseError::UnmanagedSuffix { .. }
        ));
        assert!(matches!(
            invoke_strict(PARSE_DOMAIN, &args).unwrap_err(),
            NetparseError::UnmanagedSuffix { .. }
        ));
    }
}
