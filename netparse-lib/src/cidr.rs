//! CIDR notation and network membership.

use crate::error::NetparseError;
use crate::types::CidrRecord;
use crate::Result;
use ipnet::IpNet;
use std::net::IpAddr;
use tracing::debug;

/// Parse an IPv4 or IPv6 address with prefix length.
///
/// `ip` keeps the host bits of the input, `network` clears them.
///
/// ```rust
/// use netparse_lib::parse_cidr;
///
/// let record = parse_cidr("192.0.2.1/24").unwrap();
/// assert_eq!(record.ip, "192.0.2.1");
/// assert_eq!(record.network, "192.0.2.0/24");
/// ```
pub fn parse_cidr(raw: &str) -> Result<CidrRecord> {
    let net: IpNet = raw
        .parse()
        .map_err(|e: ipnet::AddrParseError| NetparseError::malformed_cidr(raw, e.to_string()))?;

    let record = CidrRecord {
        cidr: raw.to_string(),
        ip: net.addr().to_string(),
        network: net.trunc().to_string(),
    };

    debug!(cidr = raw, network = %record.network, "parsed cidr");

    Ok(record)
}

/// Check whether `address` lies inside `network`.
///
/// The range is inclusive: the network address and the broadcast (all-ones)
/// address are both members. Addresses of the other family never are.
pub fn contains_ip(network: &str, address: &str) -> Result<bool> {
    let net: IpNet = network.parse().map_err(|e: ipnet::AddrParseError| {
        NetparseError::malformed_network(network, e.to_string())
    })?;
    let addr: IpAddr = address
        .parse()
        .map_err(|_| NetparseError::malformed_address(address))?;

    Ok(net.contains(&addr))
}
