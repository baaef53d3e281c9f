//! Config section labels.
//!
//! # Responsibilities
//! - Derive a short, stable identifier from a port or a service
//! - Keep IPv4 labels at 8 hex digits
//!
//! # Design Decisions
//! - Labels depend only on field values, never on memory or ordering
//! - IPv4-mapped IPv6 addresses are encoded as their 4-byte IPv4 form

use std::fmt;
use std::net::IpAddr;

use crate::topology::model::{PortSpec, ServiceInformation};

/// Hex encoding of an address, 4 bytes for IPv4 and 16 bytes otherwise.
pub fn encode_ip(ip: &IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => hex::encode(v4.octets()),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => hex::encode(v4.octets()),
            None => hex::encode(v6.octets()),
        },
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            encode_ip(&self.ip),
            self.port,
            self.protocol,
            self.mode
        )
    }
}

impl fmt::Display for ServiceInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}",
            self.name, self.namespace, self.port.port, self.port.protocol, self.port.mode
        )
    }
}
