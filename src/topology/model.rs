//! Cluster snapshot types.
//!
//! Field names serialize in PascalCase so templates address them as
//! `Service.Name`, `Port.IP`, and snapshot documents use the same shape.

use std::net::IpAddr;
use serde::{Deserialize, Serialize};

/// One listening endpoint of the load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortSpec {
    #[serde(rename = "IP")]
    pub ip: IpAddr,
    pub port: i32,
    pub mode: String,
    pub protocol: String,
}

impl PortSpec {
    pub fn new(ip: IpAddr, port: i32, protocol: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            ip,
            port,
            mode: mode.into(),
            protocol: protocol.into(),
        }
    }
}

/// A backend endpoint serving a service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceEndpoint {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "IP")]
    pub ip: IpAddr,
    pub port: i32,
}

/// One logical service exposed through the load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceInformation {
    pub name: String,
    pub namespace: String,
    pub port: PortSpec,

    #[serde(default)]
    pub endpoints: Vec<ServiceEndpoint>,

    #[serde(default)]
    pub node_port: i32,

    /// Extra server names for the service. A leading `~` marks a pattern.
    #[serde(default)]
    pub external: Vec<String>,

    /// Backend timeout in seconds, 0 when unset.
    #[serde(default)]
    pub timeout: i64,
}

/// Full cluster state at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ClusterInformation {
    pub services: Vec<ServiceInformation>,
    pub ports: Vec<PortSpec>,
    pub nodes: Vec<String>,
    pub domain: String,
}
