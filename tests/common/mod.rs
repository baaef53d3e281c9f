//! Shared fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use lb_reloader::{ClusterInformation, PortSpec, ServiceEndpoint, ServiceInformation};

/// A two-service cluster on two nodes.
pub fn sample_cluster() -> ClusterInformation {
    let vip = "10.0.0.1".parse().unwrap();
    ClusterInformation {
        services: vec![
            ServiceInformation {
                name: "web".into(),
                namespace: "prod".into(),
                port: PortSpec::new(vip, 80, "tcp", "http"),
                endpoints: vec![
                    ServiceEndpoint {
                        name: "web-0".into(),
                        ip: "10.1.0.10".parse().unwrap(),
                        port: 8080,
                    },
                    ServiceEndpoint {
                        name: "web-1".into(),
                        ip: "10.1.0.11".parse().unwrap(),
                        port: 8080,
                    },
                ],
                node_port: 30080,
                external: vec!["~^www\\.example\\.org$".into(), "example.org".into()],
                timeout: 30,
            },
            ServiceInformation {
                name: "db".into(),
                namespace: "prod".into(),
                port: PortSpec::new(vip, 5432, "tcp", "tcp"),
                endpoints: vec![],
                node_port: 30432,
                external: vec![],
                timeout: 0,
            },
        ],
        ports: vec![
            PortSpec::new(vip, 80, "tcp", "http"),
            PortSpec::new(vip, 5432, "tcp", "tcp"),
        ],
        nodes: vec!["node-a.cluster.internal".into(), "node-b.cluster.internal".into()],
        domain: "cluster.local".into(),
    }
}

/// Write a template into `dir` and return its path.
#[allow(dead_code)]
pub fn write_template(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Wait until `f` holds or `timeout_ms` elapses.
#[allow(dead_code)]
pub async fn wait_for<F: Fn() -> bool>(timeout_ms: u64, f: F) -> bool {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if f() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    f()
}
