//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_reloader_signals_total` (counter): change notifications received
//! - `lb_reloader_updates_total` (counter): update function invocations
//! - `lb_reloader_renders_total` (counter): renders by `result`
//! - `lb_reloader_reloads_total` (counter): reload notifications by `result`

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    ::metrics::describe_counter!("lb_reloader_signals_total", "Change notifications received");
    ::metrics::describe_counter!("lb_reloader_updates_total", "Update function invocations");
    ::metrics::describe_counter!("lb_reloader_renders_total", "Configuration renders by result");
    ::metrics::describe_counter!("lb_reloader_reloads_total", "Reload notifications by result");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_signal() {
    ::metrics::counter!("lb_reloader_signals_total").increment(1);
}

pub fn record_update() {
    ::metrics::counter!("lb_reloader_updates_total").increment(1);
}

pub fn record_render(ok: bool) {
    ::metrics::counter!("lb_reloader_renders_total", "result" => result(ok)).increment(1);
}

pub fn record_reload(ok: bool) {
    ::metrics::counter!("lb_reloader_reloads_total", "result" => result(ok)).increment(1);
}

fn result(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "error"
    }
}
