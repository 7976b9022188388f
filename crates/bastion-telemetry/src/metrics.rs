//! Prometheus metrics for Bastion.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `bastion_auth_decisions_total` | Counter | `layer`, `outcome` | Bouncer decisions |
//! | `bastion_api_key_cache_lookups_total` | Counter | `result` | API key cache lookups |
//!
//! Recording functions are no-ops until a recorder is installed.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Auth decision counter name.
pub const AUTH_DECISIONS_TOTAL: &str = "bastion_auth_decisions_total";
/// API key cache counter name.
pub const API_KEY_CACHE_LOOKUPS_TOTAL: &str = "bastion_api_key_cache_lookups_total";

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address of a scrape listener (e.g. "0.0.0.0:9090"). When `None`
    /// no listener is started and metrics are read through [`render_metrics`].
    pub addr: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: None,
        }
    }
}

/// Outcome of a bouncer layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The layer let the request through.
    Allowed,
    /// The layer refused the request.
    Denied,
    /// The layer failed on a collaborator.
    Error,
}

impl AuthOutcome {
    /// Label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied => "denied",
            Self::Error => "error",
        }
    }
}

/// Installs the Prometheus recorder.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable listener
/// address and `TelemetryError::MetricsInit` if a recorder is already set.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let builder = PrometheusBuilder::new();
    match &config.addr {
        Some(addr) => {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
            builder
                .with_http_listener(addr)
                .install()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        }
        None => {
            let handle = builder
                .install_recorder()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            let _ = METRICS_HANDLE.set(handle);
        }
    }

    register_metric_descriptions();
    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` unless the recorder was installed without a listener.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        AUTH_DECISIONS_TOTAL,
        "Authentication and authorization decisions by bouncer layer and outcome"
    );
    describe_counter!(
        API_KEY_CACHE_LOOKUPS_TOTAL,
        "API key digest lookups by cache result"
    );
}

/// Records a decision taken by a bouncer layer.
pub fn record_auth_decision(layer: &'static str, outcome: AuthOutcome) {
    counter!(
        AUTH_DECISIONS_TOTAL,
        "layer" => layer,
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Records an API key cache lookup.
pub fn record_api_key_cache(hit: bool) {
    counter!(
        API_KEY_CACHE_LOOKUPS_TOTAL,
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}
