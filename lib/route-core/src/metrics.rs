//! Prometheus metrics for route reconciliation

use anyhow::Result;
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics collector for route reconciliation
#[derive(Clone)]
pub struct RouteMetrics {
    /// Table passes by result ("success" or "error")
    pub reconcile_passes_total: CounterVec,
    /// Routes created
    pub routes_created_total: Counter,
    /// Conflicting routes deleted
    pub routes_deleted_total: Counter,
    /// Failures by operation
    pub route_errors_total: CounterVec,
    /// Time spent creating a route, retries included
    pub route_create_duration_seconds: Histogram,
    /// Prometheus registry for metrics
    pub registry: Arc<Registry>,
}

impl RouteMetrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let reconcile_passes_total = CounterVec::new(
            Opts::new("route_reconcile_passes_total", "Route table reconciliation passes"),
            &["result"],
        )?;

        let routes_created_total =
            Counter::new("route_created_total", "Routes created in the VPC route table")?;

        let routes_deleted_total = Counter::new(
            "route_deleted_total",
            "Conflicting routes deleted from the VPC route table",
        )?;

        let route_errors_total = CounterVec::new(
            Opts::new("route_errors_total", "Route operation failures"),
            &["op"],
        )?;

        let route_create_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "route_create_duration_seconds",
                "Route creation latency in seconds, including backoff",
            )
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0]),
        )?;

        registry.register(Box::new(reconcile_passes_total.clone()))?;
        registry.register(Box::new(routes_created_total.clone()))?;
        registry.register(Box::new(routes_deleted_total.clone()))?;
        registry.register(Box::new(route_errors_total.clone()))?;
        registry.register(Box::new(route_create_duration_seconds.clone()))?;

        Ok(Self {
            reconcile_passes_total,
            routes_created_total,
            routes_deleted_total,
            route_errors_total,
            route_create_duration_seconds,
            registry,
        })
    }

    pub(crate) fn record_error(&self, op: &str) {
        self.route_errors_total.with_label_values(&[op]).inc();
    }

    /// Gather all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
