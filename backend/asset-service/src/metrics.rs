//! Prometheus metrics for asset-service

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Service metrics bound to their own registry.
///
/// Cloning is cheap; every clone records into the same collectors.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    resolutions: IntCounterVec,
    failures: IntCounterVec,
    resize_duration: Histogram,
    http_requests: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let resolutions = IntCounterVec::new(
            Opts::new(
                "asset_resolutions_total",
                "Image resolutions by outcome (cached, original, derived)",
            ),
            &["outcome"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new(
                "asset_resolve_failures_total",
                "Failed image resolutions by error kind",
            ),
            &["kind"],
        )?;
        let resize_duration = Histogram::with_opts(
            HistogramOpts::new(
                "asset_resize_duration_seconds",
                "Time spent decoding, resizing and encoding one image",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by method and status"),
            &["method", "status"],
        )?;

        registry.register(Box::new(resolutions.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(resize_duration.clone()))?;
        registry.register(Box::new(http_requests.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            resolutions,
            failures,
            resize_duration,
            http_requests,
        })
    }

    pub fn record_resolution(&self, outcome: &str) {
        self.resolutions.with_label_values(&[outcome]).inc();
    }

    pub fn record_failure(&self, kind: &str) {
        self.failures.with_label_values(&[kind]).inc();
    }

    pub fn observe_resize(&self, seconds: f64) {
        self.resize_duration.observe(seconds);
    }

    pub fn record_http_request(&self, method: &str, status: u16) {
        self.http_requests
            .with_label_values(&[method, &status.to_string()])
            .inc();
    }

    pub fn resolution_count(&self, outcome: &str) -> u64 {
        self.resolutions.with_label_values(&[outcome]).get()
    }

    pub fn failure_count(&self, kind: &str) -> u64 {
        self.failures.with_label_values(&[kind]).get()
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
