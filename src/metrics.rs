//! Prometheus metrics for the HTTP surface and the signal engine.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,

    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,

    pub signal_cycles_total: IntCounter,
    pub signal_cycle_errors_total: IntCounter,
    pub signals_emitted_total: IntCounter,
    pub notifications_sent_total: IntCounter,
    pub notifications_failed_total: IntCounter,
    pub engine_running: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")?;

        let signal_cycles_total =
            IntCounter::new("signal_cycles_total", "Polling cycles executed by the engine")?;
        let signal_cycle_errors_total = IntCounter::new(
            "signal_cycle_errors_total",
            "Polling cycles that ended with an error",
        )?;
        let signals_emitted_total =
            IntCounter::new("signals_emitted_total", "Signals emitted by the engine")?;
        let notifications_sent_total =
            IntCounter::new("notifications_sent_total", "Signal notifications delivered")?;
        let notifications_failed_total = IntCounter::new(
            "notifications_failed_total",
            "Signal notifications that failed to deliver",
        )?;
        let engine_running = Gauge::new("engine_running", "1 while the polling loop is running")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(signal_cycles_total.clone()))?;
        registry.register(Box::new(signal_cycle_errors_total.clone()))?;
        registry.register(Box::new(signals_emitted_total.clone()))?;
        registry.register(Box::new(notifications_sent_total.clone()))?;
        registry.register(Box::new(notifications_failed_total.clone()))?;
        registry.register(Box::new(engine_running.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            signal_cycles_total,
            signal_cycle_errors_total,
            signals_emitted_total,
            notifications_sent_total,
            notifications_failed_total,
            engine_running,
        })
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
