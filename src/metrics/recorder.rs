//! Metrics recording implementation using Prometheus.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec, Encoder,
    HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records the guard's decision for a protected request.
    fn record_guard_decision(&self, decision: &str);

    /// Records a token verification with its outcome and cache status.
    fn record_verification(&self, result: &str, cache: &str);

    /// Records the duration of a token verification.
    fn record_verification_duration(&self, duration_secs: f64, result: &str);

    /// Records a login passthrough attempt with its outcome.
    fn record_login_attempt(&self, result: &str);

    /// Records an upstream relay with the response status class.
    fn record_relay(&self, outcome: &str);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // Guard metrics
    guard_decisions_total: CounterVec,

    // Verification metrics
    token_verifications_total: CounterVec,
    verification_duration_seconds: HistogramVec,

    // Gateway traffic metrics
    login_attempts_total: CounterVec,
    relay_requests_total: CounterVec,
}

impl Metrics {
    /// Creates a new metrics instance with a Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        // Guard metrics
        let guard_decisions_total = register_counter_vec_with_registry!(
            Opts::new(
                "guard_decisions_total",
                "Guard outcomes for protected requests"
            ),
            &["decision"],
            registry.clone()
        )
        .expect("Failed to register guard_decisions_total");

        // Verification metrics
        let token_verifications_total = register_counter_vec_with_registry!(
            Opts::new(
                "token_verifications_total",
                "Token verifications by outcome and cache status"
            ),
            &["result", "cache"],
            registry.clone()
        )
        .expect("Failed to register token_verifications_total");

        let verification_duration_seconds = register_histogram_vec_with_registry!(
            "verification_duration_seconds",
            "Token verification duration in seconds",
            &["result"],
            vec![
                0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1
            ],
            registry.clone()
        )
        .expect("Failed to register verification_duration_seconds");

        // Gateway traffic metrics
        let login_attempts_total = register_counter_vec_with_registry!(
            Opts::new("login_attempts_total", "Login passthrough outcomes"),
            &["result"],
            registry.clone()
        )
        .expect("Failed to register login_attempts_total");

        let relay_requests_total = register_counter_vec_with_registry!(
            Opts::new(
                "relay_requests_total",
                "Requests relayed upstream by response class"
            ),
            &["outcome"],
            registry.clone()
        )
        .expect("Failed to register relay_requests_total");

        Metrics {
            registry,
            guard_decisions_total,
            token_verifications_total,
            verification_duration_seconds,
            login_attempts_total,
            relay_requests_total,
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .expect("Failed to encode metrics");
        String::from_utf8(buffer).expect("Metrics encoding produced invalid UTF-8")
    }
}

impl MetricsRecorder for Metrics {
    fn record_guard_decision(&self, decision: &str) {
        self.guard_decisions_total
            .with_label_values(&[decision])
            .inc();
    }

    fn record_verification(&self, result: &str, cache: &str) {
        self.token_verifications_total
            .with_label_values(&[result, cache])
            .inc();
    }

    fn record_verification_duration(&self, duration_secs: f64, result: &str) {
        self.verification_duration_seconds
            .with_label_values(&[result])
            .observe(duration_secs);
    }

    fn record_login_attempt(&self, result: &str) {
        self.login_attempts_total
            .with_label_values(&[result])
            .inc();
    }

    fn record_relay(&self, outcome: &str) {
        self.relay_requests_total
            .with_label_values(&[outcome])
            .inc();
    }
}
