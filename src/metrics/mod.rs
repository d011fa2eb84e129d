// Private module declaration
mod server;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the enrollment service
// ============================================================================
//
// - Enrollment, transfer and cancellation throughput
// - Notification failures (including timeouts)
// - Failed operations by reason
// - Operation latency
//
// All metrics are registered with Prometheus and can be scraped via /metrics;
// /health reports the same totals as JSON
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub enrollments_total: IntCounter,
    pub transfers_total: IntCounter,
    pub transferred_memberships_total: IntCounter,
    pub cancellations_total: IntCounterVec,
    pub notification_failures_total: IntCounter,
    pub operations_failed_total: IntCounterVec,
    pub operation_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let enrollments_total = IntCounter::new(
            "enrollments_total",
            "Total committed enrollments",
        )?;
        registry.register(Box::new(enrollments_total.clone()))?;

        let transfers_total = IntCounter::new(
            "course_transfers_total",
            "Total committed course transfers between customers",
        )?;
        registry.register(Box::new(transfers_total.clone()))?;

        let transferred_memberships_total = IntCounter::new(
            "transferred_memberships_total",
            "Total memberships moved by course transfers",
        )?;
        registry.register(Box::new(transferred_memberships_total.clone()))?;

        let cancellations_total = IntCounterVec::new(
            Opts::new("membership_cancellations_total", "Membership cancellation requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(cancellations_total.clone()))?;

        let notification_failures_total = IntCounter::new(
            "notification_failures_total",
            "Notifications that failed or timed out",
        )?;
        registry.register(Box::new(notification_failures_total.clone()))?;

        let operations_failed_total = IntCounterVec::new(
            Opts::new("enrollment_operations_failed_total", "Failed enrollment operations"),
            &["operation", "reason"],
        )?;
        registry.register(Box::new(operations_failed_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("enrollment_operation_duration_seconds", "Enrollment operation duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            registry,
            enrollments_total,
            transfers_total,
            transferred_memberships_total,
            cancellations_total,
            notification_failures_total,
            operations_failed_total,
            operation_duration,
        })
    }

    /// Everything registered, in the Prometheus text exposition format
    pub fn encode(&self) -> prometheus::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }

    /// Totals for the health endpoint
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "healthy",
            "service": "course-enrollment",
            "enrollments": self.enrollments_total.get(),
            "transfers": self.transfers_total.get(),
            "transferred_memberships": self.transferred_memberships_total.get(),
            "notification_failures": self.notification_failures_total.get(),
        })
    }

    /// Record latency for any operation, plus the failure reason when it failed
    pub fn record_operation(&self, operation: &str, duration_secs: f64, failure: Option<&str>) {
        self.operation_duration.with_label_values(&[operation]).observe(duration_secs);
        if let Some(reason) = failure {
            self.operations_failed_total.with_label_values(&[operation, reason]).inc();
        }
    }

    pub fn record_enrollment(&self) {
        self.enrollments_total.inc();
    }

    pub fn record_transfer(&self, moved: usize) {
        self.transfers_total.inc();
        self.transferred_memberships_total.inc_by(moved as u64);
    }

    /// `outcome` is "cancelled" or "not_member"
    pub fn record_cancellation(&self, outcome: &str) {
        self.cancellations_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_notification_failure(&self) {
        self.notification_failures_total.inc();
    }
}
