use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct InspectionMetrics {
    classifications_total: AtomicU64,
    inspections_total: AtomicU64,
    secrets_found_total: AtomicU64,
    quality_findings_total: AtomicU64,
    format_errors_total: AtomicU64,
    blocked_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub classifications_total: u64,
    pub inspections_total: u64,
    pub secrets_found_total: u64,
    pub quality_findings_total: u64,
    pub format_errors_total: u64,
    pub blocked_total: u64,
    pub avg_inspection_micros: f64,
}

impl InspectionMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_classification(&self) {
        self.classifications_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_inspection(&self) {
        self.inspections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_secrets(&self, count: usize) {
        self.secrets_found_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn add_quality_findings(&self, count: usize) {
        self.quality_findings_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn inc_format_error(&self) {
        self.format_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_blocked(&self) {
        self.blocked_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inspections = self.inspections_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            classifications_total: self.classifications_total.load(Ordering::Relaxed),
            inspections_total: inspections,
            secrets_found_total: self.secrets_found_total.load(Ordering::Relaxed),
            quality_findings_total: self.quality_findings_total.load(Ordering::Relaxed),
            format_errors_total: self.format_errors_total.load(Ordering::Relaxed),
            blocked_total: self.blocked_total.load(Ordering::Relaxed),
            avg_inspection_micros: if inspections == 0 {
                0.0
            } else {
                latency as f64 / inspections as f64
            },
        }
    }
}

/// Installs the JSON subscriber once per process. Logs go to stderr so that
/// command output on stdout stays machine-readable.
pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info,playforge_review=info", service_name))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
