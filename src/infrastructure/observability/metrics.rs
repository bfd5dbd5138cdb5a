//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for rendering a snapshot
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("cache_registry_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Measures the duration of a single cache operation
#[derive(Debug, Clone, Copy)]
pub struct OperationTimer(Instant);

impl OperationTimer {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// Record a cache operation metric
///
/// `outcome` is one of `hit`, `miss`, `ok`, `error` or `timeout`.
pub fn record_cache_operation(
    provider: &str,
    operation: &'static str,
    outcome: &'static str,
    duration: Duration,
) {
    let labels = [
        ("provider", provider.to_string()),
        ("op", operation.to_string()),
        ("outcome", outcome.to_string()),
    ];

    counter!("cache_operations_total", &labels).increment(1);
    histogram!("cache_operation_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record a provider construction attempt
pub fn record_provider_construction(provider: &str, kind: &str, success: bool, duration: Duration) {
    let labels = [
        ("provider", provider.to_string()),
        ("kind", kind.to_string()),
        ("status", if success { "success" } else { "error" }.to_string()),
    ];

    counter!("cache_provider_constructions_total", &labels).increment(1);
    histogram!("cache_provider_construction_duration_seconds", &labels)
        .record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_metrics_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_cache_operation("default", "get", "hit", Duration::from_micros(40));
            record_cache_operation("default", "get", "hit", Duration::from_micros(60));
            record_cache_operation("redis", "set", "timeout", Duration::from_secs(1));
        });

        let rendered = handle.render();
        assert!(rendered.contains("cache_operations_total"));
        assert!(rendered.contains("provider=\"default\""));
        assert!(rendered.contains("outcome=\"timeout\""));
    }

    #[test]
    fn test_construction_metrics_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_provider_construction("redis", "distributed", false, Duration::from_millis(5));
        });

        let rendered = handle.render();
        assert!(rendered.contains("cache_provider_constructions_total"));
        assert!(rendered.contains("status=\"error\""));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_cache_operation("default", "remove", "ok", Duration::ZERO);
    }

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_init_metrics_disabled() {
        let config = MetricsConfig { enabled: false };
        assert!(init_metrics(&config).is_none());
    }
}
