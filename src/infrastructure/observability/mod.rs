//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use self::config::MetricsConfig;
pub use self::metrics::{
    OperationTimer, PrometheusMetrics, init_metrics, record_cache_operation,
    record_provider_construction,
};
