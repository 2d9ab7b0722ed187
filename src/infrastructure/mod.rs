//! Infrastructure layer

pub mod metrics;

pub use self::metrics::MetricsRegistry;
