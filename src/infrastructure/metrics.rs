//! Metrics registry
//!
//! Owns a Prometheus recorder that is *not* installed as the process-global
//! `metrics` recorder. Every update is routed to it through
//! [`metrics::with_local_recorder`], so several registries can coexist in one
//! process (one per server, one per test).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use metrics::Gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use crate::config::MetricsConfig;
use crate::shared::errors::MetricsError;

/// Outcome counter and latency gauge backed by a private Prometheus recorder.
///
/// Cheap to clone; all clones share the same instruments.
#[derive(Clone)]
pub struct MetricsRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    outcome_counter: String,
    latency: Gauge,
}

impl MetricsRegistry {
    pub fn new(config: &MetricsConfig) -> Result<Self, MetricsError> {
        let mut names = Registration::default();
        names.claim(&config.outcome_counter)?;
        names.claim(&config.latency_gauge)?;

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let counter_name = config.outcome_counter.clone();
        let gauge_name = config.latency_gauge.clone();
        let latency = metrics::with_local_recorder(&recorder, || {
            metrics::describe_counter!(counter_name, "Count of status returned by user.");
            metrics::describe_gauge!(
                gauge_name.clone(),
                "Average response time for HTTP requests in seconds."
            );
            metrics::gauge!(gauge_name)
        });

        Ok(Self {
            inner: Arc::new(Inner {
                recorder,
                handle,
                outcome_counter: config.outcome_counter.clone(),
                latency,
            }),
        })
    }

    /// Increment the (user, status) counter by one, creating it on first use.
    pub fn record_outcome(&self, user: &str, status: &str) {
        let name = self.inner.outcome_counter.clone();
        metrics::with_local_recorder(&self.inner.recorder, || {
            metrics::counter!(name, "user" => user.to_owned(), "status" => status.to_owned())
                .increment(1);
        });
    }

    /// Overwrite the latency gauge.
    pub fn record_latency(&self, elapsed: Duration) {
        self.inner.latency.set(elapsed.as_secs_f64());
    }

    /// Prometheus text exposition of every registered instrument.
    pub fn render(&self) -> String {
        self.inner.handle.render()
    }
}

/// Tracks metric names handed out during construction.
#[derive(Default)]
struct Registration {
    names: HashSet<String>,
}

impl Registration {
    fn claim(&mut self, name: &str) -> Result<(), MetricsError> {
        if !is_valid_metric_name(name) {
            return Err(MetricsError::InvalidName(name.to_string()));
        }
        if !self.names.insert(name.to_string()) {
            return Err(MetricsError::DuplicateMetric(name.to_string()));
        }
        Ok(())
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Value of the sample line whose name and labels match exactly.
    pub(crate) fn sample(rendered: &str, series: &str) -> Option<f64> {
        rendered.lines().find_map(|line| {
            let (name, value) = line.rsplit_once(' ')?;
            (name == series).then(|| value.parse().ok())?
        })
    }

    fn registry() -> MetricsRegistry {
        MetricsRegistry::new(&MetricsConfig::default()).unwrap()
    }

    #[test]
    fn test_outcome_counter_is_per_label_pair() {
        let metrics = registry();
        metrics.record_outcome("Alkey", "200");
        metrics.record_outcome("Alkey", "200");
        metrics.record_outcome("Alkey", "401");
        metrics.record_outcome("Miras", "401");

        let out = metrics.render();
        assert_eq!(
            sample(&out, r#"http_request_get_user_status_count{user="Alkey",status="200"}"#),
            Some(2.0)
        );
        assert_eq!(
            sample(&out, r#"http_request_get_user_status_count{user="Alkey",status="401"}"#),
            Some(1.0)
        );
        assert_eq!(
            sample(&out, r#"http_request_get_user_status_count{user="Miras",status="401"}"#),
            Some(1.0)
        );
        assert_eq!(
            sample(&out, r#"http_request_get_user_status_count{user="Miras",status="200"}"#),
            None
        );
    }

    #[test]
    fn test_gauge_is_overwritten() {
        let metrics = registry();
        metrics.record_latency(Duration::from_millis(500));
        metrics.record_latency(Duration::from_millis(250));

        let out = metrics.render();
        assert_eq!(sample(&out, "http_request_average_response_time_seconds"), Some(0.25));
    }

    #[test]
    fn test_registries_are_isolated() {
        let a = registry();
        let b = registry();
        a.record_outcome("Afton", "200");

        assert!(a.render().contains(r#"user="Afton""#));
        assert!(!b.render().contains(r#"user="Afton""#));
    }

    #[test]
    fn test_help_text_is_exported() {
        let metrics = registry();
        metrics.record_outcome("Afton", "401");
        assert!(metrics
            .render()
            .contains("# HELP http_request_get_user_status_count Count of status returned by user."));
    }

    #[test]
    fn test_gauge_help_text_is_exported() {
        let metrics = registry();
        metrics.record_latency(Duration::from_millis(1));
        assert!(metrics.render().contains(
            "# HELP http_request_average_response_time_seconds Average response time for HTTP requests in seconds."
        ));
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let config = MetricsConfig {
            outcome_counter: "same_name".into(),
            latency_gauge: "same_name".into(),
        };
        assert!(matches!(
            MetricsRegistry::new(&config),
            Err(MetricsError::DuplicateMetric(name)) if name == "same_name"
        ));
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let config = MetricsConfig {
            outcome_counter: "1bad-name".into(),
            ..MetricsConfig::default()
        };
        assert!(matches!(
            MetricsRegistry::new(&config),
            Err(MetricsError::InvalidName(_))
        ));
    }

    #[test]
    fn test_metric_name_validation() {
        assert!(is_valid_metric_name("http_requests_total"));
        assert!(is_valid_metric_name("ns:sub_total"));
        assert!(!is_valid_metric_name(""));
        assert!(!is_valid_metric_name("9lives"));
        assert!(!is_valid_metric_name("with space"));
    }
}
