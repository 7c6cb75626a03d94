use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};

pub const REQUESTS_TOTAL: &str = "fibonacci_requests_total";
pub const DURATION_SECONDS: &str = "fibonacci_calculation_duration_seconds";

/// Histogram bucket boundaries, in seconds.
pub const DURATION_BUCKETS: [f64; 7] = [0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0];

/// Counter and histogram for the load endpoint, kept in their own registry so
/// every server instance starts from zero.
pub struct LoadMetrics {
    registry: Registry,
    requests: IntCounter,
    duration: Histogram,
}

impl LoadMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounter::new(
            REQUESTS_TOTAL,
            "Total number of requests to the fibonacci endpoint",
        )?;
        let duration = Histogram::with_opts(
            HistogramOpts::new(
                DURATION_SECONDS,
                "Duration of fibonacci calculation in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            requests,
            duration,
        })
    }

    pub fn record_request(&self) {
        self.requests.inc();
    }

    pub fn observe_duration(&self, seconds: f64) {
        self.duration.observe(seconds);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests.get()
    }

    pub fn duration_samples(&self) -> u64 {
        self.duration.get_sample_count()
    }

    /// Prometheus text exposition of everything in the registry.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;

        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_and_histogram_start_empty() {
        let metrics = LoadMetrics::new().unwrap();
        assert_eq!(metrics.requests_total(), 0);
        assert_eq!(metrics.duration_samples(), 0);
    }

    #[test]
    fn each_observation_is_counted_once() {
        let metrics = LoadMetrics::new().unwrap();
        metrics.record_request();
        metrics.observe_duration(0.25);

        assert_eq!(metrics.requests_total(), 1);
        assert_eq!(metrics.duration_samples(), 1);
    }

    #[test]
    fn render_exposes_fixed_buckets() {
        let metrics = LoadMetrics::new().unwrap();
        metrics.observe_duration(2.0);

        let text = metrics.render().unwrap();
        assert!(text.contains(REQUESTS_TOTAL));
        assert!(text.contains(&format!("{}_bucket{{le=\"0.5\"}} 0", DURATION_SECONDS)));
        assert!(text.contains(&format!("{}_bucket{{le=\"5\"}} 1", DURATION_SECONDS)));
        assert!(text.contains(&format!("{}_bucket{{le=\"60\"}} 1", DURATION_SECONDS)));
    }
}
