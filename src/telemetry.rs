use crate::configuration::TelemetrySettings;
use opentelemetry::trace::{TraceError, TracerProvider as _};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{self as sdktrace, Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

const TRACES_PATH: &str = "/v1/traces";

pub fn get_subscriber(
    name: String,
    env_filter: String,
    tracer: Option<Tracer>,
) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(
        name,
        // Output the formatted spans to stdout.
        std::io::stdout,
    );
    let otel_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .with(otel_layer)
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    // redirect all log's events to the tracing subscriber
    LogTracer::init().expect("Failed to set logger.");
    set_global_default(subscriber).expect("Failed to set subscriber.");
}

/// Owns the tracer provider installed by [`init_tracer`].
pub struct TelemetryHandle {
    provider: TracerProvider,
    tracer: Tracer,
}

impl TelemetryHandle {
    pub fn tracer(&self) -> Tracer {
        self.tracer.clone()
    }

    /// Flushes pending spans and releases the exporter. Errors are logged,
    /// never returned: shutdown must not hold up process exit.
    ///
    /// Blocks until the batch processor answers, so it runs on the blocking
    /// pool rather than on the runtime that drives the processor.
    pub async fn shutdown(self) {
        let provider = self.provider;
        let flushed = tokio::task::spawn_blocking(move || {
            let errors: Vec<TraceError> = provider
                .force_flush()
                .into_iter()
                .filter_map(Result::err)
                .collect();
            global::shutdown_tracer_provider();
            errors
        })
        .await;

        match flushed {
            Ok(errors) if errors.is_empty() => {
                tracing::info!("OpenTelemetry SDK shut down successfully.")
            }
            Ok(errors) => {
                for err in errors {
                    tracing::error!("Error shutting down OpenTelemetry SDK: {}", err);
                }
            }
            Err(err) => tracing::error!("Error shutting down OpenTelemetry SDK: {}", err),
        }
    }
}

/// Builds the OTLP/HTTP exporter behind a batch span processor and installs
/// it as the global tracer provider. Must run inside the Tokio runtime.
pub fn init_tracer(settings: &TelemetrySettings) -> Result<TelemetryHandle, TraceError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .http()
        .with_endpoint(collector_endpoint(&settings.traces_endpoint))
        .build_span_exporter()?;

    let resource = Resource::default().merge(&Resource::new(vec![KeyValue::new(
        "service.name",
        settings.service_name.clone(),
    )]));

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_config(sdktrace::config().with_resource(resource))
        .build();
    let tracer = provider.tracer(settings.service_name.clone());
    global::set_tracer_provider(provider.clone());

    Ok(TelemetryHandle { provider, tracer })
}

/// The HTTP exporter appends the signal path itself, so a full traces URL is
/// cut back to the collector base.
fn collector_endpoint(traces_endpoint: &str) -> String {
    let trimmed = traces_endpoint.trim_end_matches('/');
    trimmed
        .strip_suffix(TRACES_PATH)
        .unwrap_or(trimmed)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_path_is_stripped() {
        assert_eq!(
            collector_endpoint("http://localhost:4318/v1/traces"),
            "http://localhost:4318"
        );
        assert_eq!(
            collector_endpoint("http://collector:4318/v1/traces/"),
            "http://collector:4318"
        );
    }

    #[test]
    fn base_endpoint_is_kept() {
        assert_eq!(
            collector_endpoint("http://collector:4318"),
            "http://collector:4318"
        );
    }

    #[tokio::test]
    async fn tracer_starts_and_shuts_down_without_collector() {
        let settings = TelemetrySettings {
            service_name: "loadprobe-test".to_string(),
            traces_endpoint: "http://127.0.0.1:1/v1/traces".to_string(),
        };
        let handle = init_tracer(&settings).expect("Failed to start tracer.");
        let _tracer = handle.tracer();
        handle.shutdown().await;
    }
}
