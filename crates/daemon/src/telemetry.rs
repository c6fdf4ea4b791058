//! Telemetry setup for OpenTelemetry integration
//!
//! The layer is built before the subscriber is installed, so nothing here
//! can log; `main` reports the outcome once logging is up.

use anyhow::Result;

#[cfg(feature = "telemetry")]
pub type TelemetryLayer = tracing_opentelemetry::OpenTelemetryLayer<
    tracing_subscriber::Registry,
    opentelemetry_sdk::trace::Tracer,
>;

#[cfg(not(feature = "telemetry"))]
pub type TelemetryLayer = tracing_subscriber::layer::Identity;

/// Outcome of telemetry setup, reported after logging starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryStatus {
    NotConfigured,
    Enabled { endpoint: String },
    FeatureDisabled,
}

/// Build the OpenTelemetry layer if enabled
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
/// - `OTEL_SERVICE_NAME`: Service name (default: netguard-daemon)
///
/// # Example
///
/// ```text
/// OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 \
/// OTEL_SERVICE_NAME=netguard-lab \
///     ./netguard-daemon
/// ```
pub fn telemetry_layer() -> Result<(Option<TelemetryLayer>, TelemetryStatus)> {
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return Ok((None, TelemetryStatus::NotConfigured));
    };

    #[cfg(feature = "telemetry")]
    {
        let layer = build_layer(&endpoint)?;
        Ok((Some(layer), TelemetryStatus::Enabled { endpoint }))
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = endpoint;
        Ok((None, TelemetryStatus::FeatureDisabled))
    }
}

#[cfg(feature = "telemetry")]
fn build_layer(endpoint: &str) -> Result<TelemetryLayer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "netguard-daemon".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build();
    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer))
}
