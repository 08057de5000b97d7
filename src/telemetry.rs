//! Logging and OpenTelemetry setup

use anyhow::{Context, Result};
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::resource::SERVICE_VERSION;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LoggingConfig, TelemetryConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Flushes the OpenTelemetry pipelines when dropped
#[derive(Default)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to flush traces: {e}");
            }
        }
        if let Some(provider) = self.logger_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to flush logs: {e}");
            }
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(logging: &LoggingConfig, telemetry: &TelemetryConfig) -> Result<TelemetryGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(match logging.format.as_str() {
        "json" => fmt::layer().json().boxed(),
        _ => fmt::layer().pretty().boxed(),
    });

    let mut guard = TelemetryGuard::default();
    if telemetry.enabled {
        let (tracer_provider, logger_provider) = otlp_providers(telemetry)?;
        let tracer = tracer_provider.tracer(telemetry.service_name.clone());
        opentelemetry::global::set_tracer_provider(tracer_provider.clone());

        layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());
        layers.push(
            OpenTelemetryTracingBridge::new(&logger_provider)
                .with_filter(exporter_noise_filter(&logging.level)?)
                .boxed(),
        );

        guard.tracer_provider = Some(tracer_provider);
        guard.logger_provider = Some(logger_provider);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if telemetry.enabled {
        tracing::info!("Exporting telemetry to {}", telemetry.endpoint);
    }

    Ok(guard)
}

fn otlp_providers(telemetry: &TelemetryConfig) -> Result<(SdkTracerProvider, SdkLoggerProvider)> {
    let endpoint = telemetry.endpoint.trim_end_matches('/');
    let resource = Resource::builder()
        .with_service_name(telemetry.service_name.clone())
        .with_attribute(KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")))
        .build();

    let span_exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(format!("{endpoint}/v1/traces"))
        .build()
        .context("Failed to build OTLP span exporter")?;
    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource.clone())
        .build();

    let log_exporter = LogExporter::builder()
        .with_http()
        .with_endpoint(format!("{endpoint}/v1/logs"))
        .build()
        .context("Failed to build OTLP log exporter")?;
    let logger_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    Ok((tracer_provider, logger_provider))
}

/// Keep the exporter's own HTTP traffic out of the exported logs
fn exporter_noise_filter(level: &str) -> Result<EnvFilter> {
    Ok(EnvFilter::new(level)
        .add_directive("hyper=off".parse()?)
        .add_directive("reqwest=off".parse()?)
        .add_directive("opentelemetry=off".parse()?))
}
