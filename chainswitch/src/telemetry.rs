//! Process-wide `tracing` subscriber with optional OTLP export.
//!
//! Console logs always go to stderr. Spans and metrics are exported only when
//! an `OTEL_EXPORTER_OTLP_*` variable is set; `monotonic_counter.*` event
//! fields (the fallback client's `rpc_endpoint_failures`) become counters via
//! [`MetricsLayer`]. Builds without the `telemetry` feature use
//! [`init_console_logging`](crate::init_console_logging) instead.

use std::env;
use std::time::Duration;

use axum::http::{Request, Response};
use opentelemetry::KeyValue;
use opentelemetry::trace::{Status, TracerProvider};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::SCHEMA_URL;
use opentelemetry_semantic_conventions::attribute::SERVICE_VERSION;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::Span;
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const METRICS_EXPORT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
enum Exporter {
    Http,
    Grpc,
}

impl Exporter {
    /// `None` unless the OTLP exporter is configured through the environment.
    fn from_env() -> Option<Self> {
        let configured = ["ENDPOINT", "HEADERS", "PROTOCOL"]
            .iter()
            .any(|suffix| env::var_os(format!("OTEL_EXPORTER_OTLP_{suffix}")).is_some());
        configured.then(|| match env::var("OTEL_EXPORTER_OTLP_PROTOCOL").as_deref() {
            Ok("grpc") => Self::Grpc,
            _ => Self::Http,
        })
    }
}

/// Service identity reported with exported telemetry.
///
/// `OTEL_SERVICE_NAME` takes precedence over the name given here.
#[derive(Debug, Clone, Copy)]
pub struct Telemetry {
    name: &'static str,
    version: &'static str,
}

impl Telemetry {
    /// Identity for service `name` at `version`.
    #[must_use]
    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self { name, version }
    }

    fn resource(self) -> Resource {
        let builder = Resource::builder();
        let builder = if env::var_os("OTEL_SERVICE_NAME").is_some() {
            builder
        } else {
            builder.with_service_name(self.name)
        };
        builder
            .with_schema_url([KeyValue::new(SERVICE_VERSION, self.version)], SCHEMA_URL)
            .build()
    }

    fn tracer(self, exporter: Exporter) -> Option<SdkTracerProvider> {
        let builder = opentelemetry_otlp::SpanExporter::builder();
        let spans = match exporter {
            Exporter::Http => builder.with_http().build(),
            Exporter::Grpc => builder.with_tonic().build(),
        }
        .inspect_err(|e| report_exporter_error("span", e))
        .ok()?;
        Some(
            SdkTracerProvider::builder()
                .with_resource(self.resource())
                .with_batch_exporter(spans)
                .build(),
        )
    }

    fn meter(self, exporter: Exporter) -> Option<SdkMeterProvider> {
        let builder = opentelemetry_otlp::MetricExporter::builder();
        let metrics = match exporter {
            Exporter::Http => builder.with_http().build(),
            Exporter::Grpc => builder.with_tonic().build(),
        }
        .inspect_err(|e| report_exporter_error("metric", e))
        .ok()?;

        let mut provider = SdkMeterProvider::builder().with_resource(self.resource()).with_reader(
            PeriodicReader::builder(metrics)
                .with_interval(METRICS_EXPORT_INTERVAL)
                .build(),
        );
        // Local debugging aid; never on by default so CLI output stays clean.
        if env::var_os("OTEL_METRICS_STDOUT").is_some() {
            provider = provider.with_reader(
                PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default()).build(),
            );
        }
        let provider = provider.build();
        opentelemetry::global::set_meter_provider(provider.clone());
        Some(provider)
    }

    /// Installs the global subscriber. Exporters are flushed when the
    /// returned guard is dropped.
    pub fn register(self) -> TelemetryGuard {
        let exporter = Exporter::from_env();
        let tracer_provider = exporter.and_then(|e| self.tracer(e));
        let meter_provider = exporter.and_then(|e| self.meter(e));

        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(meter_provider.clone().map(MetricsLayer::new))
            .with(
                tracer_provider
                    .as_ref()
                    .map(|tp| OpenTelemetryLayer::new(tp.tracer(env!("CARGO_PKG_NAME")))),
            )
            .init();

        match exporter {
            Some(exporter) => tracing::info!(?exporter, "OTLP export enabled"),
            None => tracing::debug!("OTLP export not configured"),
        }

        TelemetryGuard {
            tracer_provider,
            meter_provider,
        }
    }
}

// Runs before the subscriber exists.
#[allow(clippy::print_stderr)]
fn report_exporter_error(kind: &str, error: &impl std::fmt::Display) {
    eprintln!("failed to build OTLP {kind} exporter: {error}");
}

/// Keeps the exporters alive; shuts them down on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl TelemetryGuard {
    /// Request tracing for the query service.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn http_tracing(&self) -> HttpTraceLayer {
        TraceLayer::new_for_http()
            .make_span_with(RequestSpan)
            .on_response(RequestSpan)
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(tp) = &self.tracer_provider
            && let Err(err) = tp.shutdown()
        {
            tracing::error!(?err, "tracer provider shutdown failed");
        }
        if let Some(mp) = &self.meter_provider
            && let Err(err) = mp.shutdown()
        {
            tracing::error!(?err, "meter provider shutdown failed");
        }
    }
}

/// Trace layer installed on the HTTP service.
pub type HttpTraceLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan, DefaultOnRequest, RequestSpan>;

/// Opens a server span per request and closes it with the response status.
#[derive(Clone, Copy, Debug)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            otel.kind = "server",
            otel.name = %format!("{} {}", request.method(), request.uri().path()),
            method = %request.method(),
            uri = %request.uri(),
            http.status_code = tracing::field::Empty,
        )
    }
}

impl<B> OnResponse<B> for RequestSpan {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status();
        span.record("http.status_code", status.as_u16());
        // Unknown chains answer 404; only upstream and server faults are errors.
        span.set_status(if status.is_server_error() {
            Status::error(status.to_string())
        } else {
            Status::Ok
        });
        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = latency.as_millis(),
            "request finished"
        );
    }
}
