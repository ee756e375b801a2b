//! Logging and optional OpenTelemetry export

use crate::config::LogFormat;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "waitlist=info";

/// What happened to OpenTelemetry during init; logged once logging is up
pub enum OtelStatus {
    Disabled,
    Enabled { endpoint: String },
    FeatureMissing,
    Failed(String),
}

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Install the global subscriber: env filter, pretty or JSON output, and an
/// OTLP layer when `OTEL_EXPORTER_OTLP_ENDPOINT` is set
pub fn init(format: LogFormat) -> anyhow::Result<OtelStatus> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let fmt_layer = match format {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    };

    let (otel_layer, status) = otel_layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(status)
}

fn otel_layer<S>() -> (Option<BoxedLayer<S>>, OtelStatus)
where
    S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
{
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return (None, OtelStatus::Disabled);
    };

    #[cfg(feature = "telemetry")]
    {
        match otlp::layer(&endpoint) {
            Ok(layer) => (Some(layer), OtelStatus::Enabled { endpoint }),
            Err(e) => (None, OtelStatus::Failed(e.to_string())),
        }
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = endpoint;
        (None, OtelStatus::FeatureMissing)
    }
}

/// Flush pending spans before exit
pub fn shutdown() {
    #[cfg(feature = "telemetry")]
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(feature = "telemetry")]
mod otlp {
    use super::BoxedLayer;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};
    use opentelemetry_sdk::trace::TracerProvider;
    use opentelemetry_sdk::{runtime, Resource};
    use tracing::Subscriber;
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::Layer;

    const DEFAULT_SERVICE_NAME: &str = "waitlist-daemon";

    pub(super) fn layer<S>(endpoint: &str) -> anyhow::Result<BoxedLayer<S>>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let service_name = std::env::var("OTEL_SERVICE_NAME")
            .unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

        let exporter = SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .build()?;

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_resource(Resource::new(vec![KeyValue::new(
                "service.name",
                service_name.clone(),
            )]))
            .build();

        let tracer = provider.tracer(service_name);
        opentelemetry::global::set_tracer_provider(provider);

        Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
    }
}
