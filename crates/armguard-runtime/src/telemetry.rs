//! Tracing and OpenTelemetry initialisation for ArmGuard processes.
//!
//! Call [`init_tracing`] once at startup and hold the returned guard until
//! exit.  Long-running processes should also call [`install_panic_hook`]:
//! the manager isolates panicking models, but the default hook still writes
//! every panic to stderr, once per cycle for a model that panics every cycle.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `ARMGUARD_LOG_FORMAT=json` | Newline-delimited JSON instead of the compact console format. |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP/HTTP collector base URL.  When set, spans such as the per-cycle `step` span are exported. |
//!
//! # Example
//!
//! ```rust,no_run
//! let _guard = armguard_runtime::telemetry::init_tracing("armguard");
//! ```

use std::panic;
use std::sync::Once;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Console output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// Format selected by an `ARMGUARD_LOG_FORMAT` value.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Install the global subscriber.
///
/// The OTLP layer is only added when `OTEL_EXPORTER_OTLP_ENDPOINT` is set
/// and the exporter could be built.  Installing a second subscriber in the
/// same process is reported on stderr and otherwise ignored.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = LogFormat::from_env_value(std::env::var("ARMGUARD_LOG_FORMAT").ok().as_deref());

    let provider = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .ok()
        .and_then(|endpoint| build_provider(service_name, endpoint));
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("armguard")));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with((format == LogFormat::Json).then(|| fmt::layer().json()))
        .with((format == LogFormat::Compact).then(|| fmt::layer().compact()))
        .try_init();
    if let Err(e) = result {
        eprintln!("[armguard] tracing subscriber not installed: {e}");
    }

    TracerProviderGuard(provider)
}

/// Route panic messages through `tracing` instead of raw stderr.
///
/// Panics are logged at `error` level with their source location.  Until a
/// global subscriber is installed the previous hook still runs, so nothing
/// is lost in processes that never call [`init_tracing`].  Calling this more
/// than once has no further effect.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !tracing::dispatcher::has_been_set() {
                previous(info);
                return;
            }
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("non-string panic payload");
            let location = info.location().map(ToString::to_string).unwrap_or_default();
            error!(%location, "panic: {message}");
        }));
    });
}

/// Shuts the OTLP provider down on drop, flushing pending spans.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl TracerProviderGuard {
    /// `true` when spans are being exported.
    pub fn is_exporting(&self) -> bool {
        self.0.is_some()
    }
}

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[armguard] OpenTelemetry provider shutdown error: {e}");
        }
    }
}

fn build_provider(service_name: &str, endpoint: String) -> Option<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[armguard] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    // The control loop is a plain thread, so the exporter must not need an
    // async runtime.
    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            .with_simple_exporter(exporter)
            .build(),
    )
}
