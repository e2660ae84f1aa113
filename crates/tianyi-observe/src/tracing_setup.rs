//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! Log lines go to stderr so they never interleave with chat output on
//! stdout.
//!
//! ```no_run
//! use tianyi_types::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let directive = tianyi_observe::tracing_setup::resolve_directive(&config, 0, false);
//! tianyi_observe::tracing_setup::init_tracing(&config, &directive).unwrap();
//! ```

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tianyi_types::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Kept so the provider can be flushed on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Pick the default filter directive.
///
/// `-v` flags win over the config file; otherwise the config's `filter`
/// applies, falling back to `warn` (`error` with `--quiet`). `RUST_LOG`
/// still overrides the result inside [`init_tracing`].
pub fn resolve_directive(config: &LoggingConfig, verbose: u8, quiet: bool) -> String {
    match verbose {
        0 if quiet => "error".to_string(),
        0 => config.filter.clone().unwrap_or_else(|| "warn".to_string()),
        1 => "info,tianyi=debug".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber.
///
/// - fmt layer in pretty or JSON form per `config.format`
/// - OpenTelemetry bridge with a stdout exporter when `config.otel` is set
/// - `RUST_LOG` overrides `default_directive`
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(
    config: &LoggingConfig,
    default_directive: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;

    let fmt_layer = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let otel_layer = config.otel.then(|| {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("tianyi");
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Flush pending spans and shut the tracer provider down.
///
/// No-op when OpenTelemetry was not enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
