//! Process-wide logging setup.

use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` overrides `config.level`.
///
/// Returns `false` when a subscriber was already installed; that one stays
/// in place.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let subscriber = Registry::default().with(fmt_layer).with(filter);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // Repositories log through the `log` facade.
    let _ = tracing_log::LogTracer::init();
    true
}

fn default_directive(level: &str) -> String {
    match level.trim().to_lowercase().as_str() {
        level @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => {
            format!("mediafold={level},warn")
        }
        _ => "mediafold=info,warn".to_string(),
    }
}
