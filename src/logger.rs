use crate::config::LoggingSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. `format = "pretty"`
/// gives human-readable output, anything else emits JSON lines.
pub fn init_logger(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let registry = tracing_subscriber::registry().with(filter);

    if settings.format == "pretty" {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).pretty())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).json())
            .init();
    }
}
