use tracing_subscriber::{fmt::format::JsonFields, EnvFilter, FmtSubscriber};

use crate::formatter;

static SUBSCRIBER_INIT: std::sync::Once = std::sync::Once::new();

/// Installs the global subscriber once: pretty lines in debug builds, JSON in release.
///
/// `RUST_LOG` overrides the default of `info` for this crate and `warn` for everything else.
pub fn setup_logging() {
    SUBSCRIBER_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}=info", env!("CARGO_CRATE_NAME"))));

        let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if cfg!(debug_assertions) {
            Box::new(
                FmtSubscriber::builder()
                    .event_format(formatter::PrettyFormatter)
                    .with_env_filter(filter)
                    .finish(),
            )
        } else {
            Box::new(
                FmtSubscriber::builder()
                    .event_format(formatter::JsonFormatter)
                    .fmt_fields(JsonFields::new())
                    .with_env_filter(filter)
                    .finish(),
            )
        };

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to install tracing subscriber: {e}");
        }
    });
}
