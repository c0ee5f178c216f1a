use std::env::var;

pub use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with the service default (INFO).
pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// Initialize tracing with an explicit default level.
///
/// `RUST_LOG` still overrides the default directive, and
/// `RUST_LOG_FORMAT=json` switches to the JSON layer for log collectors.
pub fn init_with_level(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_layer = match var("RUST_LOG_FORMAT").unwrap_or_default().as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer().compact().with_filter(env_filter).boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();
}
