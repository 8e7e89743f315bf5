use crate::{env_optional, Environment};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main() before any fallible operations. Safe to call
/// multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Build the log filter.
///
/// `RUST_LOG` wins when set; otherwise `LOG_LEVEL` (e.g. "debug"), otherwise
/// `default_level`. Noisy dependencies are kept at warn.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = env_optional("LOG_LEVEL")
            .map(|l| l.to_ascii_lowercase())
            .unwrap_or_else(|| default_level.to_string());
        EnvFilter::try_new(format!("{level},lettre=warn,sea_orm=warn,sqlx=warn"))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Initialize tracing with environment-aware configuration and error span capture.
///
/// - **Production** (`APP_ENV=production`): JSON lines for log aggregation
/// - **Development** (default): pretty, human-readable output
///
/// Both include `ErrorLayer` so eyre reports carry span traces.
///
/// Safe to call multiple times; later calls are ignored (common in tests).
pub fn init_tracing(environment: &Environment, default_level: &str) {
    let is_production = environment.is_production();
    let filter = build_filter(default_level);

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => {
            info!("Tracing initialized. Environment: {:?}", environment);
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }
}
