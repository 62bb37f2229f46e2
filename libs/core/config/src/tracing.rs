use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre for binaries.
///
/// Shows file:line of the failing call and hides the environment section,
/// which would otherwise print SMTP credentials. Safe to call multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Default filter when `RUST_LOG` is not set.
fn default_filter(environment: &Environment) -> EnvFilter {
    if environment.is_production() {
        EnvFilter::new("info,lettre=warn,rustls=warn")
    } else {
        EnvFilter::new("debug,rustls=info")
    }
}

/// Initialize tracing with environment-aware output and error span capture.
///
/// - **Production** (`APP_ENV=production`): flattened JSON events, no targets.
/// - **Development** (default): pretty, human-readable events.
///
/// `RUST_LOG` overrides the default filter (e.g. `mailer=trace`).
///
/// Calling this more than once is fine: later calls leave the first
/// subscriber in place, which is what the test harness relies on.
pub fn init_tracing(environment: &Environment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(environment));

    let result = if environment.is_production() {
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
        Ok(_) => info!(?environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}
