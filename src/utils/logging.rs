//! Logging initialization for hosts and modules
//!
//! Small helpers around `tracing-subscriber`:
//! - `RUST_LOG` always takes precedence
//! - an explicit filter is used when `RUST_LOG` is unset
//! - without either, the level defaults to "info"
//! - ANSI colors respect the `NO_COLOR` convention

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn resolve_filter(filter: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::new("info"),
    }
}

/// Initialize logging for the host process.
///
/// # Arguments
/// * `filter` - Optional filter (e.g., "info", "debug", "modhost=debug").
///   `RUST_LOG` takes precedence when set; without either the level is
///   "info".
///
/// # Example
/// ```no_run
/// use modhost::utils::init_logging;
///
/// init_logging(None);
/// ```
pub fn init_logging(filter: Option<&str>) {
    let env_filter = resolve_filter(filter);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(env_filter)
        .init();
}

/// Initialize logging scoped to one module.
///
/// Without `RUST_LOG` or an explicit filter, the module logs at "info" and
/// the host's module plumbing at "debug":
/// `"{module_name}=info,modhost::module=debug"`.
///
/// # Example
/// ```no_run
/// use modhost::utils::init_module_logging;
///
/// init_module_logging("renderer", None);
/// ```
pub fn init_module_logging(module_name: &str, filter: Option<&str>) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match filter {
            Some(f) => EnvFilter::new(f),
            None => EnvFilter::new(format!("{module_name}=info,modhost::module=debug")),
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(env_filter)
        .init();
}

/// Initialize logging with JSON output for log aggregation systems.
///
/// # Example
/// ```no_run
/// # #[cfg(feature = "json-logging")]
/// modhost::utils::init_json_logging(None);
/// ```
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    let env_filter = resolve_filter(filter);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(env_filter)
        .init();
}
