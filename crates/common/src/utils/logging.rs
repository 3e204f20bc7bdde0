use std::io;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
/// - `LOG_FORMAT=json` switches to structured JSON output
pub fn init_logging_default() {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => init_logging_json(),
        _ => init_logging_compact(),
    }
}

/// Human-readable compact output, used for local runs.
pub fn init_logging_compact() {
    let _ = fmt()
        .with_env_filter(env_filter(DEFAULT_FILTER))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// Resolution details are logged at debug under `media::resolver`; enable with
/// `RUST_LOG=info,media::resolver=debug`.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(env_filter("info"))
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}
