//! # Structured Logging Module
//!
//! Environment-aware structured logging for the lifecycle engine. Console
//! output is human-readable in development and JSON in production (or when
//! `STIPS_LOG_FORMAT=json`). `RUST_LOG` overrides the environment's default level.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let json = use_json_output(&environment);

        let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

        let console = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .json()
                .with_filter(filter())
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter())
                .boxed()
        };

        // Use try_init to avoid panic if a host already installed a global subscriber
        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("STIPS_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn use_json_output(environment: &str) -> bool {
    match std::env::var("STIPS_LOG_FORMAT") {
        Ok(format) => format.eq_ignore_ascii_case("json"),
        Err(_) => environment == "production",
    }
}

/// Log a committed lifecycle transition
pub fn log_transition(
    entity_type: &str,
    entity_id: &str,
    transition: &str,
    from_status: &str,
    to_status: &str,
    actor_id: &str,
    version: u64,
) {
    tracing::info!(
        entity_type = %entity_type,
        entity_id = %entity_id,
        transition = %transition,
        from_status = %from_status,
        to_status = %to_status,
        actor_id = %actor_id,
        version = version,
        timestamp = %Utc::now().to_rfc3339(),
        "🔁 LIFECYCLE_TRANSITION"
    );
}

/// Log a transition request the engine refused
pub fn log_rejection(entity_type: &str, entity_id: &str, transition: &str, actor_id: &str, code: &str, error: &str) {
    tracing::warn!(
        entity_type = %entity_type,
        entity_id = %entity_id,
        transition = %transition,
        actor_id = %actor_id,
        code = %code,
        error = %error,
        timestamp = %Utc::now().to_rfc3339(),
        "⛔ TRANSITION_REJECTED"
    );
}

/// Log a notification that could not be delivered
pub fn log_dispatch_failure(event_name: &str, entity_id: &str, error: &str) {
    tracing::warn!(
        event_name = %event_name,
        entity_id = %entity_id,
        error = %error,
        timestamp = %Utc::now().to_rfc3339(),
        "📭 DISPATCH_FAILED"
    );
}
