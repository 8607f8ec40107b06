//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to both console and a
//! JSON file, for tracing lifecycle operations across async boundaries.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
/// Safe to call more than once; only the first call has any effect.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let log_dir = PathBuf::from("log");
        let _ = fs::create_dir_all(&log_dir);

        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");

        let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_filter(EnvFilter::new(log_level.clone())),
            )
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(EnvFilter::new(log_level)),
            );

        // A global subscriber may already be set by the embedding process;
        // that is not an error.
        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }

        tracing::info!(
            pid = pid,
            environment = %environment,
            log_file = %log_dir.join(&log_filename).display(),
            "structured logging initialized"
        );

        // Keep the non-blocking writer alive for the process lifetime
        std::mem::forget(guard);
    });
}

fn get_environment() -> String {
    std::env::var("RIEGO_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for request/report lifecycle operations
pub fn log_request_operation(
    operation: &str,
    request_id: Option<&str>,
    kind: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        request_id = request_id,
        kind = kind,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "REQUEST_OPERATION"
    );
}

/// Log structured data for assignment operations
pub fn log_assignment_operation(
    operation: &str,
    assignment_id: Option<&str>,
    request_id: Option<&str>,
    assigned_to: Option<&str>,
    status: &str,
) {
    tracing::info!(
        operation = %operation,
        assignment_id = assignment_id,
        request_id = request_id,
        assigned_to = assigned_to,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "ASSIGNMENT_OPERATION"
    );
}

/// Log structured data for maintenance resolution operations
pub fn log_maintenance_operation(
    operation: &str,
    report_id: Option<&str>,
    assignment_id: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        report_id = report_id,
        assignment_id = assignment_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "MAINTENANCE_OPERATION"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_per_environment() {
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("test"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_structured_logging();
    }
}
