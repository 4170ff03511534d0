//! Application metrics for Prometheus monitoring.
//!
//! This module provides:
//! - Prometheus metrics recorder initialization
//! - Metric definitions for the satisfaction engine, analyzer and batch
//! - Helper functions for recording metrics
//! - Rendering for the `/metrics` endpoint

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup, before any metrics are recorded.
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        return false;
    }

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("Failed to set global metrics recorder (already set)");
        return false;
    }

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Failed to store Prometheus handle (already set)");
    }

    describe_metrics();

    tracing::info!("Prometheus metrics initialized");
    true
}

fn describe_metrics() {
    describe_counter!(
        "satisfaction_events_total",
        "Satisfaction events attempted by the publisher, by kind and outcome"
    );
    describe_counter!(
        "conversation_analyses_total",
        "Conversation analyses, by outcome"
    );
    describe_histogram!(
        "analysis_batch_duration_seconds",
        "Duration of daily analysis batches in seconds"
    );
    describe_histogram!(
        "analysis_batch_conversations",
        "Conversations found in the window of each analysis batch"
    );
    describe_counter!(
        "publisher_dropped_total",
        "Events dropped because the publisher queue was full or closed"
    );
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|h| h.render())
}

/// Record one attempted event application.
///
/// `outcome` is one of "applied", "not_initialized", "storage_error", "panicked".
pub fn record_event_applied(kind: &str, outcome: &'static str) {
    counter!("satisfaction_events_total", "kind" => kind.to_string(), "outcome" => outcome)
        .increment(1);
}

/// Record one conversation analysis ("ok", "unavailable", "malformed", "empty").
pub fn record_analysis(outcome: &'static str) {
    counter!("conversation_analyses_total", "outcome" => outcome).increment(1);
}

/// Record a finished analysis batch.
pub fn record_batch(trigger: &'static str, duration: Duration, conversations: u64) {
    histogram!("analysis_batch_duration_seconds", "trigger" => trigger)
        .record(duration.as_secs_f64());
    histogram!("analysis_batch_conversations").record(conversations as f64);
}

/// Record an event the publisher could not enqueue.
pub fn record_publisher_drop() {
    counter!("publisher_dropped_total").increment(1);
}
