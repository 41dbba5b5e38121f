/// Metrics and telemetry for the TalentGate portal
///
/// Prometheus-compatible counters for the moderation workflow:
/// registrations, draft submissions, decisions, and queue depth.

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, Encoder, IntCounter,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    /// Admin registrations received
    pub static ref ADMIN_REGISTRATIONS_TOTAL: IntCounter = register_int_counter!(
        "admin_registrations_total",
        "Total number of admin registrations"
    )
    .unwrap();

    /// Admin approvals performed by the super admin
    pub static ref ADMIN_APPROVALS_TOTAL: IntCounter = register_int_counter!(
        "admin_approvals_total",
        "Total number of admin approvals"
    )
    .unwrap();

    /// Admins disabled by the super admin
    pub static ref ADMIN_DISABLES_TOTAL: IntCounter = register_int_counter!(
        "admin_disables_total",
        "Total number of admins disabled"
    )
    .unwrap();

    /// Draft submissions accepted into the pending queue, by post type
    pub static ref DRAFTS_SUBMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "drafts_submitted_total",
        "Total number of drafts submitted for moderation",
        &["post_type"]
    )
    .unwrap();

    /// Moderation decisions, by outcome
    pub static ref MODERATION_DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "moderation_decisions_total",
        "Total number of moderation decisions",
        &["outcome"]
    )
    .unwrap();

    /// Drafts currently awaiting a decision
    pub static ref PENDING_QUEUE_DEPTH: IntGauge = register_int_gauge!(
        "pending_queue_depth",
        "Number of drafts awaiting moderation"
    )
    .unwrap();

    /// Notification emails that failed to deliver
    pub static ref NOTIFICATION_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "notification_failures_total",
        "Total number of failed notification emails"
    )
    .unwrap();
}

/// Render all registered metrics in the Prometheus text format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
